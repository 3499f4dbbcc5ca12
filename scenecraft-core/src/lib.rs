//! Scene timeline engine for story authoring.
//!
//! This crate provides:
//! - A character roster and an ordered scene timeline kept consistent with
//!   each other across renames, removals and reordering
//! - Viewport-aware pagination in writer and reader modes
//! - Character-name attribution and deterministic character colors
//! - A story persistence boundary with a file-backed store
//!
//! # Quick Start
//!
//! ```ignore
//! use scenecraft_core::{EngineConfig, JsonFileStore, StoryDraft, StoryEditor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::from_env()?;
//!     let store = JsonFileStore::new(&config.store_dir);
//!
//!     let mut editor = StoryEditor::new(StoryDraft::new("The Long Night"), config.pagination);
//!     let scene = editor.add_scene();
//!     editor.draft_mut().update_scene_description(&scene, "Ann waits by the door.");
//!     editor.rename_character("Ann", "Annabelle");
//!
//!     editor.save(&store).await?;
//!     println!("{}", editor.complete_story());
//!     Ok(())
//! }
//! ```

pub mod color;
pub mod config;
pub mod draft;
pub mod editor;
pub mod error;
pub mod paginate;
pub mod pattern;
pub mod persist;
pub mod propagate;
pub mod render;
pub mod roster;
pub mod timeline;
pub mod view;

// Primary public API
pub use color::{color_for, CharacterColor, Rgb};
pub use config::{EngineConfig, PaginationConfig};
pub use draft::StoryDraft;
pub use editor::StoryEditor;
pub use error::{ConfigError, EngineError, StoreError};
pub use paginate::{paginate, PageMode, Pagination, Viewport};
pub use persist::{
    JsonFileStore, MediaFile, MediaUploader, SaveStoryRequest, StoryId, StoryRecord, StoryStore,
};
pub use propagate::Direction;
pub use render::{assemble_story, render_marked, render_scene, Segment};
pub use roster::{Character, CharacterId, Roster};
pub use timeline::{MediaKind, Scene, SceneId, Timeline};
pub use view::{ViewState, VisibilityFilter};
