//! The in-memory story being edited.
//!
//! A [`StoryDraft`] owns the roster and the timeline together, so that every
//! change to one can be propagated to the other. Cross-cutting mutations
//! (renames, removals, reordering) live in [`crate::propagate`]; this module
//! covers construction, the save boundary and field-level scene edits.

use crate::error::{EngineError, StoreError};
use crate::persist::{SaveStoryRequest, StoryId, StoryRecord, StoryStore};
use crate::roster::{Character, CharacterId, Roster};
use crate::timeline::{MediaKind, Scene, SceneId, Timeline};

/// A story's roster, timeline and story-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryDraft {
    pub(crate) id: Option<StoryId>,
    pub title: String,
    pub description: String,
    /// Free-form body text, separate from the scenes.
    pub content: String,
    /// Cover images.
    pub image_urls: Vec<String>,
    pub is_published: bool,
    pub writers: Option<String>,
    pub show_scene_timeline: bool,
    pub genre_ids: Vec<i64>,
    pub(crate) roster: Roster,
    pub(crate) timeline: Timeline,
}

impl StoryDraft {
    /// Start a new, unsaved story.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            show_scene_timeline: true,
            ..Self::default()
        }
    }

    /// Build a draft from existing parts. Used by tests and importers.
    pub fn from_parts(title: impl Into<String>, roster: Roster, timeline: Timeline) -> Self {
        Self {
            roster,
            timeline,
            ..Self::new(title)
        }
    }

    /// Open a persisted story.
    pub fn from_record(record: StoryRecord) -> Self {
        let timeline = record.decode_timeline();
        tracing::debug!(
            story_id = %record.id,
            scenes = timeline.len(),
            characters = record.characters.len(),
            "Loaded story"
        );

        Self {
            genre_ids: record.genres.iter().map(|g| g.id).collect(),
            id: Some(record.id),
            title: record.title,
            description: record.description,
            content: record.content,
            image_urls: record.image_urls,
            is_published: record.is_published,
            writers: record.writers,
            show_scene_timeline: record.show_scene_timeline,
            roster: Roster::from_characters(record.characters),
            timeline,
        }
    }

    /// The persisted id, if the story has been saved.
    pub fn id(&self) -> Option<&StoryId> {
        self.id.as_ref()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Every roster name, in roster order.
    pub fn known_names(&self) -> Vec<String> {
        self.roster.names()
    }

    /// Project the draft into a save request.
    pub fn to_request(&self) -> Result<SaveStoryRequest, EngineError> {
        Ok(SaveStoryRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            timeline_json: self.timeline.to_json()?,
            characters: self.roster.characters().to_vec(),
            image_urls: self.image_urls.clone(),
            is_published: self.is_published,
            writers: self.writers.clone(),
            show_scene_timeline: self.show_scene_timeline,
            genre_ids: self.genre_ids.clone(),
        })
    }

    /// Create or update the story in `store`.
    ///
    /// On success the draft takes the stored id and any character ids the
    /// store assigned. Names, scenes and every other edit stay as they are.
    pub async fn save(&mut self, store: &dyn StoryStore) -> Result<(), StoreError> {
        let request = self.to_request()?;
        let record = match &self.id {
            Some(id) => store.update_story(id, &request).await?,
            None => store.create_story(&request).await?,
        };

        tracing::info!(
            story_id = %record.id,
            scenes = self.timeline.len(),
            characters = self.roster.len(),
            "Saved story"
        );
        self.adopt(record);
        Ok(())
    }

    /// Take identities from a stored record.
    fn adopt(&mut self, record: StoryRecord) {
        self.id = Some(record.id);
        for (i, stored) in record.characters.into_iter().enumerate() {
            let Some(id) = stored.id else { continue };
            match self.roster.get_mut(i) {
                Some(character) if character.name == stored.name => character.id = Some(id),
                _ => {
                    self.assign_character_id(&stored.name, id);
                }
            }
        }
    }

    /// Append a character to the roster. Names may repeat.
    pub fn add_character(&mut self, character: Character) {
        tracing::debug!(name = %character.name, "Adding character");
        self.roster.push(character);
    }

    /// Set the persisted id of the first character named `name`.
    ///
    /// Returns false if no character has that name.
    pub fn assign_character_id(&mut self, name: &str, id: CharacterId) -> bool {
        match self.roster.find_mut(name) {
            Some(character) => {
                character.id = Some(id);
                true
            }
            None => false,
        }
    }

    /// Append image URLs to the first character named `name`.
    pub fn append_character_images(&mut self, name: &str, urls: Vec<String>) -> bool {
        match self.roster.find_mut(name) {
            Some(character) => {
                character.image_urls.extend(urls);
                true
            }
            None => false,
        }
    }

    /// Append a new empty scene titled `Scene {n}` and return its id.
    pub fn add_scene(&mut self) -> SceneId {
        let scene = Scene::new(format!("Scene {}", self.timeline.len() + 1));
        let id = scene.id.clone();
        tracing::debug!(scene_id = %id, "Adding scene");
        self.timeline.push(scene);
        id
    }

    /// Set a scene's title. Returns false for an unknown id.
    pub fn update_scene_event(&mut self, id: &SceneId, event: impl Into<String>) -> bool {
        self.edit_scene(id, |scene| scene.event = event.into())
    }

    /// Set a scene's description. Returns false for an unknown id.
    pub fn update_scene_description(
        &mut self,
        id: &SceneId,
        description: impl Into<String>,
    ) -> bool {
        self.edit_scene(id, |scene| scene.description = description.into())
    }

    pub fn set_scene_hidden(&mut self, id: &SceneId, hidden: bool) -> bool {
        self.edit_scene(id, |scene| scene.hidden = hidden)
    }

    pub fn toggle_scene_hidden(&mut self, id: &SceneId) -> bool {
        self.edit_scene(id, |scene| scene.hidden = !scene.hidden)
    }

    /// Append media URLs to one of a scene's media arrays.
    pub fn append_scene_media(&mut self, id: &SceneId, kind: MediaKind, urls: Vec<String>) -> bool {
        self.edit_scene(id, |scene| scene.media_mut(kind).extend(urls))
    }

    /// Remove one media URL by index. Out-of-range indices are ignored.
    pub fn remove_scene_media(&mut self, id: &SceneId, kind: MediaKind, index: usize) -> bool {
        self.edit_scene(id, |scene| {
            let media = scene.media_mut(kind);
            if index < media.len() {
                media.remove(index);
            }
        })
    }

    fn edit_scene(&mut self, id: &SceneId, edit: impl FnOnce(&mut Scene)) -> bool {
        match self.timeline.get_mut(id) {
            Some(scene) => {
                edit(scene);
                true
            }
            None => {
                tracing::debug!(scene_id = %id, "Edit of unknown scene ignored");
                false
            }
        }
    }
}
