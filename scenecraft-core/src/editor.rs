//! Editing session facade.
//!
//! [`StoryEditor`] ties a [`StoryDraft`] to its [`ViewState`], the pagination
//! settings and the current viewport. Pagination is recomputed from scratch
//! whenever it is asked for; the stored page index is clamped on every read
//! and after every change that can shrink the page count.

use crate::config::PaginationConfig;
use crate::draft::StoryDraft;
use crate::error::{EngineError, StoreError};
use crate::paginate::{paginate, timeline_bar_capacity, PageMode, Pagination, Viewport};
use crate::persist::{MediaFile, MediaUploader, StoryRecord, StoryStore};
use crate::propagate::Direction;
use crate::render::{assemble_marked_story, assemble_story, render_scene, Segment};
use crate::timeline::{MediaKind, Scene, SceneId};
use crate::view::{ViewState, VisibilityFilter};

/// A story open for editing.
#[derive(Debug, Clone)]
pub struct StoryEditor {
    draft: StoryDraft,
    view: ViewState,
    config: PaginationConfig,
    viewport: Viewport,
}

impl StoryEditor {
    pub fn new(draft: StoryDraft, config: PaginationConfig) -> Self {
        Self {
            draft,
            view: ViewState::new(),
            config,
            viewport: Viewport::default(),
        }
    }

    /// Open a persisted story.
    pub fn open(record: StoryRecord, config: PaginationConfig) -> Self {
        Self::new(StoryDraft::from_record(record), config)
    }

    /// Set the starting viewport.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn draft(&self) -> &StoryDraft {
        &self.draft
    }

    /// Mutable access for edits that cannot move or remove scenes.
    pub fn draft_mut(&mut self) -> &mut StoryDraft {
        &mut self.draft
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Scenes passing the current filters.
    pub fn filtered_scenes(&self) -> Vec<&Scene> {
        self.view.filter(self.draft.timeline())
    }

    /// Pagination of the filtered scenes for the current mode and viewport.
    pub fn pagination(&self) -> Pagination {
        paginate(
            &self.filtered_scenes(),
            self.view.mode,
            &self.config,
            self.viewport,
        )
    }

    pub fn page_count(&self) -> usize {
        self.pagination().page_count()
    }

    /// The current page index, clamped to the pages that exist.
    pub fn current_page(&self) -> usize {
        self.pagination().clamp_page(self.view.current_page)
    }

    /// Scenes on the current page.
    pub fn current_page_scenes(&self) -> Vec<&Scene> {
        let scenes = self.filtered_scenes();
        let pagination = paginate(&scenes, self.view.mode, &self.config, self.viewport);
        let range = pagination
            .page(pagination.clamp_page(self.view.current_page))
            .unwrap_or(0..0);
        scenes[range].to_vec()
    }

    /// Apply a new viewport and recompute pagination.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        tracing::debug!(width = viewport.width, height = viewport.height, "Viewport resized");
        self.reconcile();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.update_view(|view| view.with_search(query));
    }

    pub fn set_visibility(&mut self, visibility: VisibilityFilter) {
        self.update_view(|view| view.with_visibility(visibility));
    }

    pub fn set_mode(&mut self, mode: PageMode) {
        self.update_view(|view| view.with_mode(mode));
    }

    pub fn go_to_page(&mut self, page: usize) {
        let pagination = self.pagination();
        self.update_view(|view| view.with_page(page, &pagination));
    }

    pub fn next_page(&mut self) {
        let pagination = self.pagination();
        self.update_view(|view| view.next_page(&pagination));
    }

    pub fn previous_page(&mut self) {
        let pagination = self.pagination();
        self.update_view(|view| view.previous_page(&pagination));
    }

    /// Show the page holding scene `number` (one-based, full timeline) and
    /// expand it. Filters are cleared if they hide the scene.
    pub fn jump_to_scene(&mut self, number: usize) -> Result<usize, EngineError> {
        let len = self.draft.timeline().len();
        let index = number.checked_sub(1).filter(|&i| i < len).ok_or(
            EngineError::OutOfRange {
                index: number,
                len,
            },
        )?;
        let id = self.draft.timeline().scenes()[index].id.clone();

        if !self.filtered_scenes().iter().any(|s| s.id == id) {
            self.update_view(ViewState::cleared);
        }
        let position = self
            .filtered_scenes()
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EngineError::UnknownScene(id.clone()))?;
        let pagination = self.pagination();
        let page = pagination.page_of(position).unwrap_or(0);

        self.update_view(|view| {
            let view = view.with_page(page, &pagination);
            if view.is_expanded(&id) {
                view
            } else {
                view.toggle_expanded(&id)
            }
        });
        Ok(page)
    }

    pub fn toggle_expanded(&mut self, id: &SceneId) {
        self.update_view(|view| view.toggle_expanded(id));
    }

    /// Expand every scene on the current page.
    pub fn expand_all(&mut self) {
        let ids: Vec<SceneId> = self
            .current_page_scenes()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        self.update_view(|view| view.expand_only(&ids));
    }

    pub fn collapse_all(&mut self) {
        self.update_view(ViewState::collapse_all);
    }

    /// Page of the horizontal scene strip that holds scene `index`.
    pub fn timeline_bar_page(&self, index: usize) -> usize {
        index / timeline_bar_capacity(self.viewport)
    }

    /// Add a scene and show the page it lands on.
    pub fn add_scene(&mut self) -> SceneId {
        let id = self.draft.add_scene();
        let last = self.pagination().page_count().saturating_sub(1);
        self.go_to_page(last);
        id
    }

    pub fn rename_character(&mut self, old: &str, new: &str) {
        self.draft.rename_character(old, new);
    }

    pub fn remove_character(&mut self, name: &str) {
        self.draft.remove_character(name);
    }

    pub fn reorder_scene(&mut self, id: &SceneId, target: usize) -> Result<(), EngineError> {
        self.draft.reorder_scene(id, target)
    }

    pub fn move_scene_relative(&mut self, id: &SceneId, direction: Direction) {
        self.draft.move_scene_relative(id, direction);
    }

    /// Delete a scene and forget any view state attached to it.
    pub fn remove_scene(&mut self, id: &SceneId) -> bool {
        if !self.draft.remove_scene(id) {
            return false;
        }
        self.view = std::mem::take(&mut self.view).forget_scene(id);
        self.reconcile();
        true
    }

    /// Hide or show a scene; the visibility filter may now exclude it.
    pub fn toggle_scene_hidden(&mut self, id: &SceneId) -> bool {
        let changed = self.draft.toggle_scene_hidden(id);
        self.reconcile();
        changed
    }

    /// Upload files and attach the resulting URLs to a scene.
    pub async fn upload_scene_media(
        &mut self,
        id: &SceneId,
        kind: MediaKind,
        files: Vec<MediaFile>,
        uploader: &dyn MediaUploader,
    ) -> Result<usize, StoreError> {
        if self.draft.timeline().get(id).is_none() {
            return Err(EngineError::UnknownScene(id.clone()).into());
        }
        let urls = uploader.upload(kind, files).await?;
        let count = urls.len();
        // The scene may have been removed while the upload was in flight.
        if !self.draft.append_scene_media(id, kind, urls) {
            tracing::warn!(scene_id = %id, "Scene removed during upload, dropping media");
            return Ok(0);
        }
        tracing::debug!(scene_id = %id, kind = kind.name(), count, "Attached media");
        Ok(count)
    }

    /// Save through `store`.
    pub async fn save(&mut self, store: &dyn StoryStore) -> Result<(), StoreError> {
        self.draft.save(store).await
    }

    /// Description segments for one scene.
    pub fn render_scene(&self, id: &SceneId) -> Option<Vec<Segment>> {
        let names = self.draft.known_names();
        self.draft
            .timeline()
            .get(id)
            .map(|scene| render_scene(scene, &names))
    }

    /// The reader-facing complete story.
    pub fn complete_story(&self) -> String {
        assemble_story(self.draft.timeline())
    }

    /// The complete story with character mentions marked.
    pub fn marked_story(&self) -> String {
        assemble_marked_story(self.draft.timeline(), &self.draft.known_names())
    }

    fn update_view(&mut self, transition: impl FnOnce(ViewState) -> ViewState) {
        self.view = transition(std::mem::take(&mut self.view));
    }

    fn reconcile(&mut self) {
        let pagination = self.pagination();
        self.update_view(|view| view.reconciled(&pagination));
    }
}
