//! Serializable view state for the scene list.
//!
//! Filters, the current page and the set of expanded scenes live here rather
//! than inside the engine. Every transition takes the state by value and
//! returns the next one. Changing what is shown (search text, visibility
//! filter, page mode) always returns to the first page, because a page index
//! from one filtered view means nothing in another.

use crate::paginate::{PageMode, Pagination};
use crate::timeline::{Scene, SceneId, Timeline};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which scenes the list shows by hidden status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityFilter {
    #[default]
    All,
    Visible,
    Hidden,
}

impl VisibilityFilter {
    fn admits(&self, scene: &Scene) -> bool {
        match self {
            VisibilityFilter::All => true,
            VisibilityFilter::Visible => !scene.hidden,
            VisibilityFilter::Hidden => scene.hidden,
        }
    }
}

/// What the scene list is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub search_query: String,
    pub visibility: VisibilityFilter,
    pub mode: PageMode,
    /// Requested page; readers clamp it against the current pagination.
    pub current_page: usize,
    pub expanded: BTreeSet<SceneId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text and return to the first page.
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self.current_page = 0;
        self
    }

    /// Set the visibility filter and return to the first page.
    pub fn with_visibility(mut self, visibility: VisibilityFilter) -> Self {
        self.visibility = visibility;
        self.current_page = 0;
        self
    }

    /// Switch page mode and return to the first page.
    pub fn with_mode(mut self, mode: PageMode) -> Self {
        self.mode = mode;
        self.current_page = 0;
        self
    }

    /// Clear the search text and visibility filter.
    pub fn cleared(self) -> Self {
        self.with_search("").with_visibility(VisibilityFilter::All)
    }

    /// Go to a page, clamped to the pages that exist.
    pub fn with_page(mut self, page: usize, pagination: &Pagination) -> Self {
        self.current_page = pagination.clamp_page(page);
        self
    }

    /// Advance one page; stays on the last page.
    pub fn next_page(self, pagination: &Pagination) -> Self {
        let page = self.current_page.saturating_add(1);
        self.with_page(page, pagination)
    }

    /// Go back one page; stays on the first page.
    pub fn previous_page(self, pagination: &Pagination) -> Self {
        let page = self.current_page.saturating_sub(1);
        self.with_page(page, pagination)
    }

    /// Re-clamp the current page after the content or viewport changed.
    pub fn reconciled(self, pagination: &Pagination) -> Self {
        let page = self.current_page;
        self.with_page(page, pagination)
    }

    /// Expand a collapsed scene or collapse an expanded one.
    pub fn toggle_expanded(mut self, id: &SceneId) -> Self {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
        self
    }

    /// Expand exactly these scenes.
    pub fn expand_only<'a>(mut self, ids: impl IntoIterator<Item = &'a SceneId>) -> Self {
        self.expanded = ids.into_iter().cloned().collect();
        self
    }

    pub fn collapse_all(mut self) -> Self {
        self.expanded.clear();
        self
    }

    /// Drop any reference to a scene that no longer exists.
    pub fn forget_scene(mut self, id: &SceneId) -> Self {
        self.expanded.remove(id);
        self
    }

    pub fn is_expanded(&self, id: &SceneId) -> bool {
        self.expanded.contains(id)
    }

    /// Check whether a scene passes the filters.
    ///
    /// `number` is the scene's one-based position in the full timeline; the
    /// search matches it as text as well as the title and description.
    pub fn admits(&self, scene: &Scene, number: usize) -> bool {
        if !self.visibility.admits(scene) {
            return false;
        }
        let query = self.search_query.trim();
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        number.to_string().contains(&query)
            || scene.event.to_lowercase().contains(&query)
            || scene.description.to_lowercase().contains(&query)
    }

    /// The scenes that pass the filters, in timeline order.
    pub fn filter<'t>(&self, timeline: &'t Timeline) -> Vec<&'t Scene> {
        timeline
            .iter()
            .enumerate()
            .filter(|(i, scene)| self.admits(scene, i + 1))
            .map(|(_, scene)| scene)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::paginate::{paginate, Viewport};

    fn timeline() -> Timeline {
        Timeline::from_scenes(
            (0..12)
                .map(|i| {
                    Scene::new(format!("Scene {}", i + 1))
                        .with_id(format!("s{i}").as_str())
                        .with_description(if i % 3 == 0 { "The storm breaks" } else { "Calm" })
                        .with_hidden(i % 4 == 0)
                })
                .collect(),
        )
    }

    fn pagination(scenes: &[&Scene]) -> Pagination {
        let config = PaginationConfig::default().with_scenes_per_page(5);
        paginate(scenes, PageMode::Writer, &config, Viewport::new(1440, 1200))
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let t = timeline();
        let p = pagination(&t.scenes().iter().collect::<Vec<_>>());
        let view = ViewState::new().with_page(2, &p);
        assert_eq!(view.current_page, 2);

        assert_eq!(view.clone().with_search("storm").current_page, 0);
        assert_eq!(
            view.clone().with_visibility(VisibilityFilter::Hidden).current_page,
            0
        );
        assert_eq!(view.with_mode(PageMode::Reader).current_page, 0);
    }

    #[test]
    fn test_page_navigation_clamps() {
        let t = timeline();
        let p = pagination(&t.scenes().iter().collect::<Vec<_>>());
        assert_eq!(p.page_count(), 3);

        let view = ViewState::new().with_page(10, &p);
        assert_eq!(view.current_page, 2);
        let view = view.next_page(&p);
        assert_eq!(view.current_page, 2);
        let view = view.previous_page(&p).previous_page(&p).previous_page(&p);
        assert_eq!(view.current_page, 0);
    }

    #[test]
    fn test_search_matches_number_title_and_description() {
        let t = timeline();
        let by_text = ViewState::new().with_search("STORM");
        assert_eq!(by_text.filter(&t).len(), 4);

        let by_number = ViewState::new().with_search("12");
        let ids: Vec<_> = by_number.filter(&t).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s11"]);

        let blank = ViewState::new().with_search("   ");
        assert_eq!(blank.filter(&t).len(), 12);
    }

    #[test]
    fn test_visibility_filter() {
        let t = timeline();
        let hidden = ViewState::new().with_visibility(VisibilityFilter::Hidden);
        assert_eq!(hidden.filter(&t).len(), 3);
        let visible = ViewState::new().with_visibility(VisibilityFilter::Visible);
        assert_eq!(visible.filter(&t).len(), 9);

        let both = visible.with_search("storm");
        // Scenes 0, 3, 6, 9 mention the storm; 0 is hidden.
        assert_eq!(both.filter(&t).len(), 3);
    }

    #[test]
    fn test_expanded_set() {
        let a = SceneId::new("a");
        let b = SceneId::new("b");
        let view = ViewState::new().toggle_expanded(&a).toggle_expanded(&b);
        assert!(view.is_expanded(&a) && view.is_expanded(&b));

        let view = view.toggle_expanded(&a);
        assert!(!view.is_expanded(&a));

        let view = view.expand_only([&a]).forget_scene(&b);
        assert!(view.is_expanded(&a));
        assert!(!view.is_expanded(&b));
        assert!(view.collapse_all().expanded.is_empty());
    }

    #[test]
    fn test_view_state_serializes() {
        let view = ViewState::new()
            .with_search("storm")
            .toggle_expanded(&SceneId::new("a"));
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"searchQuery\":\"storm\""));
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }
}
