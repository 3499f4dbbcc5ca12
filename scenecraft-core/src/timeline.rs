//! Scene timeline storage.
//!
//! The [`Timeline`] is the single source of truth for scene order. Its JSON
//! string form exists only at the save boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Stable identifier for a scene. Assigned at creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawSceneId")]
pub struct SceneId(String);

impl SceneId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSceneId {
    Text(String),
    Number(i64),
}

impl From<RawSceneId> for SceneId {
    fn from(raw: RawSceneId) -> Self {
        match raw {
            RawSceneId::Text(s) => Self(s),
            RawSceneId::Number(n) => Self(n.to_string()),
        }
    }
}

/// Which media array of a scene an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Display name for this media kind.
    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

/// One ordered unit of narrative content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default = "SceneId::generate")]
    pub id: SceneId,
    /// Zero-based position; always equal to the scene's index in its timeline.
    #[serde(default)]
    pub order: usize,
    /// Scene title.
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub description: String,
    /// Names of the characters declared in this scene, without duplicates.
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub video_urls: Vec<String>,
    #[serde(default)]
    pub audio_urls: Vec<String>,
    /// Excluded from reader-facing output.
    #[serde(default)]
    pub hidden: bool,
}

impl Scene {
    /// Create an empty scene with a fresh id.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            id: SceneId::generate(),
            order: 0,
            event: event.into(),
            description: String::new(),
            characters: Vec::new(),
            image_urls: Vec::new(),
            video_urls: Vec::new(),
            audio_urls: Vec::new(),
            hidden: false,
        }
    }

    /// Use a specific id instead of a generated one.
    pub fn with_id(mut self, id: impl Into<SceneId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the declared characters.
    pub fn with_characters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.characters = dedup_names(names.into_iter().map(Into::into));
        self
    }

    /// Mark the scene hidden.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Check whether this scene declares a character by exact name.
    pub fn has_character(&self, name: &str) -> bool {
        self.characters.iter().any(|c| c == name)
    }

    /// The media array for a kind.
    pub fn media(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Image => &self.image_urls,
            MediaKind::Video => &self.video_urls,
            MediaKind::Audio => &self.audio_urls,
        }
    }

    pub(crate) fn media_mut(&mut self, kind: MediaKind) -> &mut Vec<String> {
        match kind {
            MediaKind::Image => &mut self.image_urls,
            MediaKind::Video => &mut self.video_urls,
            MediaKind::Audio => &mut self.audio_urls,
        }
    }
}

/// Remove repeated names, keeping the first occurrence.
pub(crate) fn dedup_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// The ordered scenes of one story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    scenes: Vec<Scene>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from scenes carrying arbitrary `order` values.
    ///
    /// Scenes are sorted stably by their stored order and renumbered so the
    /// orders are dense again. A scene whose id repeats an earlier one gets a
    /// freshly generated id.
    pub fn from_scenes(mut scenes: Vec<Scene>) -> Self {
        scenes.sort_by_key(|s| s.order);

        let mut seen = HashSet::with_capacity(scenes.len());
        for scene in &mut scenes {
            if !seen.insert(scene.id.clone()) {
                let fresh = SceneId::generate();
                tracing::warn!(
                    scene_id = %scene.id,
                    new_id = %fresh,
                    "Duplicate scene id, assigning a fresh one"
                );
                seen.insert(fresh.clone());
                scene.id = fresh;
            }
        }

        let mut timeline = Self { scenes };
        timeline.renumber();
        timeline
    }

    /// Decode the persisted JSON array form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let scenes: Vec<Scene> = serde_json::from_str(json)?;
        Ok(Self::from_scenes(scenes))
    }

    /// Encode to the persisted JSON array form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.scenes)
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Scenes that are not hidden, in order.
    pub fn visible(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter().filter(|s| !s.hidden)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Look up a scene by id.
    pub fn get(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }

    /// Index of a scene by id.
    pub fn position(&self, id: &SceneId) -> Option<usize> {
        self.scenes.iter().position(|s| &s.id == id)
    }

    /// Check that `order` values are exactly `0..len` in sequence.
    pub fn is_dense(&self) -> bool {
        self.scenes.iter().enumerate().all(|(i, s)| s.order == i)
    }

    pub(crate) fn get_mut(&mut self, id: &SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| &s.id == id)
    }

    /// Swap in a whole new scene list and renumber it.
    pub(crate) fn replace(&mut self, scenes: Vec<Scene>) {
        self.scenes = scenes;
        self.renumber();
    }

    pub(crate) fn push(&mut self, scene: Scene) {
        self.scenes.push(scene);
        self.renumber();
    }

    fn renumber(&mut self) {
        for (i, scene) in self.scenes.iter_mut().enumerate() {
            scene.order = i;
        }
    }
}
