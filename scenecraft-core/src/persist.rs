//! Story persistence boundary.
//!
//! The wire records mirror the story backend's camelCase JSON. The backend
//! itself is abstracted behind [`StoryStore`]; [`JsonFileStore`] keeps one
//! pretty-printed JSON file per story in a directory, which is what the
//! command-line editor and the tests use.

use crate::error::StoreError;
use crate::roster::{Character, CharacterId};
use crate::timeline::{MediaKind, Timeline};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Server-assigned identifier for a story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawStoryId")]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStoryId {
    Text(String),
    Number(i64),
}

impl From<RawStoryId> for StoryId {
    fn from(raw: RawStoryId) -> Self {
        match raw {
            RawStoryId::Text(s) => Self(s),
            RawStoryId::Number(n) => Self(n.to_string()),
        }
    }
}

/// A genre tag attached to a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A story as the backend returns it.
///
/// Everything but the id is optional on the wire; absent fields decode to
/// their empty defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub id: StoryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_username: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writers: Option<String>,
    #[serde(default)]
    pub show_scene_timeline: bool,
    /// The timeline as a JSON array string. Decoded leniently on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_json: Option<String>,
}

impl StoryRecord {
    /// Decode the embedded timeline.
    ///
    /// An absent, blank or malformed `timeline_json` yields an empty timeline
    /// and a warning; a story with a broken timeline still opens.
    pub fn decode_timeline(&self) -> Timeline {
        let json = match self.timeline_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => json,
            _ => return Timeline::new(),
        };
        match Timeline::from_json(json) {
            Ok(timeline) => timeline,
            Err(e) => {
                tracing::warn!(
                    story_id = %self.id,
                    error = %e,
                    "Malformed timeline, starting empty"
                );
                Timeline::new()
            }
        }
    }
}

/// Body of a create or update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStoryRequest {
    pub title: String,
    pub description: String,
    pub content: String,
    pub timeline_json: String,
    pub characters: Vec<Character>,
    pub image_urls: Vec<String>,
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writers: Option<String>,
    pub show_scene_timeline: bool,
    pub genre_ids: Vec<i64>,
}

/// A file handed to a [`MediaUploader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Where stories are created and updated.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Create a new story and return the stored record.
    async fn create_story(&self, request: &SaveStoryRequest) -> Result<StoryRecord, StoreError>;

    /// Overwrite an existing story and return the stored record.
    async fn update_story(
        &self,
        id: &StoryId,
        request: &SaveStoryRequest,
    ) -> Result<StoryRecord, StoreError>;
}

/// Uploads media files and returns their public URLs, in input order.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, kind: MediaKind, files: Vec<MediaFile>)
        -> Result<Vec<String>, StoreError>;
}

/// A [`StoryStore`] that keeps each story as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a story.
    pub fn path_for(&self, id: &StoryId) -> PathBuf {
        let sanitized = id
            .as_str()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect::<String>();
        self.dir.join(format!("{sanitized}.json"))
    }

    /// Load a story by id.
    pub async fn load_story(&self, id: &StoryId) -> Result<StoryRecord, StoreError> {
        let path = self.path_for(id);
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        load_record(&path).await
    }

    /// Ids of every story in the directory, sorted.
    pub async fn list_stories(&self) -> Result<Vec<StoryId>, StoreError> {
        let mut ids = Vec::new();
        if !fs::try_exists(&self.dir).await? {
            return Ok(ids);
        }
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Ok(record) = load_record(&path).await {
                    ids.push(record.id);
                }
            }
        }
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }

    async fn write(&self, record: &StoryRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.path_for(&record.id), content).await?;
        Ok(())
    }

    /// Build the stored record, minting ids the way a backend would.
    fn materialize(id: StoryId, request: &SaveStoryRequest, genres: Vec<Genre>) -> StoryRecord {
        let characters = request
            .characters
            .iter()
            .cloned()
            .map(|mut c| {
                if c.id.is_none() {
                    c.id = Some(CharacterId::new(Uuid::new_v4().to_string()));
                }
                c
            })
            .collect();

        StoryRecord {
            id,
            title: request.title.clone(),
            description: request.description.clone(),
            content: request.content.clone(),
            author_username: String::new(),
            image_urls: request.image_urls.clone(),
            characters,
            genres,
            is_published: request.is_published,
            writers: request.writers.clone(),
            show_scene_timeline: request.show_scene_timeline,
            timeline_json: Some(request.timeline_json.clone()),
        }
    }
}

/// Carry genre ids through a file store; names are not known locally.
fn genres_from_ids(ids: &[i64], previous: &[Genre]) -> Vec<Genre> {
    ids.iter()
        .map(|&id| {
            previous
                .iter()
                .find(|g| g.id == id)
                .cloned()
                .unwrap_or(Genre {
                    id,
                    name: String::new(),
                    description: String::new(),
                })
        })
        .collect()
}

/// Read one story record from a JSON file.
pub async fn load_record(path: impl AsRef<Path>) -> Result<StoryRecord, StoreError> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

#[async_trait]
impl StoryStore for JsonFileStore {
    async fn create_story(&self, request: &SaveStoryRequest) -> Result<StoryRecord, StoreError> {
        let id = StoryId::new(Uuid::new_v4().to_string());
        let record = Self::materialize(id, request, genres_from_ids(&request.genre_ids, &[]));
        self.write(&record).await?;
        tracing::info!(
            story_id = %record.id,
            path = %self.path_for(&record.id).display(),
            "Created story"
        );
        Ok(record)
    }

    async fn update_story(
        &self,
        id: &StoryId,
        request: &SaveStoryRequest,
    ) -> Result<StoryRecord, StoreError> {
        let previous = self.load_story(id).await?;
        let mut record = Self::materialize(
            id.clone(),
            request,
            genres_from_ids(&request.genre_ids, &previous.genres),
        );
        record.author_username = previous.author_username;
        self.write(&record).await?;
        tracing::info!(story_id = %record.id, "Updated story");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Scene;

    fn record_with_timeline(json: Option<&str>) -> StoryRecord {
        StoryRecord {
            id: StoryId::new("1"),
            title: "T".to_string(),
            description: String::new(),
            content: String::new(),
            author_username: String::new(),
            image_urls: Vec::new(),
            characters: Vec::new(),
            genres: Vec::new(),
            is_published: false,
            writers: None,
            show_scene_timeline: true,
            timeline_json: json.map(str::to_string),
        }
    }

    fn request(title: &str) -> SaveStoryRequest {
        SaveStoryRequest {
            title: title.to_string(),
            description: "d".to_string(),
            content: String::new(),
            timeline_json: "[]".to_string(),
            characters: vec![Character::new("Ann")],
            image_urls: Vec::new(),
            is_published: false,
            writers: Some("Jo".to_string()),
            show_scene_timeline: true,
            genre_ids: vec![3],
        }
    }

    #[test]
    fn test_decode_timeline_is_lenient() {
        assert!(record_with_timeline(None).decode_timeline().is_empty());
        assert!(record_with_timeline(Some("   ")).decode_timeline().is_empty());
        assert!(record_with_timeline(Some("{not json")).decode_timeline().is_empty());
        assert!(record_with_timeline(Some(r#"{"a": 1}"#)).decode_timeline().is_empty());

        let json = Timeline::from_scenes(vec![Scene::new("A"), Scene::new("B")])
            .to_json()
            .unwrap();
        assert_eq!(record_with_timeline(Some(&json)).decode_timeline().len(), 2);
    }

    #[test]
    fn test_record_accepts_sparse_json() {
        let record: StoryRecord = serde_json::from_str(r#"{"id": 7, "title": "Sparse"}"#).unwrap();
        assert_eq!(record.id, StoryId::new("7"));
        assert!(record.characters.is_empty());
        assert!(record.timeline_json.is_none());
        assert!(!record.show_scene_timeline);
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let json = serde_json::to_value(request("T")).unwrap();
        assert!(json.get("timelineJson").is_some());
        assert!(json.get("showSceneTimeline").is_some());
        assert_eq!(json["genreIds"], serde_json::json!([3]));
    }

    #[test]
    fn test_path_for_sanitizes() {
        let store = JsonFileStore::new("/tmp/s");
        assert_eq!(
            store.path_for(&StoryId::new("../x")),
            PathBuf::from("/tmp/s/___x.json")
        );
    }

    #[tokio::test]
    async fn test_file_store_create_then_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("stories"));

        let created = store.create_story(&request("First")).await.unwrap();
        assert!(created.characters[0].id.is_some());
        assert_eq!(created.genres[0].id, 3);

        let loaded = store.load_story(&created.id).await.unwrap();
        assert_eq!(loaded, created);

        let mut next = request("Second");
        next.characters = created.characters.clone();
        let updated = store.update_story(&created.id, &next).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Second");
        assert_eq!(updated.characters[0].id, created.characters[0].id);

        assert_eq!(store.list_stories().await.unwrap(), vec![created.id]);
    }

    #[tokio::test]
    async fn test_update_missing_story_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let err = store
            .update_story(&StoryId::new("nope"), &request("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
