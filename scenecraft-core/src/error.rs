//! Error types for the engine and its collaborators.

use crate::timeline::SceneId;
use thiserror::Error;

/// Errors from timeline and roster operations.
///
/// Everything here is recoverable; the editing session keeps running.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Position {index} is out of range for a timeline of {len} scenes")]
    OutOfRange { index: usize, len: usize },

    #[error("Unknown scene: {0}")]
    UnknownScene(SceneId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the story store and media collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Story not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors from loading configuration out of the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
