//! Engine configuration.
//!
//! Pagination tunables have defaults suited to a typical desktop browser
//! and can be overridden with builder methods or from the environment.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Upper bound on scenes per page for viewports shorter than `below_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightBand {
    /// Exclusive upper bound on viewport height, in pixels.
    pub below_height: u32,
    pub max_scenes: usize,
}

/// Soft limits on how much text a reader-mode page holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderCaps {
    pub max_chars: usize,
    pub max_lines: usize,
}

/// Tunables for the pagination engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Requested scenes per page before clamping.
    pub scenes_per_page: usize,
    /// Lower clamp for scenes per page.
    pub min_scenes_per_page: usize,
    /// Step function from viewport height to the upper clamp. Checked in
    /// order; the last band should cover every height.
    pub height_bands: [HeightBand; 4],
    /// Reader caps for viewports shorter than `compact_height_threshold`.
    pub compact_caps: ReaderCaps,
    /// Reader caps for everything else.
    pub roomy_caps: ReaderCaps,
    pub compact_height_threshold: u32,
    /// Characters per estimated line of description text.
    pub chars_per_line: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            scenes_per_page: 10,
            min_scenes_per_page: 1,
            height_bands: [
                HeightBand {
                    below_height: 600,
                    max_scenes: 3,
                },
                HeightBand {
                    below_height: 800,
                    max_scenes: 5,
                },
                HeightBand {
                    below_height: 1000,
                    max_scenes: 8,
                },
                HeightBand {
                    below_height: u32::MAX,
                    max_scenes: 10,
                },
            ],
            compact_caps: ReaderCaps {
                max_chars: 1500,
                max_lines: 30,
            },
            roomy_caps: ReaderCaps {
                max_chars: 3000,
                max_lines: 60,
            },
            compact_height_threshold: 768,
            chars_per_line: 80,
        }
    }
}

impl PaginationConfig {
    /// Set the requested scenes per page.
    pub fn with_scenes_per_page(mut self, k: usize) -> Self {
        self.scenes_per_page = k;
        self
    }

    /// Set the lower clamp for scenes per page.
    pub fn with_min_scenes_per_page(mut self, min: usize) -> Self {
        self.min_scenes_per_page = min;
        self
    }

    /// Replace the height bands.
    pub fn with_height_bands(mut self, bands: [HeightBand; 4]) -> Self {
        self.height_bands = bands;
        self
    }

    /// Set both reader caps.
    pub fn with_reader_caps(mut self, compact: ReaderCaps, roomy: ReaderCaps) -> Self {
        self.compact_caps = compact;
        self.roomy_caps = roomy;
        self
    }

    /// Set the characters per estimated line.
    pub fn with_chars_per_line(mut self, chars: usize) -> Self {
        self.chars_per_line = chars;
        self
    }
}

/// Top-level configuration for an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub pagination: PaginationConfig,
    /// Directory used by the file-backed story store.
    pub store_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            store_dir: PathBuf::from("stories"),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default   |
    /// |----------------------------------|-----------|
    /// | `SCENECRAFT_SCENES_PER_PAGE`     | `10`      |
    /// | `SCENECRAFT_MIN_SCENES_PER_PAGE` | `1`       |
    /// | `SCENECRAFT_CHARS_PER_LINE`      | `80`      |
    /// | `SCENECRAFT_STORE_DIR`           | `stories` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let scenes_per_page = parse_var(
            &lookup,
            "SCENECRAFT_SCENES_PER_PAGE",
            defaults.pagination.scenes_per_page,
        )?;
        let min_scenes_per_page = parse_var(
            &lookup,
            "SCENECRAFT_MIN_SCENES_PER_PAGE",
            defaults.pagination.min_scenes_per_page,
        )?;
        let chars_per_line: usize = parse_var(
            &lookup,
            "SCENECRAFT_CHARS_PER_LINE",
            defaults.pagination.chars_per_line,
        )?;
        if chars_per_line == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SCENECRAFT_CHARS_PER_LINE",
                value: "0".to_string(),
            });
        }

        let store_dir = lookup("SCENECRAFT_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_dir);

        Ok(Self {
            pagination: defaults
                .pagination
                .with_scenes_per_page(scenes_per_page)
                .with_min_scenes_per_page(min_scenes_per_page)
                .with_chars_per_line(chars_per_line),
            store_dir,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
