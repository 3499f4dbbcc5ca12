//! Pagination of the scene list.
//!
//! Pages are a pure function of the scenes, the mode, the configuration and
//! the viewport. Nothing is cached between calls; a resize simply calls
//! [`paginate`] again.

use crate::config::{PaginationConfig, ReaderCaps};
use crate::timeline::Scene;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Pagination policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    /// Fixed number of scenes per page; dense, for editing.
    #[default]
    Writer,
    /// Fills pages by text volume as well as scene count; for reading.
    Reader,
}

/// Page boundaries over a scene slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Index ranges into the paginated slice, in order.
    pages: Vec<Range<usize>>,
    /// Effective scenes per page after clamping.
    scenes_per_page: usize,
}

impl Pagination {
    /// Number of pages. Never zero.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Effective scenes per page.
    pub fn scenes_per_page(&self) -> usize {
        self.scenes_per_page
    }

    pub fn pages(&self) -> &[Range<usize>] {
        &self.pages
    }

    /// Index range of page `i`, if it exists.
    pub fn page(&self, i: usize) -> Option<Range<usize>> {
        self.pages.get(i).cloned()
    }

    /// Clamp a requested page index to a valid one.
    pub fn clamp_page(&self, i: usize) -> usize {
        i.min(self.pages.len().saturating_sub(1))
    }

    /// Page holding the scene at `index`, if any.
    pub fn page_of(&self, index: usize) -> Option<usize> {
        self.pages.iter().position(|r| r.contains(&index))
    }
}

/// Upper clamp on scenes per page for a viewport height.
pub fn max_scenes_for_viewport(config: &PaginationConfig, viewport: Viewport) -> usize {
    config
        .height_bands
        .iter()
        .find(|band| viewport.height < band.below_height)
        .or_else(|| config.height_bands.last())
        .map(|band| band.max_scenes)
        .unwrap_or(config.scenes_per_page)
}

/// Effective scenes per page: the request clamped to the configured minimum
/// and the viewport maximum. The minimum wins if the two disagree, and the
/// result is never below one.
pub fn effective_scenes_per_page(config: &PaginationConfig, viewport: Viewport) -> usize {
    let min = config.min_scenes_per_page.max(1);
    let max = max_scenes_for_viewport(config, viewport).max(min);
    config.scenes_per_page.clamp(min, max)
}

/// Reader caps for a viewport: shorter viewports get the tighter caps.
pub fn reader_caps(config: &PaginationConfig, viewport: Viewport) -> ReaderCaps {
    if viewport.height < config.compact_height_threshold {
        config.compact_caps
    } else {
        config.roomy_caps
    }
}

/// Scenes per page for the horizontal scene-strip navigator, by width.
pub fn timeline_bar_capacity(viewport: Viewport) -> usize {
    match viewport.width {
        w if w < 640 => 5,
        w if w < 768 => 7,
        w if w < 1024 => 8,
        _ => 10,
    }
}

/// Estimated rendered lines for a description of `chars` characters.
pub fn estimated_lines(chars: usize, chars_per_line: usize) -> usize {
    chars.div_ceil(chars_per_line.max(1))
}

/// Split `scenes` into pages.
pub fn paginate(
    scenes: &[&Scene],
    mode: PageMode,
    config: &PaginationConfig,
    viewport: Viewport,
) -> Pagination {
    let k = effective_scenes_per_page(config, viewport);
    let mut pages = match mode {
        PageMode::Writer => writer_pages(scenes.len(), k),
        PageMode::Reader => reader_pages(scenes, k, reader_caps(config, viewport), config),
    };
    if pages.is_empty() {
        pages.push(0..scenes.len());
    }

    Pagination {
        pages,
        scenes_per_page: k,
    }
}

fn writer_pages(len: usize, k: usize) -> Vec<Range<usize>> {
    (0..len)
        .step_by(k)
        .map(|start| start..(start + k).min(len))
        .collect()
}

fn reader_pages(
    scenes: &[&Scene],
    k: usize,
    caps: ReaderCaps,
    config: &PaginationConfig,
) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut chars = 0;
    let mut lines = 0;

    for (i, scene) in scenes.iter().enumerate() {
        let scene_chars = scene.description.chars().count();
        let scene_lines = estimated_lines(scene_chars, config.chars_per_line);

        let count = i - start;
        let over_caps =
            chars + scene_chars > caps.max_chars || lines + scene_lines > caps.max_lines;
        if (over_caps && count > 0) || count >= k {
            pages.push(start..i);
            start = i;
            chars = 0;
            lines = 0;
        }

        chars += scene_chars;
        lines += scene_lines;
    }

    if start < scenes.len() {
        pages.push(start..scenes.len());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeightBand;

    fn scenes(lens: &[usize]) -> Vec<Scene> {
        lens.iter()
            .enumerate()
            .map(|(i, &len)| Scene::new(format!("S{i}")).with_description("x".repeat(len)))
            .collect()
    }

    fn refs(scenes: &[Scene]) -> Vec<&Scene> {
        scenes.iter().collect()
    }

    fn tall() -> Viewport {
        Viewport::new(1440, 1200)
    }

    #[test]
    fn test_height_bands() {
        let config = PaginationConfig::default();
        assert_eq!(max_scenes_for_viewport(&config, Viewport::new(400, 500)), 3);
        assert_eq!(max_scenes_for_viewport(&config, Viewport::new(400, 700)), 5);
        assert_eq!(max_scenes_for_viewport(&config, Viewport::new(400, 900)), 8);
        assert_eq!(max_scenes_for_viewport(&config, Viewport::new(400, 2000)), 10);
    }

    #[test]
    fn test_effective_k_is_clamped() {
        let config = PaginationConfig::default().with_scenes_per_page(50);
        assert_eq!(effective_scenes_per_page(&config, tall()), 10);
        assert_eq!(effective_scenes_per_page(&config, Viewport::new(400, 500)), 3);

        let config = PaginationConfig::default()
            .with_scenes_per_page(0)
            .with_min_scenes_per_page(0);
        assert_eq!(effective_scenes_per_page(&config, tall()), 1);

        // The minimum beats a small viewport.
        let config = PaginationConfig::default().with_min_scenes_per_page(6);
        assert_eq!(effective_scenes_per_page(&config, Viewport::new(400, 500)), 6);
    }

    #[test]
    fn test_writer_pages() {
        let s = scenes(&[0; 23]);
        let config = PaginationConfig::default().with_scenes_per_page(5);
        let p = paginate(&refs(&s), PageMode::Writer, &config, tall());
        assert_eq!(p.page_count(), 5);
        assert_eq!(p.page(0), Some(0..5));
        assert_eq!(p.page(4), Some(20..23));
        assert_eq!(p.page_of(21), Some(4));
    }

    #[test]
    fn test_empty_input_is_one_page() {
        let config = PaginationConfig::default();
        for mode in [PageMode::Writer, PageMode::Reader] {
            let p = paginate(&[], mode, &config, tall());
            assert_eq!(p.pages(), &[0..0]);
        }
    }

    #[test]
    fn test_reader_closes_page_on_char_cap() {
        // Roomy caps: 3000 chars / 60 lines.
        let s = scenes(&[1000, 1000, 1000, 1]);
        let config = PaginationConfig::default();
        let p = paginate(&refs(&s), PageMode::Reader, &config, tall());
        assert_eq!(p.pages(), &[0..3, 3..4]);
    }

    #[test]
    fn test_reader_uses_compact_caps_on_short_viewports() {
        let s = scenes(&[1000, 1000]);
        let config = PaginationConfig::default();
        let p = paginate(&refs(&s), PageMode::Reader, &config, Viewport::new(400, 700));
        assert_eq!(p.pages(), &[0..1, 1..2]);
    }

    #[test]
    fn test_reader_line_cap() {
        // 81 chars -> 2 lines each; 31 scenes would be 62 lines.
        let s = scenes(&[81; 31]);
        let config = PaginationConfig::default()
            .with_height_bands([
                HeightBand {
                    below_height: 10,
                    max_scenes: 100,
                },
                HeightBand {
                    below_height: 20,
                    max_scenes: 100,
                },
                HeightBand {
                    below_height: 30,
                    max_scenes: 100,
                },
                HeightBand {
                    below_height: u32::MAX,
                    max_scenes: 100,
                },
            ])
            .with_scenes_per_page(100);
        let p = paginate(&refs(&s), PageMode::Reader, &config, tall());
        assert_eq!(p.pages(), &[0..30, 30..31]);
    }

    #[test]
    fn test_reader_respects_scene_count() {
        let s = scenes(&[1; 7]);
        let config = PaginationConfig::default().with_scenes_per_page(3);
        let p = paginate(&refs(&s), PageMode::Reader, &config, tall());
        assert_eq!(p.pages(), &[0..3, 3..6, 6..7]);
    }

    #[test]
    fn test_oversized_scene_gets_own_page() {
        let s = scenes(&[10, 50_000, 10]);
        let config = PaginationConfig::default();
        let p = paginate(&refs(&s), PageMode::Reader, &config, tall());
        assert_eq!(p.pages(), &[0..1, 1..2, 2..3]);
        assert!(p.pages().iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn test_pagination_is_deterministic() {
        let s = scenes(&[300, 2000, 5, 900, 4000, 1]);
        let config = PaginationConfig::default();
        let a = paginate(&refs(&s), PageMode::Reader, &config, tall());
        let b = paginate(&refs(&s), PageMode::Reader, &config, tall());
        assert_eq!(a, b);
    }

    #[test]
    fn test_clamp_page() {
        let s = scenes(&[0; 4]);
        let config = PaginationConfig::default().with_scenes_per_page(2);
        let p = paginate(&refs(&s), PageMode::Writer, &config, tall());
        assert_eq!(p.clamp_page(0), 0);
        assert_eq!(p.clamp_page(9), 1);
    }

    #[test]
    fn test_timeline_bar_capacity() {
        assert_eq!(timeline_bar_capacity(Viewport::new(320, 600)), 5);
        assert_eq!(timeline_bar_capacity(Viewport::new(700, 600)), 7);
        assert_eq!(timeline_bar_capacity(Viewport::new(900, 600)), 8);
        assert_eq!(timeline_bar_capacity(Viewport::new(1920, 600)), 10);
    }

    #[test]
    fn test_estimated_lines() {
        assert_eq!(estimated_lines(0, 80), 0);
        assert_eq!(estimated_lines(1, 80), 1);
        assert_eq!(estimated_lines(80, 80), 1);
        assert_eq!(estimated_lines(81, 80), 2);
    }
}
