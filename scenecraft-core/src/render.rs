//! Name attribution for rendered text.
//!
//! Two conventions are supported:
//!
//! - **Marker**: `***Name***` spans in a flat string, such as the assembled
//!   full story. Every known roster name is eligible.
//! - **Raw**: plain mentions inside one scene's description. Only the names
//!   that scene declares are eligible, so a name that doubles as an ordinary
//!   word is highlighted only where that character is actually present.
//!
//! Both conventions match case-insensitively and report the canonical roster
//! spelling.

use crate::color::{color_for, CharacterColor};
use crate::pattern::{CaseMode, NamePattern};
use crate::timeline::{Scene, Timeline};
use std::collections::VecDeque;
use std::ops::Range;

/// A run of rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Unattributed text, verbatim.
    Plain(String),
    /// Text attributed to a character.
    Character {
        /// Canonical roster name.
        name: String,
        /// Text to display.
        text: String,
        color: CharacterColor,
    },
}

impl Segment {
    /// The display text of this segment.
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) => text,
            Segment::Character { text, .. } => text,
        }
    }

    /// The attributed character, if any.
    pub fn character(&self) -> Option<&str> {
        match self {
            Segment::Plain(_) => None,
            Segment::Character { name, .. } => Some(name),
        }
    }
}

/// Segments produced by [`render_marked`].
///
/// Spans are located up front; segments (and their colors) are built as the
/// iterator is consumed. It cannot be restarted.
pub struct MarkedSegments<'a> {
    text: &'a str,
    spans: VecDeque<(Range<usize>, String)>,
    known_names: Vec<String>,
    pos: usize,
}

impl Iterator for MarkedSegments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        match self.spans.front() {
            Some((range, _)) if range.start > self.pos => {
                let plain = &self.text[self.pos..range.start];
                self.pos = range.start;
                Some(Segment::Plain(plain.to_string()))
            }
            Some(_) => {
                let (range, name) = self.spans.pop_front()?;
                self.pos = range.end;
                let color = color_for(&name, &self.known_names);
                Some(Segment::Character {
                    text: name.clone(),
                    name,
                    color,
                })
            }
            None if self.pos < self.text.len() => {
                let plain = &self.text[self.pos..];
                self.pos = self.text.len();
                Some(Segment::Plain(plain.to_string()))
            }
            None => None,
        }
    }
}

/// Render text that uses the `***Name***` marker convention.
pub fn render_marked<'a, S: AsRef<str>>(text: &'a str, known_names: &[S]) -> MarkedSegments<'a> {
    let known_names: Vec<String> = known_names.iter().map(|n| n.as_ref().to_string()).collect();
    let pattern = NamePattern::markers(&known_names);
    let spans = pattern
        .find_iter(text)
        .map(|m| (m.range, m.canonical.to_string()))
        .collect();

    MarkedSegments {
        text,
        spans,
        known_names,
        pos: 0,
    }
}

/// Render a scene description using the raw mention convention.
///
/// Only the scene's declared characters that are still in `known_names` are
/// attributed; a dangling reference renders as plain text.
pub fn render_scene<S: AsRef<str>>(scene: &Scene, known_names: &[S]) -> Vec<Segment> {
    let pattern = NamePattern::words(eligible_names(scene, known_names), CaseMode::Insensitive);

    let text = scene.description.as_str();
    let mut segments = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.range.start > last {
            segments.push(Segment::Plain(text[last..m.range.start].to_string()));
        }
        segments.push(Segment::Character {
            name: m.canonical.to_string(),
            text: m.text.to_string(),
            color: color_for(m.canonical, known_names),
        });
        last = m.range.end;
    }
    if last < text.len() {
        segments.push(Segment::Plain(text[last..].to_string()));
    }
    segments
}

/// Declared characters of `scene` that the roster still knows.
fn eligible_names<'s, S: AsRef<str>>(scene: &'s Scene, known_names: &[S]) -> Vec<&'s str> {
    scene
        .characters
        .iter()
        .filter(|c| known_names.iter().any(|k| k.as_ref() == c.as_str()))
        .map(String::as_str)
        .collect()
}

/// Assemble the reader-facing "complete story" text.
///
/// Each visible scene becomes `"{n}. {event}"`, then a `[Cast: ...]` line if
/// it declares characters, then its description. Scenes are separated by a
/// blank line. `n` is the scene's position in the full timeline, counting
/// from one.
pub fn assemble_story(timeline: &Timeline) -> String {
    timeline
        .visible()
        .map(|scene| {
            let cast = if scene.characters.is_empty() {
                String::new()
            } else {
                format!("\n[Cast: {}]", scene.characters.join(", "))
            };
            format!(
                "{}. {}{}\n{}",
                scene.order + 1,
                scene.event,
                cast,
                scene.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the complete story with character mentions wrapped in markers.
///
/// Mentions of each scene's declared (and still known) characters in its
/// description become `***Name***`, as do the cast entries. The result is
/// meant for [`render_marked`].
pub fn assemble_marked_story<S: AsRef<str>>(timeline: &Timeline, known_names: &[S]) -> String {
    timeline
        .visible()
        .map(|scene| {
            let eligible = eligible_names(scene, known_names);
            let pattern = NamePattern::words(eligible.iter().copied(), CaseMode::Insensitive);
            let description =
                pattern.replace_all(&scene.description, |m| format!("***{}***", m.canonical));

            let cast = if scene.characters.is_empty() {
                String::new()
            } else {
                let names: Vec<String> = scene
                    .characters
                    .iter()
                    .map(|c| {
                        if eligible.contains(&c.as_str()) {
                            format!("***{c}***")
                        } else {
                            c.clone()
                        }
                    })
                    .collect();
                format!("\n[Cast: {}]", names.join(", "))
            };

            format!("{}. {}{}\n{}", scene.order + 1, scene.event, cast, description)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
