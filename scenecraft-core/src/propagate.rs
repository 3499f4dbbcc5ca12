//! Consistency propagation between the roster and the timeline.
//!
//! Every operation here builds the next scene list from the current one and
//! assigns it in a single step, so the timeline is never observed half
//! updated. After a rename or a removal every scene reference names a roster
//! character again; references left dangling by earlier edits are pruned at
//! that point.

use crate::draft::StoryDraft;
use crate::error::EngineError;
use crate::pattern::{CaseMode, NamePattern};
use crate::roster::{Character, Roster};
use crate::timeline::{dedup_names, Scene, SceneId};

/// Direction for [`StoryDraft::move_scene_relative`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the start of the timeline.
    Up,
    /// Toward the end of the timeline.
    Down,
}

impl StoryDraft {
    /// Rename a character and carry the new name through every scene.
    ///
    /// Scene references are rewritten exactly; titles and descriptions have
    /// whole-word, case-sensitive mentions of `old` replaced. Hidden scenes
    /// are included. Does nothing if no character is named `old`.
    pub fn rename_character(&mut self, old: &str, new: &str) {
        if !self.roster.rename(old, new) {
            tracing::debug!(old, new, "Rename of unknown character ignored");
            return;
        }

        let pattern = NamePattern::words([old], CaseMode::Sensitive);
        let scenes = self
            .timeline
            .iter()
            .map(|scene| renamed(scene, old, new, &pattern))
            .collect();
        let scenes = pruned(scenes, &self.roster);
        self.timeline.replace(scenes);
        tracing::debug!(old, new, scenes = self.timeline.len(), "Renamed character");
    }

    /// Remove a character and its scene references. Text is left alone.
    ///
    /// If another character still carries the same name, references to that
    /// name stay valid and are kept.
    pub fn remove_character(&mut self, name: &str) -> Option<Character> {
        let removed = match self.roster.remove(name) {
            Some(character) => character,
            None => {
                tracing::debug!(name, "Removal of unknown character ignored");
                return None;
            }
        };

        let scenes = pruned(self.timeline.scenes().to_vec(), &self.roster);
        self.timeline.replace(scenes);
        tracing::debug!(name, "Removed character");
        Some(removed)
    }

    /// Move a scene to `target`, shifting the scenes in between.
    ///
    /// An unknown id is ignored; a target past the end is an error.
    pub fn reorder_scene(&mut self, id: &SceneId, target: usize) -> Result<(), EngineError> {
        let len = self.timeline.len();
        if target >= len {
            return Err(EngineError::OutOfRange { index: target, len });
        }
        let Some(from) = self.timeline.position(id) else {
            tracing::debug!(scene_id = %id, "Reorder of unknown scene ignored");
            return Ok(());
        };

        let mut scenes = self.timeline.scenes().to_vec();
        let scene = scenes.remove(from);
        scenes.insert(target, scene);
        self.timeline.replace(scenes);
        tracing::debug!(scene_id = %id, from, to = target, "Reordered scene");
        Ok(())
    }

    /// Swap a scene with its neighbour. Moving past either end does nothing.
    pub fn move_scene_relative(&mut self, id: &SceneId, direction: Direction) {
        let Some(from) = self.timeline.position(id) else {
            return;
        };
        let target = match direction {
            Direction::Up => from.checked_sub(1),
            Direction::Down => Some(from + 1).filter(|&t| t < self.timeline.len()),
        };
        if let Some(target) = target {
            let mut scenes = self.timeline.scenes().to_vec();
            scenes.swap(from, target);
            self.timeline.replace(scenes);
            tracing::debug!(scene_id = %id, from, to = target, "Moved scene");
        }
    }

    /// Delete a scene. Returns false for an unknown id.
    pub fn remove_scene(&mut self, id: &SceneId) -> bool {
        if self.timeline.position(id).is_none() {
            return false;
        }
        let scenes = self
            .timeline
            .iter()
            .filter(|s| &s.id != id)
            .cloned()
            .collect();
        self.timeline.replace(scenes);
        tracing::debug!(scene_id = %id, remaining = self.timeline.len(), "Removed scene");
        true
    }

    /// Replace a scene's reference set. Repeated names are dropped.
    ///
    /// Names are not checked against the roster here.
    pub fn set_scene_characters<I, S>(&mut self, id: &SceneId, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = dedup_names(names.into_iter().map(Into::into));
        match self.timeline.get_mut(id) {
            Some(scene) => {
                tracing::debug!(scene_id = %id, count = names.len(), "Set scene characters");
                scene.characters = names;
                true
            }
            None => false,
        }
    }

    /// Add a character to a scene, registering it in the roster first if no
    /// character of that name exists yet.
    pub fn declare_character_in_scene(&mut self, id: &SceneId, character: Character) -> bool {
        let Some(scene) = self.timeline.get_mut(id) else {
            return false;
        };
        if !scene.has_character(&character.name) {
            scene.characters.push(character.name.clone());
        }
        if !self.roster.contains(&character.name) {
            self.add_character(character);
        }
        true
    }

    /// Add `name` to a scene if absent, otherwise remove it.
    pub fn toggle_scene_character(&mut self, id: &SceneId, name: &str) -> bool {
        match self.timeline.get_mut(id) {
            Some(scene) => {
                if scene.has_character(name) {
                    scene.characters.retain(|c| c != name);
                } else {
                    scene.characters.push(name.to_string());
                }
                true
            }
            None => false,
        }
    }

    /// Scene references that name no roster character, in timeline order.
    pub fn dangling_references(&self) -> Vec<(SceneId, String)> {
        self.timeline
            .iter()
            .flat_map(|scene| {
                scene
                    .characters
                    .iter()
                    .filter(|c| !self.roster.contains(c))
                    .map(|c| (scene.id.clone(), c.clone()))
            })
            .collect()
    }
}

fn renamed(scene: &Scene, old: &str, new: &str, pattern: &NamePattern) -> Scene {
    let characters = scene
        .characters
        .iter()
        .map(|c| if c == old { new.to_string() } else { c.clone() });

    Scene {
        characters: dedup_names(characters),
        event: pattern.replace_all(&scene.event, |_| new.to_string()),
        description: pattern.replace_all(&scene.description, |_| new.to_string()),
        ..scene.clone()
    }
}

/// Drop references to names the roster no longer has.
fn pruned(mut scenes: Vec<Scene>, roster: &Roster) -> Vec<Scene> {
    let mut dropped = 0;
    for scene in &mut scenes {
        let before = scene.characters.len();
        scene.characters.retain(|c| roster.contains(c));
        dropped += before - scene.characters.len();
    }
    if dropped > 0 {
        tracing::debug!(dropped, "Pruned dangling scene references");
    }
    scenes
}
