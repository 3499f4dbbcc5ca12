//! Randomized operation sequences against the consistency propagator.
//!
//! Each test drives a draft through a long, seeded sequence of renames,
//! removals and scene moves, checking the structural guarantees after every
//! step.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use scenecraft_core::{Character, Direction, Roster, Scene, SceneId, StoryDraft, Timeline};

const NAMES: &[&str] = &["Ann", "Anna", "Bob", "A.J.", "C++", "Zoë", "Mary Jane", "Al"];

fn seeded_draft(rng: &mut StdRng) -> StoryDraft {
    let roster = Roster::from_characters(NAMES.iter().map(|n| Character::new(*n)).collect());
    let scenes = (0..20)
        .map(|i| {
            let cast: Vec<&str> = NAMES
                .iter()
                .copied()
                .filter(|_| rng.gen_bool(0.3))
                .collect();
            let mentioned = NAMES.choose(&mut *rng).copied().unwrap_or("Ann");
            Scene::new(format!("Scene {}", i + 1))
                .with_id(format!("s{i}").as_str())
                .with_description(format!("{mentioned} walks in. {}", cast.join(" and ")))
                .with_characters(cast)
                .with_hidden(rng.gen_bool(0.2))
        })
        .collect();
    StoryDraft::from_parts("Property", roster, Timeline::from_scenes(scenes))
}

fn assert_consistent(draft: &StoryDraft, step: usize) {
    assert!(draft.timeline().is_dense(), "orders not dense after step {step}");
    for scene in draft.timeline().iter() {
        let mut seen = scene.characters.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(
            seen.len(),
            scene.characters.len(),
            "duplicate reference in {} after step {step}",
            scene.id
        );
    }
}

fn random_scene(draft: &StoryDraft, rng: &mut StdRng) -> Option<SceneId> {
    draft
        .timeline()
        .scenes()
        .choose(&mut *rng)
        .map(|s| s.id.clone())
}

fn random_name(draft: &StoryDraft, rng: &mut StdRng) -> Option<String> {
    draft.known_names().choose(&mut *rng).cloned()
}

#[test]
fn test_random_sequences_keep_timeline_consistent() {
    for seed in 0..25u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut draft = seeded_draft(&mut rng);
        let mut renames = 0;

        for step in 0..200 {
            match rng.gen_range(0..6) {
                0 => {
                    if let Some(old) = random_name(&draft, &mut rng) {
                        renames += 1;
                        draft.rename_character(&old, &format!("{old}{renames}"));
                        assert!(draft.dangling_references().is_empty());
                    }
                }
                1 => {
                    if let Some(name) = random_name(&draft, &mut rng) {
                        draft.remove_character(&name);
                        assert!(draft.dangling_references().is_empty());
                    }
                }
                2 => {
                    if let Some(id) = random_scene(&draft, &mut rng) {
                        let target = rng.gen_range(0..draft.timeline().len());
                        draft.reorder_scene(&id, target).unwrap();
                    }
                }
                3 => {
                    if let Some(id) = random_scene(&draft, &mut rng) {
                        let len = draft.timeline().len();
                        draft.remove_scene(&id);
                        assert_eq!(draft.timeline().len(), len - 1);
                    }
                }
                4 => {
                    if let Some(id) = random_scene(&draft, &mut rng) {
                        let direction = if rng.gen_bool(0.5) {
                            Direction::Up
                        } else {
                            Direction::Down
                        };
                        draft.move_scene_relative(&id, direction);
                    }
                }
                _ => {
                    let id = draft.add_scene();
                    if let Some(name) = random_name(&draft, &mut rng) {
                        draft.toggle_scene_character(&id, &name);
                    }
                }
            }
            assert_consistent(&draft, step);
        }
    }
}

#[test]
fn test_reorder_is_a_permutation() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut draft = seeded_draft(&mut rng);
    let mut before: Vec<String> = draft
        .timeline()
        .iter()
        .map(|s| s.id.to_string())
        .collect();

    for _ in 0..100 {
        let id = random_scene(&draft, &mut rng).unwrap();
        let target = rng.gen_range(0..draft.timeline().len());
        draft.reorder_scene(&id, target).unwrap();
        assert_eq!(draft.timeline().scenes()[target].id, id);
    }

    let mut after: Vec<String> = draft
        .timeline()
        .iter()
        .map(|s| s.id.to_string())
        .collect();
    before.sort();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn test_rename_there_and_back_restores_text() {
    let mut rng = StdRng::seed_from_u64(11);
    let original = seeded_draft(&mut rng);

    for name in NAMES {
        let mut draft = original.clone();
        let temp = format!("Tmp{}", name.len());
        draft.rename_character(name, &temp);
        draft.rename_character(&temp, name);

        for (a, b) in original.timeline().iter().zip(draft.timeline().iter()) {
            assert_eq!(a.characters, b.characters, "cast changed for {name}");
            assert_eq!(a.description, b.description, "text changed for {name}");
        }
    }
}
