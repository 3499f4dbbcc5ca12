//! Headless story editor.
//!
//! A line-oriented protocol for driving an editing session from a script or
//! an agent:
//! - Lines starting with `#` are commands (see `#help`)
//! - Responses are tagged: `[PAGE]`, `[SCENE]`, `[STORY]`, `[SAVED]`, `[ERROR]`
//!
//! Scene numbers are one-based positions in the full timeline.

use scenecraft_core::{
    Character, Direction, JsonFileStore, PageMode, Segment, StoreError, StoryEditor,
    Viewport, VisibilityFilter,
};
use std::io::{self, BufRead};

/// Options for a headless session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessConfig {
    /// Story to open from the store; a new story is started when unset.
    pub story_id: Option<String>,
    /// Title for a new story.
    pub title: String,
    pub viewport: Viewport,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            story_id: None,
            title: "Untitled Story".to_string(),
            viewport: Viewport::default(),
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Continue(Vec<String>),
    Quit,
}

const HELP: &[&str] = &[
    "  #scenes                  - List the current page",
    "  #add-scene               - Append a new scene",
    "  #title <n> <text>        - Set a scene title",
    "  #describe <n> <text>     - Set a scene description",
    "  #hide <n>                - Toggle a scene's hidden flag",
    "  #cast <n> <name>         - Toggle a character in a scene",
    "  #add-char <name>         - Add a character to the roster",
    "  #rename <old> -> <new>   - Rename a character everywhere",
    "  #remove-char <name>      - Remove a character",
    "  #move <n> <position>     - Move a scene to a position",
    "  #up <n> / #down <n>      - Move a scene one step",
    "  #delete <n>              - Delete a scene",
    "  #page <n> / #next / #prev - Navigate pages",
    "  #jump <n>                - Show the page holding a scene",
    "  #search [text]           - Filter by text; no text clears",
    "  #filter all|visible|hidden",
    "  #mode writer|reader",
    "  #resize <width> <height>",
    "  #render <n>              - Show a scene with attributed names",
    "  #story                   - Print the complete story",
    "  #check                   - List dangling character references",
    "  #save                    - Save the story",
    "  #quit                    - Exit",
];

/// Run the command loop over stdin until `#quit` or end of input.
pub async fn run_headless(mut editor: StoryEditor, store: JsonFileStore) -> Result<(), StoreError> {
    println!("=== Scenecraft Headless Mode ===");
    println!("Story: {}", editor.draft().title);
    println!(
        "Scenes: {}, Characters: {}",
        editor.draft().timeline().len(),
        editor.draft().roster().len()
    );
    println!();
    println!("Commands:");
    for line in HELP {
        println!("{line}");
    }
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        match execute(&mut editor, &store, line.trim()).await {
            Reply::Continue(output) => {
                for out in output {
                    println!("{out}");
                }
            }
            Reply::Quit => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}

/// Execute one protocol line against the session.
pub async fn execute(editor: &mut StoryEditor, store: &JsonFileStore, line: &str) -> Reply {
    if line.is_empty() {
        return Reply::Continue(Vec::new());
    }
    let Some(command) = line.strip_prefix('#') else {
        return error("Commands start with '#'. Type #help for help.");
    };
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => Reply::Quit,
        "help" => Reply::Continue(
            std::iter::once("[HELP]".to_string())
                .chain(HELP.iter().map(|s| s.to_string()))
                .collect(),
        ),
        "save" => match editor.save(store).await {
            Ok(()) => {
                let id = editor.draft().id().map(|id| id.to_string()).unwrap_or_default();
                ok(format!("[SAVED] Story {id} saved to {}", store.dir().display()))
            }
            Err(e) => error(format!("Save failed: {e}")),
        },
        _ => match run_command(editor, name, rest) {
            Ok(output) => Reply::Continue(output),
            Err(message) => error(message),
        },
    }
}

fn run_command(editor: &mut StoryEditor, name: &str, rest: &str) -> Result<Vec<String>, String> {
    match name {
        "scenes" => {}
        "add-scene" => {
            editor.add_scene();
        }
        "title" => {
            let (n, text) = number_and_text(rest)?;
            let id = scene_id(editor, n)?;
            editor.draft_mut().update_scene_event(&id, text);
        }
        "describe" => {
            let (n, text) = number_and_text(rest)?;
            let id = scene_id(editor, n)?;
            editor.draft_mut().update_scene_description(&id, text);
        }
        "hide" => {
            let id = scene_id(editor, number(rest)?)?;
            editor.toggle_scene_hidden(&id);
        }
        "cast" => {
            let (n, who) = number_and_text(rest)?;
            let id = scene_id(editor, n)?;
            if editor.draft().roster().contains(who) {
                editor.draft_mut().toggle_scene_character(&id, who);
            } else {
                editor
                    .draft_mut()
                    .declare_character_in_scene(&id, Character::new(who));
            }
        }
        "add-char" => {
            if rest.is_empty() {
                return Err("Usage: #add-char <name>".to_string());
            }
            editor.draft_mut().add_character(Character::new(rest));
        }
        "rename" => {
            let (old, new) = rest
                .split_once("->")
                .map(|(a, b)| (a.trim(), b.trim()))
                .ok_or("Usage: #rename <old> -> <new>")?;
            if !editor.draft().roster().contains(old) {
                return Err(format!("No character named {old:?}"));
            }
            editor.rename_character(old, new);
        }
        "remove-char" => {
            if !editor.draft().roster().contains(rest) {
                return Err(format!("No character named {rest:?}"));
            }
            editor.remove_character(rest);
        }
        "move" => {
            let mut parts = rest.split_whitespace();
            let n = number(parts.next().unwrap_or_default())?;
            let position = number(parts.next().unwrap_or_default())?;
            let id = scene_id(editor, n)?;
            let len = editor.draft().timeline().len();
            if position == 0 || position > len {
                return Err(format!("Position {position} is out of range (1-{len})"));
            }
            editor
                .reorder_scene(&id, position - 1)
                .map_err(|e| e.to_string())?;
        }
        "up" | "down" => {
            let id = scene_id(editor, number(rest)?)?;
            let direction = if name == "up" { Direction::Up } else { Direction::Down };
            editor.move_scene_relative(&id, direction);
        }
        "delete" => {
            let id = scene_id(editor, number(rest)?)?;
            editor.remove_scene(&id);
        }
        "page" => editor.go_to_page(number(rest)?.saturating_sub(1)),
        "next" => editor.next_page(),
        "prev" => editor.previous_page(),
        "jump" => {
            editor.jump_to_scene(number(rest)?).map_err(|e| e.to_string())?;
        }
        "search" => editor.set_search(rest),
        "filter" => {
            let filter = match rest {
                "all" => VisibilityFilter::All,
                "visible" => VisibilityFilter::Visible,
                "hidden" => VisibilityFilter::Hidden,
                _ => return Err("Usage: #filter all|visible|hidden".to_string()),
            };
            editor.set_visibility(filter);
        }
        "mode" => {
            let mode = match rest {
                "writer" => PageMode::Writer,
                "reader" => PageMode::Reader,
                _ => return Err("Usage: #mode writer|reader".to_string()),
            };
            editor.set_mode(mode);
        }
        "resize" => {
            let mut parts = rest.split_whitespace();
            let width = number(parts.next().unwrap_or_default())?;
            let height = number(parts.next().unwrap_or_default())?;
            let to_u32 = |v: usize| u32::try_from(v).map_err(|_| format!("Too large: {v}"));
            editor.resize(Viewport::new(to_u32(width)?, to_u32(height)?));
        }
        "render" => {
            let id = scene_id(editor, number(rest)?)?;
            let segments = editor.render_scene(&id).unwrap_or_default();
            let rendered: String = segments
                .iter()
                .map(|s| match s {
                    Segment::Plain(text) => text.clone(),
                    Segment::Character { text, color, .. } => {
                        format!("[{text}|{}]", color.raw_color)
                    }
                })
                .collect();
            return Ok(vec![format!("[SCENE] {rendered}")]);
        }
        "story" => {
            let story = editor.complete_story();
            return Ok(std::iter::once("[STORY]".to_string())
                .chain(story.lines().map(str::to_string))
                .collect());
        }
        "check" => {
            let dangling = editor.draft().dangling_references();
            if dangling.is_empty() {
                return Ok(vec!["[CHECK] No dangling references".to_string()]);
            }
            return Ok(dangling
                .into_iter()
                .map(|(id, name)| format!("[CHECK] Scene {id} references unknown {name:?}"))
                .collect());
        }
        _ => return Err("Unknown command. Type #help for help.".to_string()),
    }
    Ok(page_listing(editor))
}

/// `[PAGE]` header plus one line per scene on the current page.
fn page_listing(editor: &StoryEditor) -> Vec<String> {
    let mut lines = vec![format!(
        "[PAGE] {}/{}",
        editor.current_page() + 1,
        editor.page_count()
    )];
    for scene in editor.current_page_scenes() {
        let cast = if scene.characters.is_empty() {
            String::new()
        } else {
            format!(" [{}]", scene.characters.join(", "))
        };
        let hidden = if scene.hidden { " (hidden)" } else { "" };
        let marker = if editor.view().is_expanded(&scene.id) { "v" } else { ">" };
        lines.push(format!(
            "  {marker} {}. {}{cast}{hidden}",
            scene.order + 1,
            scene.event
        ));
    }
    lines
}

fn number(s: &str) -> Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("Expected a number, got {s:?}"))
}

fn number_and_text(rest: &str) -> Result<(usize, &str), String> {
    match rest.split_once(char::is_whitespace) {
        Some((n, text)) => Ok((number(n)?, text.trim())),
        None => Ok((number(rest)?, "")),
    }
}

fn scene_id(editor: &StoryEditor, n: usize) -> Result<scenecraft_core::SceneId, String> {
    n.checked_sub(1)
        .and_then(|i| editor.draft().timeline().scenes().get(i))
        .map(|s| s.id.clone())
        .ok_or_else(|| format!("No scene {n}"))
}

fn ok(line: String) -> Reply {
    Reply::Continue(vec![line])
}

fn error(message: impl std::fmt::Display) -> Reply {
    Reply::Continue(vec![format!("[ERROR] {message}")])
}

/// Parse session options from command line arguments.
pub fn parse_config_from_args(args: &[String]) -> HeadlessConfig {
    let mut config = HeadlessConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--story" => {
                if let Some(id) = args.get(i + 1) {
                    config.story_id = Some(id.clone());
                    i += 1;
                }
            }
            "--title" => {
                if let Some(title) = args.get(i + 1) {
                    config.title = title.clone();
                    i += 1;
                }
            }
            "--width" => {
                if let Some(width) = args.get(i + 1).and_then(|w| w.parse().ok()) {
                    config.viewport.width = width;
                    i += 1;
                }
            }
            "--height" => {
                if let Some(height) = args.get(i + 1).and_then(|h| h.parse().ok()) {
                    config.viewport.height = height;
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    config
}
