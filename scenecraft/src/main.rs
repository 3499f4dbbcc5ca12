//! Scenecraft headless story editor.
//!
//! Opens a story from the file store (or starts a new one) and reads editing
//! commands from stdin:
//!
//! ```bash
//! cargo run -p scenecraft -- --story 42 --width 1280 --height 800
//! ```

mod headless;

use scenecraft_core::{EngineConfig, JsonFileStore, StoryDraft, StoryEditor, StoryId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays a clean protocol stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenecraft=info,scenecraft_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let engine = EngineConfig::from_env()?;
    let options = headless::parse_config_from_args(&args);
    let store = JsonFileStore::new(&engine.store_dir);

    let draft = match &options.story_id {
        Some(id) => {
            let record = store.load_story(&StoryId::new(id.as_str())).await?;
            tracing::info!(story_id = %record.id, title = %record.title, "Opened story");
            StoryDraft::from_record(record)
        }
        None => StoryDraft::new(options.title.clone()),
    };
    let editor = StoryEditor::new(draft, engine.pagination).with_viewport(options.viewport);

    headless::run_headless(editor, store).await?;
    Ok(())
}

fn print_help() {
    println!("Scenecraft - story timeline editor");
    println!();
    println!("USAGE:");
    println!("  scenecraft [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help         Show this help message");
    println!("  --story <ID>       Open a saved story by id");
    println!("  --title <TITLE>    Title for a new story (default: Untitled Story)");
    println!("  --width <PX>       Viewport width (default: 1280)");
    println!("  --height <PX>      Viewport height (default: 800)");
    println!();
    println!("ENVIRONMENT:");
    println!("  SCENECRAFT_STORE_DIR            Story directory (default: stories)");
    println!("  SCENECRAFT_SCENES_PER_PAGE      Requested scenes per page (default: 10)");
    println!("  SCENECRAFT_MIN_SCENES_PER_PAGE  Lower clamp (default: 1)");
    println!("  SCENECRAFT_CHARS_PER_LINE       Reader-mode line estimate (default: 80)");
    println!("  RUST_LOG                        Log filter (default: scenecraft=info)");
}
