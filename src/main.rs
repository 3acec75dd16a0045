use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hbnb::config::Config;
use hbnb::console::Console;
use hbnb::storage::FileStorage;

#[derive(Parser)]
#[command(name = "hbnb")]
#[command(about = "Command interpreter for HBnB records stored in a JSON file")]
struct Cli {
    /// JSON file backing the object store (overrides HBNB_FILE_PATH)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Run a single command line and exit
    #[arg(short, long)]
    command: Option<String>,
}

/// Initialize tracing on stderr; stdout belongs to the console.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "hbnb=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().with_file_path(cli.file);
    let mut storage = FileStorage::open(&config.file_path);
    let summary = storage.reload();
    tracing::info!(
        path = %config.file_path.display(),
        loaded = summary.loaded,
        skipped = summary.skipped,
        "object store ready"
    );

    let mut console = Console::new(storage);
    let mut out = io::stdout().lock();

    match cli.command {
        Some(line) => {
            console.execute(&line, &mut out)?;
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            console.run(stdin.lock(), &mut out, interactive)?;
        }
    }

    Ok(())
}
