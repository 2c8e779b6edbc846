use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use moodchat_core::render::render_page;
use moodchat_core::{Config, Controller, FileStore, ReplyClient, TurnRunner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod clipboard;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "moodchat")]
#[command(about = "Chat with an emotion-aware assistant from your terminal")]
struct Cli {
    /// Reply endpoint (overrides config and MOODCHAT_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,
    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the saved conversation to an HTML page
    Export {
        /// Output file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    let data_dir = Config::get_data_dir()?;
    let store = FileStore::open(&data_dir.join("storage.json"))?;

    match cli.command {
        Some(Commands::Export { path }) => export(store, &path),
        None => {
            init_logging(&data_dir)?;
            run(config, store).await
        }
    }
}

/// Log to a file so the terminal UI stays clean
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("moodchat.log"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,moodchat_core=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

fn export(store: FileStore, path: &Path) -> Result<()> {
    let controller = Controller::new(store);
    let page = render_page(controller.transcript(), controller.theme());
    fs::write(path, page)?;

    println!(
        "Exported {} messages to {}",
        controller.transcript().len(),
        path.display()
    );
    Ok(())
}

async fn run(config: Config, store: FileStore) -> Result<()> {
    tracing::info!(endpoint = %config.endpoint, "Starting moodchat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let client = Arc::new(ReplyClient::new(&config.endpoint));
    let runner = TurnRunner::new(client, config.timing(), events.sender());
    let mut app = App::new(&config, Box::new(store), runner);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
