use std::sync::Arc;

use clap::Parser;
use jokes_content::{ChuckNorrisSource, JokeSource};
use jokes_core::JokesConfig;
use jokes_store::{KeyValueStore, SqliteStore};
use tokio::sync::mpsc;
use tracing::{info, warn};

mod controller;
mod terminal;

use terminal::Command;

/// Shows a Chuck Norris joke and swaps it for a new one every few minutes.
#[derive(Debug, Parser)]
#[command(name = "jokes", version)]
struct Cli {
    /// Config file (default: ~/.jokes/jokes.toml).
    #[arg(long, env = "JOKES_CONFIG")]
    config: Option<String>,

    /// Ignore stdin; run until Ctrl-C.
    #[arg(long)]
    no_input: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jokes=info,jokes_scheduler=info,jokes_content=info,jokes_store=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = JokesConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        JokesConfig::default()
    });

    let db_path = config.storage.resolved_path();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, namespace = %config.storage.namespace, "opening preference store");
    let store: Arc<dyn KeyValueStore> =
        Arc::new(SqliteStore::open(&db_path, config.storage.namespace.clone())?);

    let source: Arc<dyn JokeSource> = Arc::new(ChuckNorrisSource::new(&config)?);
    info!(url = %config.joke_url(), "joke source ready");

    let (command_tx, command_rx) = mpsc::channel::<Command>(16);
    if !cli.no_input {
        println!("{}", terminal::HELP);
        terminal::spawn_stdin_reader(command_tx.clone());
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = command_tx.send(Command::Quit).await;
        }
    });

    controller::run(config, store, source, command_rx).await
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(path, "could not create data directory: {e}");
        }
    }
}
