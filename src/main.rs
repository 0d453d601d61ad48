use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alimi::config::Config;
use alimi::notify::{DiscordNotifier, NoopNotifier, Notifier};
use alimi::scrape::PageScraper;
use alimi::state::FileStateStore;
use alimi::watcher::Watcher;

#[derive(Parser)]
#[command(
    name = "alimi",
    version,
    about = "FFXIV Korea event watcher with Discord webhook notifications",
    long_about = None
)]
struct Cli {
    /// Send a summary list of all active events on startup
    #[arg(long)]
    summary: bool,

    /// Run one poll cycle and exit (useful for cron jobs)
    #[arg(long)]
    once: bool,

    /// Path to a TOML config file (environment variables used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    tracing::info!(pid = std::process::id(), "Starting alimi event watcher");
    if cli.summary {
        tracing::info!("Option: summary mode enabled");
    }
    if cli.once {
        tracing::info!("Option: run-once mode enabled");
    }

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let source = PageScraper::new(&config.source)?;
    let store = FileStateStore::new(&config.watcher.state_path);

    let notifier: Box<dyn Notifier + Send + Sync> =
        match DiscordNotifier::from_config(&config.notifier)? {
            Some(notifier) => Box::new(notifier),
            None => {
                tracing::warn!("No webhook URL configured; notifications will be logged only");
                Box::new(NoopNotifier)
            }
        };

    let watcher = Watcher::new(config.watcher, source, store, notifier);
    watcher.run(cli.once, cli.summary).await?;

    tracing::info!("alimi stopped");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("alimi=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("alimi=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
