//! movesync - browser move synchronization bot
//!
//! Main entry point for the movesync CLI, the bot runner and the
//! recommendation service.

mod cli;
mod commands;

use std::path::PathBuf;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use movesync_config::{Config, ConfigLoader};

use crate::cli::{Cli, Commands};

/// Get the .movesync directory path.
fn movesync_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".movesync"))
        .unwrap_or_else(|| PathBuf::from(".movesync"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.movesync/logs/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = movesync_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("movesync")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(ConfigLoader::load_or_default(&cli.config)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        None => commands::run_bot(config).await,
        Some(Commands::Run {
            page,
            engine,
            browser,
        }) => {
            if let Some(page) = page {
                config.browser.page_url_pattern = page;
            }
            if let Some(engine) = engine {
                config.engine.endpoint = engine;
            }
            if let Some(browser) = browser {
                config.browser.endpoint = browser;
            }
            commands::run_bot(config).await
        }
        Some(Commands::Serve {
            milliseconds,
            threads,
            hash,
            engine_path,
        }) => {
            if let Some(ms) = milliseconds {
                config.service.movetime_ms = ms;
            }
            if let Some(threads) = threads {
                config.service.threads = threads;
            }
            if let Some(hash) = hash {
                config.service.hash_mb = hash;
            }
            if let Some(path) = engine_path {
                config.service.engine_path = path;
            }
            commands::serve(config).await
        }
        Some(Commands::Config) => commands::show_config(&config),
    }
}
