//! CLI definitions for movesync.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// movesync CLI.
#[derive(Parser)]
#[command(name = "movesync")]
#[command(about = "Keeps a browser chess board in sync with a move recommendation engine")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/movesync.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Attach to a browser tab and run the bot until Ctrl-C (default)
    Run {
        /// Substring of the URL of the tab to attach to
        #[arg(long)]
        page: Option<String>,

        /// Recommendation service endpoint
        #[arg(long, env = "MOVESYNC_ENGINE")]
        engine: Option<String>,

        /// Chrome remote debugging endpoint
        #[arg(long, env = "MOVESYNC_BROWSER")]
        browser: Option<String>,
    },

    /// Run the recommendation service
    Serve {
        /// Thinking time per request
        #[arg(long)]
        milliseconds: Option<u64>,

        /// Engine threads
        #[arg(long)]
        threads: Option<u32>,

        /// Engine hash size in MB
        #[arg(long)]
        hash: Option<u32>,

        /// Path to the UCI engine binary
        #[arg(long)]
        engine_path: Option<String>,
    },

    /// Validate and print the effective configuration
    Config,
}
