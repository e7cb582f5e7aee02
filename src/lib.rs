//! position-journal: position sizing calculator and trade journal
//!
//! This library provides:
//! - Forward and reverse position sizing with margin affordability checks
//! - Risk:reward evaluation against a 1:2 minimum
//! - A SQLite journal of trade plans with checksummed schema migrations
//! - Saved calculations, account heat, settings and a watchlist
//! - A command layer returning status-coded errors, and the CLI built on it

pub mod calc;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

use clap::Parser;

use crate::cli::{Cli, Context};
use crate::config::AppConfig;

/// Parse the command line, set up logging and run the chosen command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config.display(), e);
        eprintln!("Using default configuration");
        AppConfig::default()
    });

    init_logging(&config.log_level);
    log::debug!("Configuration: {:?}", config);

    let ctx = Context::new(config, cli.db, cli.json);
    cli.command.execute(&ctx).await
}

/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).format_timestamp_millis().try_init();
}
