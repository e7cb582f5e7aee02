//! CLI interface for position-journal
//!
//! Provides subcommands for:
//! - `forward` / `reverse`: Size a position from risk or from available cash
//! - `rr`: Judge a risk:reward ratio
//! - `journal`: Add, list, show, edit, advance, delete and check journal entries
//! - `calc`: List saved calculations
//! - `heat`: Show account heat over open positions
//! - `settings` / `watchlist`: Manage stored preferences and watched tickers

mod account;
mod calc;
mod journal;
mod output;

pub use account::{HeatArgs, SettingsCommand, WatchlistCommand};
pub use calc::{CalcCommand, ForwardArgs, ReverseArgs, RrArgs};
pub use journal::JournalCommand;

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::db::Database;

#[derive(Parser, Debug)]
#[command(name = "position-journal")]
#[command(about = "Position sizing calculator and trade journal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "position_journal.toml")]
    pub config: PathBuf,

    /// Database file, overriding the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Size a position from account size and risk percentage
    Forward(ForwardArgs),
    /// Size a position from the cash available for margin
    Reverse(ReverseArgs),
    /// Evaluate the risk:reward ratio of a trade plan
    Rr(RrArgs),
    /// Manage journal entries
    #[command(subcommand)]
    Journal(JournalCommand),
    /// Saved calculations
    #[command(subcommand)]
    Calc(CalcCommand),
    /// Total risk of open positions as a percent of the account
    Heat(HeatArgs),
    /// Show or change stored settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Manage watched tickers
    #[command(subcommand)]
    Watchlist(WatchlistCommand),
}

/// What every subcommand gets to work with.
pub struct Context {
    pub config: AppConfig,
    pub database_path: PathBuf,
    pub json: bool,
    stored_currency: Mutex<Option<String>>,
}

impl Context {
    pub fn new(config: AppConfig, db_override: Option<PathBuf>, json: bool) -> Self {
        let database_path = db_override.unwrap_or_else(|| config.database_path.clone());
        Self {
            config,
            database_path,
            json,
            stored_currency: Mutex::new(None),
        }
    }

    /// The stored settings currency once a database has been opened, else the configured symbol.
    pub fn currency_symbol(&self) -> String {
        self.stored_currency
            .lock()
            .ok()
            .and_then(|stored| stored.clone())
            .unwrap_or_else(|| self.config.currency_symbol.clone())
    }

    /// Open (and migrate) the journal database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        if let Some(parent) = self.database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let path = self
            .database_path
            .to_str()
            .with_context(|| format!("Database path is not valid UTF-8: {:?}", self.database_path))?;
        let db = Database::new(path).with_context(|| {
            format!(
                "Failed to open database {}. Pre-migration backups are kept in {}",
                self.database_path.display(),
                self.database_path
                    .parent()
                    .unwrap_or_else(|| std::path::Path::new("."))
                    .join("backups")
                    .display()
            )
        })?;

        let currency = crate::store::settings::stored_currency(&db)?;
        if let Ok(mut stored) = self.stored_currency.lock() {
            *stored = Some(currency);
        }
        Ok(db)
    }
}

impl Commands {
    pub async fn execute(self, ctx: &Context) -> anyhow::Result<()> {
        match self {
            Commands::Forward(args) => args.execute(ctx).await,
            Commands::Reverse(args) => args.execute(ctx).await,
            Commands::Rr(args) => args.execute(ctx),
            Commands::Journal(cmd) => cmd.execute(ctx).await,
            Commands::Calc(cmd) => cmd.execute(ctx).await,
            Commands::Heat(args) => args.execute(ctx).await,
            Commands::Settings(cmd) => cmd.execute(ctx).await,
            Commands::Watchlist(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_db_override_wins() {
        let cli = Cli::parse_from(["position-journal", "--db", "/tmp/other.db", "journal", "list"]);
        let ctx = Context::new(AppConfig::default(), cli.db, cli.json);
        assert_eq!(ctx.database_path, PathBuf::from("/tmp/other.db"));

        let ctx = Context::new(AppConfig::default(), None, false);
        assert_eq!(ctx.database_path, PathBuf::from("position_journal.db"));
    }

    #[tokio::test]
    async fn test_journal_commands_against_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("journal.db");
        let ctx = Context::new(AppConfig::default(), Some(db_path.clone()), true);

        let add = Cli::parse_from([
            "position-journal", "journal", "add", "--ticker", "aapl", "--setup", "breakout",
            "--entry", "100", "--stop", "95", "--target", "110", "--size", "100",
        ]);
        add.command.execute(&ctx).await.unwrap();
        assert!(db_path.exists());

        let db = ctx.open_database().unwrap();
        let entries = crate::commands::get_journal_entries(&db, None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ticker, "AAPL");
        assert_eq!(entries[0].r_multiple, Some(2.0));
        assert_eq!(entries[0].risk_amount, Some(500.0));
    }
}
