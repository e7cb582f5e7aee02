//! Heat, settings and watchlist commands

use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::output::{print_heat, print_json, print_settings, print_watchlist};
use crate::cli::Context;
use crate::commands;
use crate::models::{AddWatchlistItemInput, SetupType, UpdateSettingsInput};

#[derive(Args, Debug)]
pub struct HeatArgs {
    /// Account balance; the stored balance is used when omitted
    #[arg(long)]
    pub balance: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the stored settings
    Show,
    /// Change stored settings; omitted values are kept
    Set {
        /// Account balance used for heat; 0 clears it
        #[arg(long)]
        balance: Option<f64>,

        #[arg(long)]
        currency: Option<String>,

        #[arg(long)]
        checklist_gatekeeper: Option<bool>,

        #[arg(long)]
        drawdown_simulator: Option<bool>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistCommand {
    /// List watched tickers, newest first
    List,
    /// Watch a ticker for a setup
    Add {
        #[arg(long)]
        ticker: String,

        #[arg(long)]
        setup: SetupType,

        /// Price at which the setup triggers
        #[arg(long)]
        trigger: f64,

        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Stop watching an item
    Remove { id: String },
}

impl HeatArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let db = ctx.open_database()?;
        let heat = commands::account_heat(&db, &db, self.balance).await?;
        print_heat(ctx, &heat)
    }
}

impl SettingsCommand {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let db = ctx.open_database()?;
        let settings = match self {
            SettingsCommand::Show => commands::get_settings(&db).await?,
            SettingsCommand::Set {
                balance,
                currency,
                checklist_gatekeeper,
                drawdown_simulator,
            } => {
                let input = UpdateSettingsInput {
                    checklist_gatekeeper_enabled: *checklist_gatekeeper,
                    drawdown_simulator_enabled: *drawdown_simulator,
                    account_balance: *balance,
                    currency: currency.clone(),
                };
                commands::update_settings(&db, input).await?
            }
        };
        print_settings(ctx, &settings)
    }
}

impl WatchlistCommand {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let db = ctx.open_database()?;
        match self {
            WatchlistCommand::List => {
                let items = commands::get_watchlist(&db).await?;
                print_watchlist(ctx, &items)
            }
            WatchlistCommand::Add {
                ticker,
                setup,
                trigger,
                notes,
            } => {
                let item = AddWatchlistItemInput {
                    ticker: ticker.clone(),
                    setup_type: *setup,
                    trigger_price: *trigger,
                    notes: notes.clone(),
                };
                let added = commands::add_to_watchlist(&db, item).await?;
                print_watchlist(ctx, std::slice::from_ref(&added))
            }
            WatchlistCommand::Remove { id } => {
                commands::remove_from_watchlist(&db, id).await?;
                if ctx.json {
                    return print_json(&json!({ "removed": id }));
                }
                println!("Removed {}", id);
                Ok(())
            }
        }
    }
}
