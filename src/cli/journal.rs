//! Journal commands

use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::calc::calculate_r_multiple;
use crate::cli::output::{print_entries, print_entry, print_json};
use crate::cli::Context;
use crate::commands;
use crate::models::{
    CreateJournalInput, JournalFilters, SetupType, TradeDirection, TradeStatus,
};

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    /// Record a trade plan
    Add {
        #[arg(long)]
        ticker: String,

        #[arg(long)]
        setup: SetupType,

        #[arg(long)]
        entry: f64,

        /// Share count
        #[arg(long)]
        size: f64,

        #[arg(long, default_value = "long")]
        direction: TradeDirection,

        #[arg(long)]
        stop: Option<f64>,

        #[arg(long)]
        target: Option<f64>,

        /// Amount at risk; derived from the stop distance when omitted
        #[arg(long)]
        risk: Option<f64>,

        #[arg(long)]
        status: Option<TradeStatus>,
    },
    /// List entries, newest first
    List {
        #[arg(long)]
        status: Option<TradeStatus>,

        /// Substring of the ticker
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Show a single entry
    Show { id: String },
    /// Edit an entry. Size, risk and trade value are fixed at creation.
    Edit {
        id: String,

        #[arg(long)]
        status: Option<TradeStatus>,

        #[arg(long)]
        ticker: Option<String>,

        #[arg(long)]
        setup: Option<SetupType>,

        #[arg(long)]
        entry: Option<f64>,

        #[arg(long, conflicts_with = "clear_stop")]
        stop: Option<f64>,

        #[arg(long, conflicts_with = "clear_target")]
        target: Option<f64>,

        #[arg(long)]
        direction: Option<TradeDirection>,

        /// Remove the stop loss
        #[arg(long)]
        clear_stop: bool,

        /// Remove the target
        #[arg(long)]
        clear_target: bool,
    },
    /// Move an entry to the next status: order, open, closed, then back to order
    Advance { id: String },
    /// Delete an entry
    Delete { id: String },
    /// Check whether a ticker already has an open position
    Check { ticker: String },
}

#[allow(clippy::too_many_arguments)]
fn add_input(
    ticker: &str,
    setup: SetupType,
    entry: f64,
    size: f64,
    direction: TradeDirection,
    stop: Option<f64>,
    target: Option<f64>,
    risk: Option<f64>,
    status: Option<TradeStatus>,
) -> CreateJournalInput {
    let risk_amount = risk.or_else(|| stop.map(|s| (s - entry).abs() * size));
    let rr = match (stop, target) {
        (Some(s), Some(t)) => calculate_r_multiple(entry, s, t, direction),
        _ => None,
    };

    CreateJournalInput {
        ticker: Some(ticker.to_string()),
        setup_type: Some(setup),
        entry_price: Some(entry),
        stop_loss_price: stop,
        position_size: Some(size),
        risk_amount,
        direction: Some(direction),
        status,
        trade_value: Some(entry * size),
        r_multiple: rr.as_ref().map(|r| r.r_multiple),
        target_price: target,
        potential_profit: rr.as_ref().map(|r| r.potential_profit * size),
        calculation_id: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn edit_patch(
    status: Option<TradeStatus>,
    ticker: Option<&str>,
    setup: Option<SetupType>,
    entry: Option<f64>,
    stop: Option<f64>,
    target: Option<f64>,
    direction: Option<TradeDirection>,
    clear_stop: bool,
    clear_target: bool,
) -> Value {
    let mut patch = Map::new();
    if let Some(status) = status {
        patch.insert("status".into(), json!(status));
    }
    if let Some(ticker) = ticker {
        patch.insert("ticker".into(), json!(ticker));
    }
    if let Some(setup) = setup {
        patch.insert("setupType".into(), json!(setup.as_str()));
    }
    if let Some(entry) = entry {
        patch.insert("entryPrice".into(), json!(entry));
    }
    if clear_stop {
        patch.insert("stopLossPrice".into(), Value::Null);
    } else if let Some(stop) = stop {
        patch.insert("stopLossPrice".into(), json!(stop));
    }
    if clear_target {
        patch.insert("targetPrice".into(), Value::Null);
    } else if let Some(target) = target {
        patch.insert("targetPrice".into(), json!(target));
    }
    if let Some(direction) = direction {
        patch.insert("direction".into(), json!(direction));
    }
    Value::Object(patch)
}

impl JournalCommand {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let db = ctx.open_database()?;

        match self {
            JournalCommand::Add {
                ticker,
                setup,
                entry,
                size,
                direction,
                stop,
                target,
                risk,
                status,
            } => {
                if commands::has_similar_open_trade(&db, ticker).await? {
                    log::warn!("{} already has an open position", ticker.to_uppercase());
                }
                let input = add_input(
                    ticker, *setup, *entry, *size, *direction, *stop, *target, *risk, *status,
                );
                let created = commands::create_journal_entry(&db, input).await?;
                print_entry(ctx, &created)
            }
            JournalCommand::List { status, ticker } => {
                let filters = JournalFilters {
                    status: *status,
                    ticker: ticker.clone(),
                };
                let entries = commands::get_journal_entries(&db, Some(filters)).await?;
                print_entries(ctx, &entries)
            }
            JournalCommand::Show { id } => {
                let entry = commands::get_journal_entry(&db, id).await?;
                print_entry(ctx, &entry)
            }
            JournalCommand::Edit {
                id,
                status,
                ticker,
                setup,
                entry,
                stop,
                target,
                direction,
                clear_stop,
                clear_target,
            } => {
                let patch = edit_patch(
                    *status,
                    ticker.as_deref(),
                    *setup,
                    *entry,
                    *stop,
                    *target,
                    *direction,
                    *clear_stop,
                    *clear_target,
                );
                let updated = commands::update_journal_entry(&db, id, patch).await?;
                print_entry(ctx, &updated)
            }
            JournalCommand::Advance { id } => {
                let current = commands::get_journal_entry(&db, id).await?;
                let patch = json!({ "status": current.status.next() });
                let updated = commands::update_journal_entry(&db, id, patch).await?;
                print_entry(ctx, &updated)
            }
            JournalCommand::Delete { id } => {
                commands::delete_journal_entry(&db, id).await?;
                if ctx.json {
                    return print_json(&json!({ "deleted": id }));
                }
                println!("Deleted {}", id);
                Ok(())
            }
            JournalCommand::Check { ticker } => {
                let similar = commands::has_similar_open_trade(&db, ticker).await?;
                if ctx.json {
                    return print_json(&json!({ "hasSimilarOpenTrade": similar }));
                }
                if similar {
                    println!("⚠️ {} already has an open position", ticker.to_uppercase());
                } else {
                    println!("No open position for {}", ticker.to_uppercase());
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JournalUpdate;

    #[test]
    fn test_add_input_derives_risk_and_reward() {
        let input = add_input(
            "msft",
            SetupType::Pullback,
            100.0,
            10.0,
            TradeDirection::Short,
            Some(104.0),
            Some(90.0),
            None,
            None,
        );
        assert_eq!(input.risk_amount, Some(40.0));
        assert_eq!(input.trade_value, Some(1000.0));
        assert_eq!(input.r_multiple, Some(2.5));
        assert_eq!(input.potential_profit, Some(100.0));
    }

    #[test]
    fn test_edit_patch_is_accepted_by_update_parser() {
        let patch = edit_patch(
            Some(TradeStatus::Open),
            Some("nvda"),
            Some(SetupType::TrendFollowing),
            None,
            Some(99.0),
            None,
            Some(TradeDirection::Short),
            false,
            true,
        );
        let update = JournalUpdate::from_json(&patch).unwrap();
        assert_eq!(update.status, Some(TradeStatus::Open));
        assert_eq!(update.ticker.as_deref(), Some("NVDA"));
        assert_eq!(update.setup_type, Some(SetupType::TrendFollowing));
        assert_eq!(update.stop_loss_price, Some(Some(99.0)));
        assert_eq!(update.target_price, Some(None));
        assert_eq!(update.direction, Some(TradeDirection::Short));
    }
}
