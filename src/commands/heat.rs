//! Account heat: the combined risk of every open position as a percent of the account.

use serde::Serialize;

use crate::calc::constants::{CAUTION_ACCOUNT_HEAT_PERCENTAGE, MAX_ACCOUNT_HEAT_PERCENTAGE};
use crate::commands::{respond, CommandResult};
use crate::error::AppResult;
use crate::models::{JournalEntry, JournalFilters, TradeStatus};
use crate::store::{JournalStore, SettingsRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    Safe,
    Caution,
    Danger,
    Unknown,
}

impl HeatLevel {
    fn from_heat(total_heat: Option<f64>) -> Self {
        match total_heat {
            None => HeatLevel::Unknown,
            Some(h) if h > MAX_ACCOUNT_HEAT_PERCENTAGE => HeatLevel::Danger,
            Some(h) if h > CAUTION_ACCOUNT_HEAT_PERCENTAGE => HeatLevel::Caution,
            Some(_) => HeatLevel::Safe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHeat {
    pub total_heat: Option<f64>,
    pub total_risk: f64,
    pub open_positions_count: usize,
    /// Open positions without a risk amount; they cannot contribute to the heat.
    pub excluded_count: usize,
    pub level: HeatLevel,
    pub is_new_trade_disabled: bool,
    pub message: String,
}

fn heat_message(level: HeatLevel, total_heat: Option<f64>) -> String {
    let heat = total_heat.unwrap_or(0.0);
    match level {
        HeatLevel::Unknown => "Set account size to view portfolio risk".to_string(),
        HeatLevel::Danger => format!(
            "Total Heat exceeds {}%. New trades are disabled. Close existing positions to reduce risk.",
            MAX_ACCOUNT_HEAT_PERCENTAGE
        ),
        HeatLevel::Caution => format!(
            "Total Heat is {:.2}%. Approaching the {}% limit.",
            heat, MAX_ACCOUNT_HEAT_PERCENTAGE
        ),
        HeatLevel::Safe => format!(
            "Total Heat is {:.2}%. Portfolio risk is within safe limits.",
            heat
        ),
    }
}

/// Aggregate heat over the given entries. Only `open` entries count.
pub fn compute_heat(entries: &[JournalEntry], account_balance: Option<f64>) -> AccountHeat {
    let open: Vec<&JournalEntry> = entries
        .iter()
        .filter(|e| e.status == TradeStatus::Open)
        .collect();
    let excluded_count = open.iter().filter(|e| e.risk_amount.is_none()).count();

    let balance = account_balance.filter(|b| b.is_finite() && *b > 0.0);

    let (total_risk, total_heat) = match balance {
        Some(balance) => {
            let total_risk: f64 = open.iter().filter_map(|e| e.risk_amount).sum();
            (total_risk, Some(total_risk * 100.0 / balance))
        }
        None => (0.0, None),
    };

    let level = HeatLevel::from_heat(total_heat);

    AccountHeat {
        total_heat,
        total_risk,
        open_positions_count: open.len(),
        excluded_count,
        level,
        is_new_trade_disabled: total_heat.is_some_and(|h| h > MAX_ACCOUNT_HEAT_PERCENTAGE),
        message: heat_message(level, total_heat),
    }
}

async fn account_heat_inner(
    journal: &dyn JournalStore,
    settings: &dyn SettingsRepository,
    account_balance: Option<f64>,
) -> AppResult<AccountHeat> {
    let balance = match account_balance {
        Some(balance) => Some(balance),
        None => settings.get_settings().await?.account_balance,
    };

    let filters = JournalFilters {
        status: Some(TradeStatus::Open),
        ticker: None,
    };
    let open = journal.list_entries(&filters).await?;

    let heat = compute_heat(&open, balance);
    if heat.is_new_trade_disabled {
        log::warn!("{}", heat.message);
    }
    Ok(heat)
}

/// Heat against the given balance, or the stored account balance when none is given.
pub async fn account_heat(
    journal: &dyn JournalStore,
    settings: &dyn SettingsRepository,
    account_balance: Option<f64>,
) -> CommandResult<AccountHeat> {
    account_heat_inner(journal, settings, account_balance)
        .await
        .map_err(respond)
}
