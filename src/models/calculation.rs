use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calc::input::parse_number;
use crate::calc::{CalculationInputs, CalculationResult};
use crate::models::{CalculationMode, TradeDirection};

/// Default number of calculations returned by a listing.
pub const DEFAULT_CALCULATION_LIMIT: u32 = 10;

/// A calculator run saved for later reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCalculation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: CalculationSnapshot,
}

/// Parsed inputs and the result figures of one calculation, as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationSnapshot {
    pub mode: CalculationMode,
    pub trade_direction: TradeDirection,
    pub entry_price: f64,
    pub account_size: Option<f64>,
    pub risk_percentage: Option<f64>,
    pub stop_loss_price: Option<f64>,
    pub target_price: Option<f64>,
    pub excess_liquidity: Option<f64>,
    pub available_cash: Option<f64>,
    pub cash_usage_percentage: Option<f64>,
    pub max_loss: Option<f64>,
    pub risk_per_share: Option<f64>,
    pub max_shares: Option<f64>,
    pub trade_value: Option<f64>,
    pub initial_margin_cost: Option<f64>,
    pub r_multiple: Option<f64>,
    pub potential_profit: Option<f64>,
    pub can_afford: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCalculationInput {
    pub inputs: CalculationInputs,
    #[serde(default)]
    pub result: Option<CalculationResult>,
}

fn nonzero(value: f64) -> Option<f64> {
    (value != 0.0).then_some(value)
}

impl SaveCalculationInput {
    pub fn mode(&self) -> CalculationMode {
        match self.inputs {
            CalculationInputs::Forward(_) => CalculationMode::Forward,
            CalculationInputs::Reverse(_) => CalculationMode::Reverse,
        }
    }

    pub fn snapshot(&self) -> CalculationSnapshot {
        let mut snapshot = CalculationSnapshot {
            mode: self.mode(),
            trade_direction: self.inputs.trade_direction(),
            ..Default::default()
        };

        match &self.inputs {
            CalculationInputs::Forward(f) => {
                snapshot.entry_price = parse_number(&f.entry_price).unwrap_or(0.0);
                snapshot.account_size = parse_number(&f.account_size);
                snapshot.risk_percentage = parse_number(&f.risk_percentage);
                snapshot.stop_loss_price = parse_number(&f.stop_loss_price);
                snapshot.target_price = parse_number(&f.target_price);
                snapshot.excess_liquidity = parse_number(&f.excess_liquidity);
            }
            CalculationInputs::Reverse(r) => {
                snapshot.entry_price = parse_number(&r.entry_price).unwrap_or(0.0);
                snapshot.available_cash = parse_number(&r.available_cash);
                snapshot.cash_usage_percentage = parse_number(&r.cash_usage_percentage);
                snapshot.stop_loss_price = parse_number(&r.stop_loss_price);
                snapshot.account_size = parse_number(&r.account_size);
            }
        }

        if let Some(result) = &self.result {
            snapshot.max_loss = nonzero(result.max_loss);
            snapshot.risk_per_share = nonzero(result.risk_per_share);
            snapshot.max_shares = nonzero(result.max_shares);
            snapshot.trade_value = nonzero(result.trade_value);
            snapshot.initial_margin_cost = nonzero(result.initial_margin_cost);
            snapshot.r_multiple = result.r_multiple.and_then(nonzero);
            snapshot.potential_profit = result.potential_profit.and_then(nonzero);
            snapshot.can_afford = Some(result.can_afford);
        }

        snapshot
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationFilters {
    pub mode: Option<CalculationMode>,
    pub limit: Option<u32>,
}

impl CalculationFilters {
    pub fn effective_limit(&self) -> u32 {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_CALCULATION_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{ForwardInputs, ReverseInputs};

    #[test]
    fn test_forward_snapshot() {
        let inputs = ForwardInputs {
            account_size: "10000".into(),
            risk_percentage: "5".into(),
            entry_price: "85".into(),
            stop_loss_price: "80".into(),
            target_price: String::new(),
            trade_direction: TradeDirection::Short,
            excess_liquidity: "1600".into(),
        };
        let result = crate::calc::calculate_forward(&inputs).into_ready();
        let save = SaveCalculationInput {
            inputs: CalculationInputs::Forward(inputs),
            result,
        };
        let snapshot = save.snapshot();
        assert_eq!(snapshot.mode, CalculationMode::Forward);
        assert_eq!(snapshot.trade_direction, TradeDirection::Short);
        assert_eq!(snapshot.entry_price, 85.0);
        assert_eq!(snapshot.account_size, Some(10000.0));
        assert!(snapshot.target_price.is_none());
        assert!(snapshot.available_cash.is_none());
        assert_eq!(snapshot.max_shares, Some(100.0));
        assert_eq!(snapshot.initial_margin_cost, Some(8500.0));
        assert_eq!(snapshot.can_afford, Some(false));
    }

    #[test]
    fn test_reverse_snapshot_without_result() {
        let save = SaveCalculationInput {
            inputs: CalculationInputs::Reverse(ReverseInputs {
                available_cash: "1600".into(),
                entry_price: "abc".into(),
                ..Default::default()
            }),
            result: None,
        };
        let snapshot = save.snapshot();
        assert_eq!(snapshot.mode, CalculationMode::Reverse);
        assert_eq!(snapshot.entry_price, 0.0);
        assert_eq!(snapshot.cash_usage_percentage, Some(50.0));
        assert!(snapshot.max_loss.is_none());
        assert!(snapshot.can_afford.is_none());
    }

    #[test]
    fn test_limit_defaults_to_ten() {
        assert_eq!(CalculationFilters::default().effective_limit(), 10);
        let filters = CalculationFilters { mode: None, limit: Some(3) };
        assert_eq!(filters.effective_limit(), 3);
    }
}
