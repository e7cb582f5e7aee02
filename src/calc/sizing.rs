//! Position sizing engine.
//!
//! Forward mode starts from a risk budget (account × risk %) and a stop distance
//! to find the share count. Reverse mode starts from the cash available and finds
//! the largest position it can carry, then reports the risk that implies.

use serde::{Deserialize, Serialize};

use crate::calc::constants::{
    DEFAULT_CASH_USAGE_PERCENTAGE, DEFAULT_RISK_PERCENTAGE, LONG_MARGIN_REQUIREMENT,
    MAX_RECOMMENDED_RISK_PERCENTAGE, SHORT_MARGIN_REQUIREMENT,
};
use crate::calc::input::parse_amount;
use crate::calc::r_multiple::calculate_r_multiple;
use crate::models::TradeDirection;

pub fn margin_requirement(direction: TradeDirection) -> f64 {
    match direction {
        TradeDirection::Long => LONG_MARGIN_REQUIREMENT,
        TradeDirection::Short => SHORT_MARGIN_REQUIREMENT,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForwardInputs {
    pub account_size: String,
    pub risk_percentage: String,
    pub entry_price: String,
    pub stop_loss_price: String,
    pub target_price: String,
    pub trade_direction: TradeDirection,
    pub excess_liquidity: String,
}

impl Default for ForwardInputs {
    fn default() -> Self {
        Self {
            account_size: String::new(),
            risk_percentage: DEFAULT_RISK_PERCENTAGE.to_string(),
            entry_price: String::new(),
            stop_loss_price: String::new(),
            target_price: String::new(),
            trade_direction: TradeDirection::Long,
            excess_liquidity: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReverseInputs {
    pub available_cash: String,
    pub cash_usage_percentage: String,
    pub entry_price: String,
    pub trade_direction: TradeDirection,
    pub stop_loss_price: String,
    pub account_size: String,
}

impl Default for ReverseInputs {
    fn default() -> Self {
        Self {
            available_cash: String::new(),
            cash_usage_percentage: DEFAULT_CASH_USAGE_PERCENTAGE.to_string(),
            entry_price: String::new(),
            trade_direction: TradeDirection::Long,
            stop_loss_price: String::new(),
            account_size: String::new(),
        }
    }
}

/// Calculator inputs tagged by mode, as submitted by the calculator form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CalculationInputs {
    Forward(ForwardInputs),
    Reverse(ReverseInputs),
}

impl CalculationInputs {
    pub fn calculate(&self) -> CalcOutcome {
        match self {
            CalculationInputs::Forward(inputs) => calculate_forward(inputs),
            CalculationInputs::Reverse(inputs) => calculate_reverse(inputs),
        }
    }

    pub fn trade_direction(&self) -> TradeDirection {
        match self {
            CalculationInputs::Forward(inputs) => inputs.trade_direction,
            CalculationInputs::Reverse(inputs) => inputs.trade_direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub max_loss: f64,
    pub risk_per_share: f64,
    pub max_shares: f64,
    pub trade_value: f64,
    pub initial_margin_cost: f64,
    pub can_afford: bool,
    pub affordability_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_multiple: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_multiple_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_good_bet: Option<bool>,
}

/// Result of running the calculator. `Incomplete` means the form is not filled in
/// yet; it is not an error and must not be read as a zero-sized position.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcOutcome {
    Ready(CalculationResult),
    Incomplete,
}

impl CalcOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, CalcOutcome::Ready(_))
    }

    pub fn into_ready(self) -> Option<CalculationResult> {
        match self {
            CalcOutcome::Ready(result) => Some(result),
            CalcOutcome::Incomplete => None,
        }
    }
}

pub fn calculate_forward(inputs: &ForwardInputs) -> CalcOutcome {
    let (Some(account), Some(risk_pct), Some(entry), Some(stop_loss), Some(liquidity)) = (
        parse_amount(&inputs.account_size),
        parse_amount(&inputs.risk_percentage),
        parse_amount(&inputs.entry_price),
        parse_amount(&inputs.stop_loss_price),
        parse_amount(&inputs.excess_liquidity),
    ) else {
        return CalcOutcome::Incomplete;
    };
    let target = parse_amount(&inputs.target_price);

    let max_loss = account * (risk_pct / 100.0);
    let risk_per_share = (stop_loss - entry).abs();
    let max_shares = if risk_per_share > 0.0 {
        max_loss / risk_per_share
    } else {
        0.0
    };
    let trade_value = max_shares * entry;

    let initial_margin_cost = trade_value * margin_requirement(inputs.trade_direction);

    // Only half of the free cash may go to margin; the rest is buffer.
    let max_allowed_margin = liquidity / 2.0;
    let can_afford = initial_margin_cost < max_allowed_margin;
    let affordability_message = if can_afford {
        format!(
            "✅ You can afford this trade. Margin cost ({:.2}) is less than 50% of excess liquidity ({:.2})",
            initial_margin_cost, max_allowed_margin
        )
    } else {
        format!(
            "❌ You cannot afford this trade. Margin cost ({:.2}) exceeds 50% of excess liquidity ({:.2})",
            initial_margin_cost, max_allowed_margin
        )
    };

    let risk_reward =
        target.and_then(|t| calculate_r_multiple(entry, stop_loss, t, inputs.trade_direction));

    CalcOutcome::Ready(CalculationResult {
        max_loss,
        risk_per_share,
        max_shares,
        trade_value,
        initial_margin_cost,
        can_afford,
        affordability_message,
        target_price: target,
        potential_profit: risk_reward.as_ref().map(|rr| rr.potential_profit * max_shares),
        r_multiple: risk_reward.as_ref().map(|rr| rr.r_multiple),
        is_good_bet: risk_reward.as_ref().map(|rr| rr.is_good_bet),
        r_multiple_message: risk_reward.map(|rr| rr.message),
    })
}

pub fn calculate_reverse(inputs: &ReverseInputs) -> CalcOutcome {
    let (Some(cash), Some(usage_pct), Some(entry)) = (
        parse_amount(&inputs.available_cash),
        parse_amount(&inputs.cash_usage_percentage),
        parse_amount(&inputs.entry_price),
    ) else {
        return CalcOutcome::Incomplete;
    };
    let stop_loss = parse_amount(&inputs.stop_loss_price);
    let account = parse_amount(&inputs.account_size);

    let usable_cash = cash * (usage_pct / 100.0);
    let max_trade_value = usable_cash / margin_requirement(inputs.trade_direction);
    let max_shares = if entry > 0.0 {
        max_trade_value / entry
    } else {
        0.0
    };

    let risk_per_share = stop_loss.map(|stop| (stop - entry).abs()).unwrap_or(0.0);
    let max_loss = if risk_per_share > 0.0 {
        max_shares * risk_per_share
    } else {
        0.0
    };

    let (can_afford, affordability_message) = match (account, stop_loss) {
        (Some(account), Some(_)) => {
            let risk_pct = if account > 0.0 {
                max_loss / account * 100.0
            } else {
                0.0
            };
            let acceptable = risk_pct <= MAX_RECOMMENDED_RISK_PERCENTAGE;
            let message = if acceptable {
                format!(
                    "✅ Risk is acceptable: {:.2}% of account (max {}%)",
                    risk_pct, MAX_RECOMMENDED_RISK_PERCENTAGE
                )
            } else {
                format!(
                    "⚠️ Risk is high: {:.2}% of account (max {}% recommended)",
                    risk_pct, MAX_RECOMMENDED_RISK_PERCENTAGE
                )
            };
            (acceptable, message)
        }
        (None, Some(_)) => (
            true,
            "⚠️ Enter account size to check risk percentage".to_string(),
        ),
        (_, None) => (true, "ℹ️ Enter stop loss price to calculate risk".to_string()),
    };

    CalcOutcome::Ready(CalculationResult {
        max_loss,
        risk_per_share,
        max_shares,
        trade_value: max_trade_value,
        initial_margin_cost: usable_cash,
        can_afford,
        affordability_message,
        target_price: None,
        potential_profit: None,
        r_multiple: None,
        r_multiple_message: None,
        is_good_bet: None,
    })
}
