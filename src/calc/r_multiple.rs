use serde::{Deserialize, Serialize};

use crate::calc::constants::MIN_R_MULTIPLE;
use crate::models::TradeDirection;

/// Risk:reward judgment for a single planned trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReward {
    pub r_multiple: f64,
    /// Reward per share; multiply by the share count for the position's profit.
    pub potential_profit: f64,
    pub is_good_bet: bool,
    pub message: String,
}

/// Reward per share toward `target`. A target on the wrong side of entry earns nothing.
pub fn reward_per_share(entry: f64, target: f64, direction: TradeDirection) -> f64 {
    match direction {
        TradeDirection::Long if target > entry => target - entry,
        TradeDirection::Short if target < entry => entry - target,
        _ => 0.0,
    }
}

/// Evaluate risk:reward for a trade plan.
///
/// Returns `None` when any price is missing (zero or non-finite), when the stop
/// sits on the entry, or when the target does not favour the position.
pub fn calculate_r_multiple(
    entry: f64,
    stop_loss: f64,
    target: f64,
    direction: TradeDirection,
) -> Option<RiskReward> {
    let filled = |v: f64| v.is_finite() && v != 0.0;
    if !filled(entry) || !filled(stop_loss) || !filled(target) {
        return None;
    }

    let risk = (stop_loss - entry).abs();
    if risk == 0.0 {
        return None;
    }

    let reward = reward_per_share(entry, target, direction);
    if reward == 0.0 {
        return None;
    }

    let r_multiple = reward / risk;
    let is_good_bet = r_multiple >= MIN_R_MULTIPLE;
    let message = if is_good_bet {
        format!("✅ Good bet! Risk:Reward ratio is 1:{:.2}", r_multiple)
    } else {
        format!(
            "❌ Bad bet. Risk:Reward ratio is 1:{:.2}. Find a better entry. Minimum recommended: 1:{}",
            r_multiple, MIN_R_MULTIPLE
        )
    };

    Some(RiskReward {
        r_multiple,
        potential_profit: reward,
        is_good_bet,
        message,
    })
}
