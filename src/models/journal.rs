use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calc::CalculationResult;
use crate::error::{AppError, AppResult};
use crate::models::{SetupType, TradeDirection, TradeStatus};

static TICKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]+$").unwrap());

/// Uppercase a ticker and check it is plain alphanumeric.
pub fn normalize_ticker(raw: &str) -> AppResult<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker cannot be empty".to_string()));
    }
    if !TICKER_RE.is_match(&ticker) {
        return Err(AppError::Validation(format!(
            "Invalid ticker '{}': only letters and digits are allowed",
            raw.trim()
        )));
    }
    Ok(ticker)
}

/// A saved trade plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub ticker: String,
    pub setup_type: SetupType,
    pub entry_price: f64,
    pub stop_loss_price: Option<f64>,
    pub position_size: f64,
    pub risk_amount: Option<f64>,
    pub direction: TradeDirection,
    pub status: TradeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_multiple: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_id: Option<String>,
}

/// User-supplied trade details completing a calculation before it is journaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDetails {
    pub ticker: String,
    pub setup_type: SetupType,
}

/// Creation payload. Required fields are optional here so that a payload missing
/// several of them can be reported in one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateJournalInput {
    pub ticker: Option<String>,
    pub setup_type: Option<SetupType>,
    pub entry_price: Option<f64>,
    pub stop_loss_price: Option<f64>,
    pub position_size: Option<f64>,
    pub risk_amount: Option<f64>,
    pub direction: Option<TradeDirection>,
    pub status: Option<TradeStatus>,
    pub trade_value: Option<f64>,
    pub r_multiple: Option<f64>,
    pub target_price: Option<f64>,
    pub potential_profit: Option<f64>,
    pub calculation_id: Option<String>,
}

/// Validated creation payload, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournalEntry {
    pub ticker: String,
    pub setup_type: SetupType,
    pub entry_price: f64,
    pub stop_loss_price: Option<f64>,
    pub position_size: f64,
    pub risk_amount: Option<f64>,
    pub direction: TradeDirection,
    pub status: TradeStatus,
    pub trade_value: Option<f64>,
    pub r_multiple: Option<f64>,
    pub target_price: Option<f64>,
    pub potential_profit: Option<f64>,
    pub calculation_id: Option<String>,
}

fn filled(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

impl CreateJournalInput {
    /// Flatten a finished calculation into a journal entry payload.
    pub fn from_calculation(
        result: &CalculationResult,
        details: TradeDetails,
        entry_price: f64,
        stop_loss_price: Option<f64>,
        direction: TradeDirection,
    ) -> Self {
        Self {
            ticker: Some(details.ticker),
            setup_type: Some(details.setup_type),
            entry_price: Some(entry_price),
            stop_loss_price: filled(stop_loss_price),
            position_size: Some(result.max_shares),
            risk_amount: filled(Some(result.max_loss)),
            direction: Some(direction),
            status: Some(TradeStatus::Order),
            trade_value: Some(result.trade_value),
            r_multiple: result.r_multiple,
            target_price: result.target_price,
            potential_profit: result.potential_profit,
            calculation_id: None,
        }
    }

    pub fn validate(self) -> AppResult<NewJournalEntry> {
        let ticker = self.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let entry_price = filled(self.entry_price);
        let position_size = filled(self.position_size);

        let mut missing = Vec::new();
        if ticker.is_none() {
            missing.push("ticker");
        }
        if self.setup_type.is_none() {
            missing.push("setupType");
        }
        if entry_price.is_none() {
            missing.push("entryPrice");
        }
        if position_size.is_none() {
            missing.push("positionSize");
        }
        if self.direction.is_none() {
            missing.push("direction");
        }

        let (Some(ticker), Some(setup_type), Some(entry_price), Some(position_size), Some(direction)) =
            (ticker, self.setup_type, entry_price, position_size, self.direction)
        else {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        Ok(NewJournalEntry {
            ticker: normalize_ticker(ticker)?,
            setup_type,
            entry_price,
            stop_loss_price: filled(self.stop_loss_price),
            position_size,
            risk_amount: filled(self.risk_amount),
            direction,
            status: self.status.unwrap_or_default(),
            trade_value: filled(self.trade_value),
            r_multiple: filled(self.r_multiple),
            target_price: filled(self.target_price),
            potential_profit: filled(self.potential_profit),
            calculation_id: self.calculation_id.filter(|id| !id.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalFilters {
    pub status: Option<TradeStatus>,
    /// Substring match on the ticker.
    pub ticker: Option<String>,
}

/// A partial edit of a journal entry.
///
/// `stop_loss_price` and `target_price` are tri-state: `None` leaves the stored
/// value alone, `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalUpdate {
    pub status: Option<TradeStatus>,
    pub ticker: Option<String>,
    pub setup_type: Option<SetupType>,
    pub entry_price: Option<f64>,
    pub stop_loss_price: Option<Option<f64>>,
    pub target_price: Option<Option<f64>>,
    pub direction: Option<TradeDirection>,
}

impl JournalUpdate {
    /// Fields fixed at creation or derived by the server; edits naming them are refused.
    pub const PROTECTED_FIELDS: [&'static str; 5] = [
        "positionSize",
        "riskAmount",
        "tradeValue",
        "rMultiple",
        "potentialProfit",
    ];

    const EDITABLE_FIELDS: [&'static str; 7] = [
        "status",
        "ticker",
        "setupType",
        "entryPrice",
        "stopLossPrice",
        "targetPrice",
        "direction",
    ];

    /// Parse a JSON edit payload.
    pub fn from_json(patch: &Value) -> AppResult<Self> {
        let fields = patch
            .as_object()
            .ok_or_else(|| AppError::Validation("Update payload must be a JSON object".to_string()))?;

        for key in fields.keys() {
            if Self::PROTECTED_FIELDS.contains(&key.as_str()) {
                return Err(AppError::Validation(format!(
                    "Field '{}' is derived from the original calculation and cannot be edited",
                    key
                )));
            }
            if !Self::EDITABLE_FIELDS.contains(&key.as_str()) {
                return Err(AppError::Validation(format!("Unknown field '{}'", key)));
            }
        }

        let mut update = JournalUpdate::default();

        if let Some(value) = fields.get("status") {
            update.status = Some(parse_enum(value, "status")?);
        }
        if let Some(value) = fields.get("ticker") {
            let raw = value
                .as_str()
                .ok_or_else(|| AppError::Validation("ticker must be a string".to_string()))?;
            update.ticker = Some(normalize_ticker(raw)?);
        }
        if let Some(value) = fields.get("setupType") {
            update.setup_type = Some(parse_enum(value, "setupType")?);
        }
        if let Some(value) = fields.get("entryPrice") {
            let price = price_value(value, "entryPrice")?.ok_or_else(|| {
                AppError::Validation("entryPrice cannot be cleared".to_string())
            })?;
            update.entry_price = Some(price);
        }
        if let Some(value) = fields.get("stopLossPrice") {
            update.stop_loss_price = Some(price_value(value, "stopLossPrice")?);
        }
        if let Some(value) = fields.get("targetPrice") {
            update.target_price = Some(price_value(value, "targetPrice")?);
        }
        if let Some(value) = fields.get("direction") {
            update.direction = Some(parse_enum(value, "direction")?);
        }

        Ok(update)
    }

    /// True when a field feeding the risk:reward figures is part of the edit.
    pub fn touches_prices(&self) -> bool {
        self.entry_price.is_some()
            || self.stop_loss_price.is_some()
            || self.target_price.is_some()
            || self.direction.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == JournalUpdate::default()
    }
}

fn parse_enum<T>(value: &Value, field: &str) -> AppResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .as_str()
        .ok_or_else(|| AppError::Validation(format!("{} must be a string", field)))?
        .parse()
        .map_err(AppError::Validation)
}

/// Read a price from an edit payload. `null`, `""` and `0` clear the value.
fn price_value(value: &Value, field: &str) -> AppResult<Option<f64>> {
    let price = match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().parse::<f64>().map_err(|_| {
            AppError::Validation(format!("{} must be a number, got '{}'", field, s))
        })?),
        _ => {
            return Err(AppError::Validation(format!("{} must be a number", field)));
        }
    };
    match price {
        Some(p) if !p.is_finite() => Err(AppError::Validation(format!("{} must be finite", field))),
        Some(p) if p == 0.0 => Ok(None),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_input() -> CreateJournalInput {
        CreateJournalInput {
            ticker: Some(" aapl ".to_string()),
            setup_type: Some(SetupType::Breakout),
            entry_price: Some(85.0),
            stop_loss_price: Some(80.0),
            position_size: Some(100.0),
            risk_amount: Some(500.0),
            direction: Some(TradeDirection::Long),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker("msft").unwrap(), "MSFT");
        assert_eq!(normalize_ticker(" brk1 ").unwrap(), "BRK1");
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("BRK.B").is_err());
    }

    #[test]
    fn test_validate_defaults_and_normalizes() {
        let entry = complete_input().validate().unwrap();
        assert_eq!(entry.ticker, "AAPL");
        assert_eq!(entry.status, TradeStatus::Order);
        assert_eq!(entry.stop_loss_price, Some(80.0));
        assert!(entry.target_price.is_none());
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let err = CreateJournalInput {
            ticker: Some("AAPL".into()),
            entry_price: Some(0.0),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: setupType, entryPrice, positionSize, direction"
        );
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_validate_stores_zero_optionals_as_null() {
        let mut input = complete_input();
        input.risk_amount = Some(0.0);
        input.stop_loss_price = Some(0.0);
        let entry = input.validate().unwrap();
        assert!(entry.risk_amount.is_none());
        assert!(entry.stop_loss_price.is_none());
    }

    #[test]
    fn test_from_calculation_flattens_result() {
        let result = CalculationResult {
            max_loss: 500.0,
            risk_per_share: 5.0,
            max_shares: 100.0,
            trade_value: 8500.0,
            initial_margin_cost: 4250.0,
            can_afford: false,
            affordability_message: String::new(),
            target_price: Some(95.0),
            potential_profit: Some(1000.0),
            r_multiple: Some(2.0),
            r_multiple_message: None,
            is_good_bet: Some(true),
        };
        let details = TradeDetails {
            ticker: "nvda".to_string(),
            setup_type: SetupType::Pullback,
        };
        let input = CreateJournalInput::from_calculation(
            &result,
            details,
            85.0,
            Some(80.0),
            TradeDirection::Long,
        );
        assert_eq!(input.position_size, Some(100.0));
        assert_eq!(input.risk_amount, Some(500.0));
        assert_eq!(input.trade_value, Some(8500.0));
        assert_eq!(input.r_multiple, Some(2.0));

        let entry = input.validate().unwrap();
        assert_eq!(entry.ticker, "NVDA");
        assert_eq!(entry.potential_profit, Some(1000.0));
    }

    #[test]
    fn test_update_rejects_protected_fields() {
        for field in JournalUpdate::PROTECTED_FIELDS {
            let err = JournalUpdate::from_json(&json!({ field: 1.0 })).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{} should be refused", field);
        }
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        assert!(JournalUpdate::from_json(&json!({ "notes": "hi" })).is_err());
        assert!(JournalUpdate::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_update_tri_state_prices() {
        let update = JournalUpdate::from_json(&json!({
            "stopLossPrice": null,
            "targetPrice": "110.5",
            "status": "open"
        }))
        .unwrap();
        assert_eq!(update.stop_loss_price, Some(None));
        assert_eq!(update.target_price, Some(Some(110.5)));
        assert_eq!(update.status, Some(TradeStatus::Open));
        assert!(update.entry_price.is_none());
        assert!(update.touches_prices());

        let cleared = JournalUpdate::from_json(&json!({ "targetPrice": "" })).unwrap();
        assert_eq!(cleared.target_price, Some(None));
    }

    #[test]
    fn test_update_status_only_does_not_touch_prices() {
        let update = JournalUpdate::from_json(&json!({ "status": "closed" })).unwrap();
        assert!(!update.touches_prices());
        assert!(!update.is_empty());
        assert!(JournalUpdate::from_json(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_update_entry_price_cannot_be_cleared() {
        assert!(JournalUpdate::from_json(&json!({ "entryPrice": null })).is_err());
        assert!(JournalUpdate::from_json(&json!({ "entryPrice": "abc" })).is_err());
        assert!(JournalUpdate::from_json(&json!({ "direction": "up" })).is_err());
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = JournalEntry {
            id: "id-1".into(),
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            ticker: "AAPL".into(),
            setup_type: SetupType::GapFill,
            entry_price: 85.0,
            stop_loss_price: None,
            position_size: 10.0,
            risk_amount: None,
            direction: TradeDirection::Short,
            status: TradeStatus::Open,
            trade_value: None,
            r_multiple: None,
            target_price: None,
            potential_profit: None,
            calculation_id: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["setupType"], "Gap Fill");
        assert_eq!(json["stopLossPrice"], Value::Null);
        assert!(json.get("rMultiple").is_none());
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
    }
}
