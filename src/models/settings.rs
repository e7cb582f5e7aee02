use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::journal::normalize_ticker;
use crate::models::SetupType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub checklist_gatekeeper_enabled: bool,
    pub drawdown_simulator_enabled: bool,
    /// Manually entered balance used for account heat.
    pub account_balance: Option<f64>,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            checklist_gatekeeper_enabled: true,
            drawdown_simulator_enabled: false,
            account_balance: None,
            currency: "€".to_string(),
            updated_at: DateTime::default(),
        }
    }
}

/// Partial settings update; absent fields keep their value. An account balance
/// of zero or less clears the stored balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSettingsInput {
    pub checklist_gatekeeper_enabled: Option<bool>,
    pub drawdown_simulator_enabled: Option<bool>,
    pub account_balance: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    pub ticker: String,
    pub setup_type: SetupType,
    pub trigger_price: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatchlistItemInput {
    pub ticker: String,
    pub setup_type: SetupType,
    pub trigger_price: f64,
    #[serde(default)]
    pub notes: String,
}

impl AddWatchlistItemInput {
    pub fn validate(self) -> AppResult<Self> {
        if !self.trigger_price.is_finite() || self.trigger_price <= 0.0 {
            return Err(AppError::Validation(
                "Trigger price must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            ticker: normalize_ticker(&self.ticker)?,
            notes: self.notes.trim().to_string(),
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = UserSettings::default();
        assert!(settings.checklist_gatekeeper_enabled);
        assert!(!settings.drawdown_simulator_enabled);
        assert!(settings.account_balance.is_none());
    }

    #[test]
    fn test_watchlist_validation() {
        let item = AddWatchlistItemInput {
            ticker: "tsla".into(),
            setup_type: SetupType::Breakout,
            trigger_price: 250.0,
            notes: "  above range high ".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(item.ticker, "TSLA");
        assert_eq!(item.notes, "above range high");

        let err = AddWatchlistItemInput {
            ticker: "tsla".into(),
            setup_type: SetupType::Breakout,
            trigger_price: 0.0,
            notes: String::new(),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
