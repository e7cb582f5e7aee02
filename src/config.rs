//! Configuration for position-journal

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::calc::constants::{DEFAULT_CASH_USAGE_PERCENTAGE, DEFAULT_RISK_PERCENTAGE};

/// Root configuration structure. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the journal, calculations, settings and watchlist
    pub database_path: PathBuf,
    /// env_logger filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Symbol for printing money until a database is opened; the stored settings currency wins after that
    pub currency_symbol: String,
    /// Pre-filled risk percentage for forward calculations
    pub default_risk_percentage: f64,
    /// Pre-filled cash usage percentage for reverse calculations
    pub default_cash_usage_percentage: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("position_journal.db"),
            log_level: "info".to_string(),
            currency_symbol: "€".to_string(),
            default_risk_percentage: DEFAULT_RISK_PERCENTAGE,
            default_cash_usage_percentage: DEFAULT_CASH_USAGE_PERCENTAGE,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.default_risk_percentage > 0.0 && self.default_risk_percentage <= 100.0) {
            anyhow::bail!(
                "default_risk_percentage must be within (0, 100], got {}",
                self.default_risk_percentage
            );
        }
        if !(self.default_cash_usage_percentage > 0.0 && self.default_cash_usage_percentage <= 100.0) {
            anyhow::bail!(
                "default_cash_usage_percentage must be within (0, 100], got {}",
                self.default_cash_usage_percentage
            );
        }
        if self.currency_symbol.trim().is_empty() {
            anyhow::bail!("currency_symbol cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            database_path = "/tmp/journal.db"
            log_level = "debug"
            currency_symbol = "$"
            default_risk_percentage = 2.0
            default_cash_usage_percentage = 25.0
        "#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/journal.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.default_risk_percentage, 2.0);
        assert_eq!(config.default_cash_usage_percentage, 25.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str(r#"currency_symbol = "£""#).unwrap();
        assert_eq!(config.currency_symbol, "£");
        assert_eq!(config.default_risk_percentage, 5.0);
        assert_eq!(config.default_cash_usage_percentage, 50.0);
        assert_eq!(config.database_path, PathBuf::from("position_journal.db"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(AppConfig::load(dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_load_rejects_out_of_range_percentages() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_risk_percentage = 150.0").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }
}
