//! Fixed trading constants. Values are part of the saved-data contract and must
//! not drift between releases.

/// Fraction of notional required as collateral for a long position.
pub const LONG_MARGIN_REQUIREMENT: f64 = 0.5;
/// Short positions must be fully collateralised.
pub const SHORT_MARGIN_REQUIREMENT: f64 = 1.0;

pub const DEFAULT_RISK_PERCENTAGE: f64 = 5.0;
pub const DEFAULT_CASH_USAGE_PERCENTAGE: f64 = 50.0;

/// Largest single-trade risk, as a percent of the account, that still counts as acceptable.
pub const MAX_RECOMMENDED_RISK_PERCENTAGE: f64 = 5.0;

/// Minimum acceptable risk:reward (1:2).
pub const MIN_R_MULTIPLE: f64 = 2.0;

/// Above this total heat new trades are disabled.
pub const MAX_ACCOUNT_HEAT_PERCENTAGE: f64 = 6.0;
pub const CAUTION_ACCOUNT_HEAT_PERCENTAGE: f64 = 4.0;
