use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Stores a string-backed enum as TEXT, using its `as_str` / `FromStr` pair.
macro_rules! sql_text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                text.parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    #[default]
    Long,
    Short,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Long => "long",
            TradeDirection::Short => "short",
        }
    }
}

impl FromStr for TradeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(TradeDirection::Long),
            "short" => Ok(TradeDirection::Short),
            other => Err(format!("Invalid direction '{}': expected long or short", other)),
        }
    }
}

sql_text_enum!(TradeDirection);

/// Order lifecycle. Any status may be set at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    #[default]
    Order,
    Open,
    Closed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Order => "order",
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
        }
    }

    /// Next status in the order → open → closed cycle used by the journal toggle.
    pub fn next(&self) -> TradeStatus {
        match self {
            TradeStatus::Order => TradeStatus::Open,
            TradeStatus::Open => TradeStatus::Closed,
            TradeStatus::Closed => TradeStatus::Order,
        }
    }
}

impl FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "order" => Ok(TradeStatus::Order),
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            other => Err(format!("Invalid status '{}': expected order, open or closed", other)),
        }
    }
}

sql_text_enum!(TradeStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupType {
    Breakout,
    Pullback,
    Reversal,
    #[serde(rename = "Gap Fill")]
    GapFill,
    #[serde(rename = "Trend Following")]
    TrendFollowing,
    Other,
}

impl SetupType {
    pub const ALL: [SetupType; 6] = [
        SetupType::Breakout,
        SetupType::Pullback,
        SetupType::Reversal,
        SetupType::GapFill,
        SetupType::TrendFollowing,
        SetupType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SetupType::Breakout => "Breakout",
            SetupType::Pullback => "Pullback",
            SetupType::Reversal => "Reversal",
            SetupType::GapFill => "Gap Fill",
            SetupType::TrendFollowing => "Trend Following",
            SetupType::Other => "Other",
        }
    }
}

impl FromStr for SetupType {
    type Err = String;

    // Accepts the display names as well as kebab/snake spellings typed on a command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        SetupType::ALL
            .into_iter()
            .find(|setup| setup.as_str().replace(' ', "").to_ascii_lowercase() == key)
            .ok_or_else(|| format!("Invalid setup type '{}'", s.trim()))
    }
}

sql_text_enum!(SetupType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    #[default]
    Forward,
    Reverse,
}

impl CalculationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMode::Forward => "forward",
            CalculationMode::Reverse => "reverse",
        }
    }
}

impl FromStr for CalculationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(CalculationMode::Forward),
            "reverse" => Ok(CalculationMode::Reverse),
            other => Err(format!("Invalid mode '{}': expected forward or reverse", other)),
        }
    }
}

sql_text_enum!(CalculationMode);
