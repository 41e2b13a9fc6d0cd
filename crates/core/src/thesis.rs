//! Directional thesis types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// Direction of a market thesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Expect the underlying to rise
    Bullish,
    /// Expect the underlying to fall
    Bearish,
    /// No actionable directional bias
    Neutral,
}

impl Direction {
    /// Returns true if this direction calls for a position.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        !matches!(self, Self::Neutral)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Direction {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Ok(Self::Bullish),
            "bearish" => Ok(Self::Bearish),
            "neutral" => Ok(Self::Neutral),
            other => Err(AdvisorError::validation(format!(
                "invalid direction '{other}': expected bullish, bearish or neutral"
            ))),
        }
    }
}

/// Conviction attached to a thesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Moderate => write!(f, "moderate"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

impl FromStr for Strength {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weak" => Ok(Self::Weak),
            "moderate" => Ok(Self::Moderate),
            "strong" => Ok(Self::Strong),
            other => Err(AdvisorError::validation(format!(
                "invalid strength '{other}': expected weak, moderate or strong"
            ))),
        }
    }
}

/// Unvalidated signal as delivered by an upstream analysis step.
///
/// Score and narrative are optional here so that their absence can be
/// rejected explicitly instead of defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    pub score: Option<f64>,
    pub direction: Direction,
    pub strength: Strength,
    pub narrative: Option<String>,
    #[serde(default)]
    pub target_price: Option<Decimal>,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
}

/// A consistency-checked directional view.
///
/// Only the interpreter constructs these, so direction and strength always
/// agree with the rationale text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thesis {
    pub direction: Direction,
    pub strength: Strength,
    /// Confidence score in [0, 100]
    pub score: f64,
    pub rationale: String,
    pub target_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    /// True when the declared direction was overridden by caution language.
    pub corrected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Bullish".parse::<Direction>().unwrap(), Direction::Bullish);
        assert_eq!(" STRONG ".parse::<Strength>().unwrap(), Strength::Strong);
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = "sideways".parse::<Direction>().unwrap_err();
        assert!(matches!(err, AdvisorError::Validation(_)));
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&Direction::Bearish).unwrap();
        assert_eq!(json, "\"bearish\"");
        let bad: Result<Strength, _> = serde_json::from_str("\"huge\"");
        assert!(bad.is_err());
    }

    #[test]
    fn raw_signal_price_levels_default_to_none() {
        let json = r#"{"score":78,"direction":"bullish","strength":"strong","narrative":"Breakout"}"#;
        let signal: RawSignal = serde_json::from_str(json).unwrap();
        assert_eq!(
            signal,
            RawSignal {
                score: Some(78.0),
                direction: Direction::Bullish,
                strength: Strength::Strong,
                narrative: Some("Breakout".into()),
                target_price: None,
                stop_price: None,
            }
        );
    }
}
