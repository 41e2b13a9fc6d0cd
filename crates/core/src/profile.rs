//! User profile as read from the profile store.

use serde::{Deserialize, Serialize};

use crate::option::TradeStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStyle {
    Aggressive,
    Momentum,
    Growth,
    Balanced,
    Conservative,
    Value,
    Income,
}

impl InvestmentStyle {
    /// Strike placement preference implied by this investment style.
    #[must_use]
    pub const fn trade_style(self) -> TradeStyle {
        match self {
            Self::Aggressive | Self::Momentum | Self::Growth => TradeStyle::Aggressive,
            Self::Balanced => TradeStyle::Balanced,
            Self::Conservative | Self::Value | Self::Income => TradeStyle::Conservative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionExperience {
    None,
    Basic,
    Intermediate,
    Experienced,
}

impl OptionExperience {
    #[must_use]
    pub const fn is_novice(self) -> bool {
        matches!(self, Self::None | Self::Basic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    Short,
    Medium,
    Long,
}

/// Read-only investor profile. Every field may be missing at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub risk_tolerance: Option<RiskTolerance>,
    #[serde(default)]
    pub investment_style: Option<InvestmentStyle>,
    #[serde(default)]
    pub option_experience: Option<OptionExperience>,
    #[serde(default)]
    pub time_horizon: Option<TimeHorizon>,
    /// Self-reported confidence in [0, 1]
    #[serde(default)]
    pub confidence_level: Option<f64>,
}
