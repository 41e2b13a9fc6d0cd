//! Typed failures surfaced to callers of the advisor.
//!
//! None of these are ever converted into a default, success-shaped value.

use thiserror::Error;

/// Failure taxonomy shared by every advisor component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    /// Malformed or missing thesis, profile or strategy input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The supplied option chain lacks a required strike or expiry.
    #[error("option data unavailable: {0}")]
    DataUnavailable(String),

    /// A live quote could not be obtained.
    #[error("market data unavailable: {0}")]
    MarketDataUnavailable(String),

    /// Leg Greeks or premiums are missing where sizing or valuation needs them.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

impl AdvisorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    pub fn market_data_unavailable(msg: impl Into<String>) -> Self {
        Self::MarketDataUnavailable(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InconsistentState(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
