//! Strategies frozen at user acceptance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::option::{OptionStrategy, StockStrategy};

/// An accepted option/stock pair. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStrategy {
    pub id: Uuid,
    pub username: String,
    pub symbol: String,
    pub option_strategy: OptionStrategy,
    pub stock_strategy: StockStrategy,
    pub entry_price: Decimal,
    pub accepted_at: DateTime<Utc>,
}

impl SavedStrategy {
    /// Freezes a strategy pair under a freshly generated identity.
    #[must_use]
    pub fn accept(
        username: impl Into<String>,
        option_strategy: OptionStrategy,
        stock_strategy: StockStrategy,
        accepted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            symbol: option_strategy.symbol.clone(),
            entry_price: stock_strategy.entry_price,
            option_strategy,
            stock_strategy,
            accepted_at,
        }
    }
}
