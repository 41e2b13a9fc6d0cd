//! Collaborator seams. Implementations live outside this workspace.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::market::{OptionChain, Quote};
use crate::profile::UserProfile;
use crate::saved::SavedStrategy;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_quote(&self, symbol: &str) -> anyhow::Result<Quote>;
    async fn get_option_chain(&self, symbol: &str) -> anyhow::Result<OptionChain>;
    async fn get_history(&self, symbol: &str, days: u32) -> anyhow::Result<Vec<Decimal>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, username: &str) -> anyhow::Result<Option<UserProfile>>;
}

#[async_trait]
pub trait StrategyStore: Send + Sync {
    async fn save(&self, strategy: &SavedStrategy) -> anyhow::Result<Uuid>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<SavedStrategy>>;
    async fn list(&self, username: &str) -> anyhow::Result<Vec<SavedStrategy>>;
}
