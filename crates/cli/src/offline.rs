//! File-backed market data and profiles for running the advisor offline.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use delta_one_advisor::RecommendRequest;
use delta_one_core::{MarketDataProvider, OptionChain, ProfileStore, Quote, UserProfile};

/// Market data captured to a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketFile {
    #[serde(default)]
    pub quote: Option<Quote>,
    #[serde(default)]
    pub chain: Option<OptionChain>,
    #[serde(default)]
    pub closes: Vec<Decimal>,
}

impl MarketFile {
    /// When the capture was taken: the quote time, else the start of the chain's day.
    #[must_use]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.quote.as_ref().map(|q| q.as_of).or_else(|| {
            let chain = self.chain.as_ref()?;
            let midnight = chain.as_of().and_hms_opt(0, 0, 0)?;
            Some(Utc.from_utc_datetime(&midnight))
        })
    }
}

/// Input for `delta-one recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendInput {
    pub request: RecommendRequest,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    pub market: MarketFile,
}

/// Reads and deserializes a JSON file.
///
/// # Errors
/// Returns an error if the file is unreadable or malformed.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Serves a single captured market file.
#[derive(Debug, Clone)]
pub struct StaticMarketData {
    market: MarketFile,
}

impl StaticMarketData {
    #[must_use]
    pub fn new(market: MarketFile) -> Self {
        Self { market }
    }

    fn check_symbol(&self, wanted: &str, have: &str) -> Result<()> {
        if wanted.eq_ignore_ascii_case(have) {
            Ok(())
        } else {
            Err(anyhow!("market file holds {have}, not {wanted}"))
        }
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let quote = self
            .market
            .quote
            .clone()
            .ok_or_else(|| anyhow!("market file has no quote"))?;
        self.check_symbol(symbol, &quote.symbol)?;
        Ok(quote)
    }

    async fn get_option_chain(&self, symbol: &str) -> Result<OptionChain> {
        let chain = self
            .market
            .chain
            .clone()
            .ok_or_else(|| anyhow!("market file has no option chain"))?;
        self.check_symbol(symbol, chain.underlying())?;
        Ok(chain)
    }

    async fn get_history(&self, _symbol: &str, days: u32) -> Result<Vec<Decimal>> {
        let closes = &self.market.closes;
        let keep = closes.len().min(days as usize);
        Ok(closes[closes.len() - keep..].to_vec())
    }
}

/// Profiles keyed by username.
#[derive(Debug, Clone, Default)]
pub struct StaticProfiles {
    profiles: HashMap<String, UserProfile>,
}

impl StaticProfiles {
    #[must_use]
    pub fn single(username: &str, profile: Option<UserProfile>) -> Self {
        let mut profiles = HashMap::new();
        if let Some(profile) = profile {
            profiles.insert(username.to_string(), profile);
        }
        Self { profiles }
    }
}

#[async_trait]
impl ProfileStore for StaticProfiles {
    async fn get_profile(&self, username: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(username).cloned())
    }
}
