//! Market data consumed from the provider collaborator.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::option::OptionRight;

/// Underlying quote snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub change_pct: Decimal,
    pub as_of: DateTime<Utc>,
}

/// A single listed option with pre-computed greeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub right: OptionRight,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub bid: Decimal,
    pub ask: Decimal,
    #[serde(default)]
    pub delta: Option<Decimal>,
}

impl OptionQuote {
    /// Mid price, per share.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    fn validate(&self) -> Result<()> {
        let id = format!("{}{} {}", self.strike, self.right, self.expiry);
        if self.strike <= Decimal::ZERO {
            return Err(AdvisorError::validation(format!("{id}: strike must be positive")));
        }
        if self.bid < Decimal::ZERO || self.ask < Decimal::ZERO {
            return Err(AdvisorError::validation(format!("{id}: negative bid/ask")));
        }
        if self.ask < self.bid {
            return Err(AdvisorError::validation(format!("{id}: ask below bid")));
        }
        if let Some(delta) = self.delta {
            let in_range = match self.right {
                OptionRight::Call => (Decimal::ZERO..=Decimal::ONE).contains(&delta),
                OptionRight::Put => (Decimal::NEGATIVE_ONE..=Decimal::ZERO).contains(&delta),
            };
            if !in_range {
                return Err(AdvisorError::validation(format!(
                    "{id}: delta {delta} out of range for {:?}",
                    self.right
                )));
            }
        }
        Ok(())
    }
}

/// Options chain for a single underlying, validated as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOptionChain")]
pub struct OptionChain {
    underlying: String,
    underlying_price: Decimal,
    as_of: NaiveDate,
    quotes: Vec<OptionQuote>,
}

#[derive(Deserialize)]
struct RawOptionChain {
    underlying: String,
    underlying_price: Decimal,
    as_of: NaiveDate,
    quotes: Vec<OptionQuote>,
}

impl TryFrom<RawOptionChain> for OptionChain {
    type Error = AdvisorError;

    fn try_from(raw: RawOptionChain) -> Result<Self> {
        Self::new(raw.underlying, raw.underlying_price, raw.as_of, raw.quotes)
    }
}

impl OptionChain {
    /// Builds a chain, rejecting it entirely if any quote is malformed.
    ///
    /// # Errors
    /// Returns `Validation` for a non-positive underlying price or a bad quote.
    pub fn new(
        underlying: impl Into<String>,
        underlying_price: Decimal,
        as_of: NaiveDate,
        quotes: Vec<OptionQuote>,
    ) -> Result<Self> {
        let underlying = underlying.into().to_uppercase();
        if underlying_price <= Decimal::ZERO {
            return Err(AdvisorError::validation(format!(
                "{underlying}: underlying price must be positive"
            )));
        }
        for quote in &quotes {
            quote.validate()?;
        }
        Ok(Self {
            underlying,
            underlying_price,
            as_of,
            quotes,
        })
    }

    #[must_use]
    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    #[must_use]
    pub const fn underlying_price(&self) -> Decimal {
        self.underlying_price
    }

    #[must_use]
    pub const fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    #[must_use]
    pub fn quotes(&self) -> &[OptionQuote] {
        &self.quotes
    }

    /// Listed expiries for a right, ascending.
    #[must_use]
    pub fn expiries(&self, right: OptionRight) -> Vec<NaiveDate> {
        self.quotes
            .iter()
            .filter(|q| q.right == right)
            .map(|q| q.expiry)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Quotes for a right and expiry, ordered by strike.
    #[must_use]
    pub fn strikes_at(&self, right: OptionRight, expiry: NaiveDate) -> Vec<&OptionQuote> {
        let mut quotes: Vec<&OptionQuote> = self
            .quotes
            .iter()
            .filter(|q| q.right == right && q.expiry == expiry)
            .collect();
        quotes.sort_by(|a, b| a.strike.cmp(&b.strike));
        quotes
    }

    /// Exact quote lookup.
    #[must_use]
    pub fn find(&self, right: OptionRight, strike: Decimal, expiry: NaiveDate) -> Option<&OptionQuote> {
        self.quotes
            .iter()
            .find(|q| q.right == right && q.strike == strike && q.expiry == expiry)
    }

    /// Smallest positive spacing between listed strikes at an expiry.
    #[must_use]
    pub fn strike_step(&self, right: OptionRight, expiry: NaiveDate) -> Option<Decimal> {
        let strikes = self.strikes_at(right, expiry);
        strikes
            .windows(2)
            .map(|w| w[1].strike - w[0].strike)
            .filter(|d| *d > Decimal::ZERO)
            .min()
    }
}

/// Point-in-time view of an underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    /// `None` when the provider could not supply a live price.
    pub price: Option<Decimal>,
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub closes: Vec<Decimal>,
    #[serde(default)]
    pub technical: BTreeMap<String, f64>,
    #[serde(default)]
    pub fundamental: BTreeMap<String, f64>,
    #[serde(default)]
    pub macro_indicators: BTreeMap<String, f64>,
    /// Live option quotes, when the provider has them.
    #[serde(default)]
    pub option_quotes: Vec<OptionQuote>,
}

impl MarketSnapshot {
    /// Snapshot carrying only a quote.
    #[must_use]
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            price: Some(quote.price),
            as_of: quote.as_of,
            closes: Vec::new(),
            technical: BTreeMap::new(),
            fundamental: BTreeMap::new(),
            macro_indicators: BTreeMap::new(),
            option_quotes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_closes(mut self, closes: Vec<Decimal>) -> Self {
        self.closes = closes;
        self
    }

    #[must_use]
    pub fn with_option_quotes(mut self, quotes: Vec<OptionQuote>) -> Self {
        self.option_quotes = quotes;
        self
    }

    /// Live quote matching a leg's contract, if present.
    #[must_use]
    pub fn option_quote(
        &self,
        right: OptionRight,
        strike: Decimal,
        expiry: NaiveDate,
    ) -> Option<&OptionQuote> {
        self.option_quotes
            .iter()
            .find(|q| q.right == right && q.strike == strike && q.expiry == expiry)
    }
}
