//! Option structures and their Delta-One stock equivalents.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::thesis::Direction;

/// Options contract right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    /// Value of one share's worth of the option if exercised at `price`.
    #[must_use]
    pub fn intrinsic(self, strike: Decimal, price: Decimal) -> Decimal {
        match self {
            Self::Call => (price - strike).max(Decimal::ZERO),
            Self::Put => (strike - price).max(Decimal::ZERO),
        }
    }
}

impl fmt::Display for OptionRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// Whether a leg is bought or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Buy,
    Sell,
}

impl LegSide {
    /// +1 for bought legs, -1 for written legs.
    #[must_use]
    pub fn sign(self) -> Decimal {
        match self {
            Self::Buy => Decimal::ONE,
            Self::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Strike placement preference used by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStyle {
    /// Out-of-the-money strikes
    Aggressive,
    /// Near at-the-money strikes
    Balanced,
    /// Slightly in-the-money strikes
    Conservative,
}

impl fmt::Display for TradeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggressive => write!(f, "aggressive"),
            Self::Balanced => write!(f, "balanced"),
            Self::Conservative => write!(f, "conservative"),
        }
    }
}

impl FromStr for TradeStyle {
    type Err = AdvisorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aggressive" => Ok(Self::Aggressive),
            "balanced" => Ok(Self::Balanced),
            "conservative" => Ok(Self::Conservative),
            other => Err(AdvisorError::validation(format!(
                "invalid style '{other}': expected aggressive, balanced or conservative"
            ))),
        }
    }
}

/// Structure families the synthesizer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    LongCall,
    LongPut,
    BullCallSpread,
    BearPutSpread,
}

impl StrategyKind {
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::LongCall | Self::BullCallSpread => Direction::Bullish,
            Self::LongPut | Self::BearPutSpread => Direction::Bearish,
        }
    }

    #[must_use]
    pub const fn right(self) -> OptionRight {
        match self {
            Self::LongCall | Self::BullCallSpread => OptionRight::Call,
            Self::LongPut | Self::BearPutSpread => OptionRight::Put,
        }
    }

    #[must_use]
    pub const fn is_spread(self) -> bool {
        matches!(self, Self::BullCallSpread | Self::BearPutSpread)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LongCall => write!(f, "long_call"),
            Self::LongPut => write!(f, "long_put"),
            Self::BullCallSpread => write!(f, "bull_call_spread"),
            Self::BearPutSpread => write!(f, "bear_put_spread"),
        }
    }
}

/// One leg of an option structure, per share.
///
/// `premium` and `delta` are `None` once the leg has been moved away from
/// the quote it was built from and not yet repriced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionLeg {
    pub right: OptionRight,
    pub side: LegSide,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub premium: Option<Decimal>,
    pub delta: Option<Decimal>,
}

impl OptionLeg {
    /// Signed delta contribution of this leg.
    ///
    /// # Errors
    /// Returns `InconsistentState` if the leg carries no delta.
    pub fn signed_delta(&self) -> Result<Decimal> {
        self.delta
            .map(|d| self.side.sign() * d)
            .ok_or_else(|| AdvisorError::inconsistent(format!("leg {} has no delta", self.label())))
    }

    /// Signed premium (debit positive) of this leg.
    ///
    /// # Errors
    /// Returns `InconsistentState` if the leg carries no premium.
    pub fn signed_premium(&self) -> Result<Decimal> {
        self.premium
            .map(|p| self.side.sign() * p)
            .ok_or_else(|| {
                AdvisorError::inconsistent(format!("leg {} has no premium", self.label()))
            })
    }

    /// Human-readable leg description (e.g., "buy 150C 2026-12-18").
    #[must_use]
    pub fn label(&self) -> String {
        let side = match self.side {
            LegSide::Buy => "buy",
            LegSide::Sell => "sell",
        };
        format!("{side} {}{} {}", self.strike, self.right, self.expiry)
    }

    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.premium.is_some() && self.delta.is_some()
    }
}

/// Synthesis-time parameters the profile optimizer always derives from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub quantity: u32,
    pub notional_value: Decimal,
    /// Spot the strikes were placed against
    pub underlying_price: Decimal,
    /// Strike of each leg, in leg order
    pub strikes: Vec<Decimal>,
    pub days_to_expiry: i64,
    /// Smallest listed strike spacing at the chosen expiry
    pub strike_step: Option<Decimal>,
}

/// An option structure sized against a notional value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionStrategy {
    pub symbol: String,
    pub kind: StrategyKind,
    pub style: TradeStyle,
    pub legs: Vec<OptionLeg>,
    /// Number of structures (contracts per leg)
    pub quantity: u32,
    /// Shares per contract
    pub multiplier: Decimal,
    pub notional_value: Decimal,
    pub underlying_price: Decimal,
    /// Date the strategy was built for; tenor math is relative to this.
    pub as_of: NaiveDate,
    pub baseline: Baseline,
}

impl OptionStrategy {
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.kind.direction()
    }

    /// Signed sum of leg deltas (buy +, sell -) per structure unit.
    ///
    /// # Errors
    /// Returns `InconsistentState` if any leg lacks a delta.
    pub fn portfolio_delta(&self) -> Result<Decimal> {
        self.legs.iter().map(OptionLeg::signed_delta).sum()
    }

    /// Sum of absolute leg deltas; an upper bound on `|portfolio_delta|`.
    ///
    /// # Errors
    /// Returns `InconsistentState` if any leg lacks a delta.
    pub fn gross_delta(&self) -> Result<Decimal> {
        self.legs
            .iter()
            .map(|leg| leg.signed_delta().map(|d| d.abs()))
            .sum()
    }

    /// Net premium per share across legs; positive means a debit.
    ///
    /// # Errors
    /// Returns `InconsistentState` if any leg lacks a premium.
    pub fn net_premium(&self) -> Result<Decimal> {
        self.legs.iter().map(OptionLeg::signed_premium).sum()
    }

    /// Total cash paid (or received, if negative) to open the position.
    ///
    /// # Errors
    /// Returns `InconsistentState` if any leg lacks a premium.
    pub fn total_premium(&self) -> Result<Decimal> {
        Ok(self.net_premium()? * self.multiplier * Decimal::from(self.quantity))
    }

    /// Days from `as_of` to the nearest leg expiry.
    #[must_use]
    pub fn days_to_expiry(&self) -> i64 {
        self.legs
            .iter()
            .map(|leg| (leg.expiry - self.as_of).num_days())
            .min()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_fully_quoted(&self) -> bool {
        self.legs.iter().all(OptionLeg::is_quoted)
    }
}

/// Side of the Delta-One stock position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgeSide {
    Long,
    Short,
    /// Zero portfolio delta; no stock position
    None,
}

impl HedgeSide {
    #[must_use]
    pub fn from_delta(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            Self::Long
        } else if delta < Decimal::ZERO {
            Self::Short
        } else {
            Self::None
        }
    }

    /// +1 long, -1 short, 0 none.
    #[must_use]
    pub fn sign(self) -> Decimal {
        match self {
            Self::Long => Decimal::ONE,
            Self::Short => Decimal::NEGATIVE_ONE,
            Self::None => Decimal::ZERO,
        }
    }
}

impl fmt::Display for HedgeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Stock position with the same initial Delta exposure as an option structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStrategy {
    pub symbol: String,
    pub side: HedgeSide,
    /// `notional_value × |portfolio_delta|`
    pub stock_notional: Decimal,
    pub margin: Decimal,
    pub shares: u64,
    pub entry_price: Decimal,
    pub portfolio_delta: Decimal,
    pub notional_value: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(right: OptionRight, side: LegSide, strike: Decimal, delta: Decimal) -> OptionLeg {
        OptionLeg {
            right,
            side,
            strike,
            expiry: NaiveDate::from_ymd_opt(2026, 12, 18).unwrap(),
            premium: Some(dec!(2)),
            delta: Some(delta),
        }
    }

    #[test]
    fn intrinsic_values() {
        assert_eq!(OptionRight::Call.intrinsic(dec!(100), dec!(110)), dec!(10));
        assert_eq!(OptionRight::Call.intrinsic(dec!(100), dec!(90)), dec!(0));
        assert_eq!(OptionRight::Put.intrinsic(dec!(100), dec!(90)), dec!(10));
    }

    #[test]
    fn sell_legs_subtract_delta() {
        let buy = leg(OptionRight::Call, LegSide::Buy, dec!(100), dec!(0.5));
        let sell = leg(OptionRight::Call, LegSide::Sell, dec!(110), dec!(0.2));
        assert_eq!(buy.signed_delta().unwrap() + sell.signed_delta().unwrap(), dec!(0.3));
    }

    #[test]
    fn missing_delta_is_inconsistent() {
        let mut l = leg(OptionRight::Put, LegSide::Buy, dec!(100), dec!(-0.4));
        l.delta = None;
        assert!(matches!(l.signed_delta(), Err(AdvisorError::InconsistentState(_))));
    }

    #[test]
    fn hedge_side_follows_sign() {
        assert_eq!(HedgeSide::from_delta(dec!(0.3)), HedgeSide::Long);
        assert_eq!(HedgeSide::from_delta(dec!(-0.3)), HedgeSide::Short);
        assert_eq!(HedgeSide::from_delta(Decimal::ZERO), HedgeSide::None);
    }
}
