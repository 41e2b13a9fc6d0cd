//! Performance evaluation of accepted strategies against a live snapshot.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use delta_one_core::{
    AdvisorError, EvaluationConfig, MarketSnapshot, OptionLeg, Result, SavedStrategy,
};

/// Return classification band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    Underperforming,
    Tracking,
    Outperforming,
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underperforming => write!(f, "underperforming"),
            Self::Tracking => write!(f, "tracking"),
            Self::Outperforming => write!(f, "outperforming"),
        }
    }
}

/// Classifies a percentage return against the configured bands.
#[must_use]
pub fn classify(return_pct: Decimal, config: &EvaluationConfig) -> Performance {
    if return_pct >= config.outperform_threshold_pct {
        Performance::Outperforming
    } else if return_pct <= config.underperform_threshold_pct {
        Performance::Underperforming
    } else {
        Performance::Tracking
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationSource {
    LiveQuote,
    /// Expired; worth its exercise value
    Intrinsic,
    /// Entry premium moved by entry delta
    DeltaApprox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegValuation {
    pub leg: String,
    pub entry_premium: Decimal,
    pub current_value: Decimal,
    pub source: ValuationSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub strategy_id: Uuid,
    pub symbol: String,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    /// Whole-position cost at acceptance; negative for a credit
    pub option_entry_cost: Decimal,
    pub option_current_value: Decimal,
    pub option_return_pct: Decimal,
    pub stock_return_pct: Decimal,
    pub outperformance: Decimal,
    pub option_performance: Performance,
    pub stock_performance: Performance,
    pub relative_performance: Performance,
    pub legs: Vec<LegValuation>,
    pub evaluated_at: DateTime<Utc>,
}

/// Compares `saved` entry economics with `snapshot`.
///
/// # Errors
/// - `MarketDataUnavailable` if the snapshot has no usable price, is for
///   another symbol, or predates acceptance
/// - `InconsistentState` if a leg lacks the premium or delta needed to value it,
///   or the entry cost nets to zero
pub fn evaluate(
    saved: &SavedStrategy,
    snapshot: &MarketSnapshot,
    config: &EvaluationConfig,
) -> Result<EvaluationResult> {
    if !snapshot.symbol.eq_ignore_ascii_case(&saved.symbol) {
        return Err(AdvisorError::market_data_unavailable(format!(
            "snapshot is for {}, strategy {} is on {}",
            snapshot.symbol, saved.id, saved.symbol
        )));
    }
    let current_price = snapshot
        .price
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| AdvisorError::market_data_unavailable(format!("no live price for {}", saved.symbol)))?;
    if snapshot.as_of < saved.accepted_at {
        return Err(AdvisorError::market_data_unavailable(format!(
            "{} snapshot at {} predates acceptance at {}",
            saved.symbol, snapshot.as_of, saved.accepted_at
        )));
    }
    if saved.entry_price <= Decimal::ZERO {
        return Err(AdvisorError::inconsistent(format!(
            "strategy {} has a non-positive entry price",
            saved.id
        )));
    }

    let option = &saved.option_strategy;
    let legs = option
        .legs
        .iter()
        .map(|leg| value_leg(leg, snapshot, saved.entry_price, current_price))
        .collect::<Result<Vec<_>>>()?;

    let scale = option.multiplier * Decimal::from(option.quantity);
    let entry_net: Decimal = option
        .legs
        .iter()
        .zip(&legs)
        .map(|(leg, v)| leg.side.sign() * v.entry_premium)
        .sum();
    let current_net: Decimal = option
        .legs
        .iter()
        .zip(&legs)
        .map(|(leg, v)| leg.side.sign() * v.current_value)
        .sum();

    if entry_net.is_zero() {
        return Err(AdvisorError::inconsistent(format!(
            "strategy {} has zero entry cost; return is undefined",
            saved.id
        )));
    }

    let hundred = Decimal::ONE_HUNDRED;
    let option_return_pct = ((current_net - entry_net) / entry_net.abs() * hundred).round_dp(4);
    let stock_return_pct = ((current_price - saved.entry_price) / saved.entry_price
        * hundred
        * saved.stock_strategy.side.sign())
    .round_dp(4);
    let outperformance = option_return_pct - stock_return_pct;

    let result = EvaluationResult {
        strategy_id: saved.id,
        symbol: saved.symbol.clone(),
        entry_price: saved.entry_price,
        current_price,
        option_entry_cost: entry_net * scale,
        option_current_value: current_net * scale,
        option_return_pct,
        stock_return_pct,
        outperformance,
        option_performance: classify(option_return_pct, config),
        stock_performance: classify(stock_return_pct, config),
        relative_performance: classify(outperformance, config),
        legs,
        evaluated_at: snapshot.as_of,
    };

    info!(
        strategy_id = %result.strategy_id,
        symbol = %result.symbol,
        option_return_pct = %result.option_return_pct,
        stock_return_pct = %result.stock_return_pct,
        relative = %result.relative_performance,
        "Evaluated saved strategy"
    );

    Ok(result)
}

fn value_leg(
    leg: &OptionLeg,
    snapshot: &MarketSnapshot,
    entry_price: Decimal,
    current_price: Decimal,
) -> Result<LegValuation> {
    let entry_premium = leg
        .premium
        .ok_or_else(|| AdvisorError::inconsistent(format!("leg {} has no entry premium", leg.label())))?;

    let (current_value, source) = if let Some(quote) = snapshot.option_quote(leg.right, leg.strike, leg.expiry) {
        (quote.mid(), ValuationSource::LiveQuote)
    } else if snapshot.as_of.date_naive() >= leg.expiry {
        (leg.right.intrinsic(leg.strike, current_price), ValuationSource::Intrinsic)
    } else {
        let delta = leg
            .delta
            .ok_or_else(|| AdvisorError::inconsistent(format!("leg {} has no entry delta", leg.label())))?;
        (
            (entry_premium + delta * (current_price - entry_price)).max(Decimal::ZERO),
            ValuationSource::DeltaApprox,
        )
    };

    Ok(LegValuation {
        leg: leg.label(),
        entry_premium,
        current_value,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use delta_one_core::{
        Baseline, HedgeSide, LegSide, OptionQuote, OptionRight, OptionStrategy, StockStrategy, StrategyKind,
        TradeStyle,
    };
    use rust_decimal_macros::dec;

    fn accepted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 11, 2, 15, 0, 0).unwrap()
    }

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 18).unwrap()
    }

    fn saved_long_call() -> SavedStrategy {
        let legs = vec![OptionLeg {
            right: OptionRight::Call,
            side: LegSide::Buy,
            strike: dec!(150),
            expiry: expiry(),
            premium: Some(dec!(5)),
            delta: Some(dec!(0.5)),
        }];
        let option = OptionStrategy {
            symbol: "AAPL".into(),
            kind: StrategyKind::LongCall,
            style: TradeStyle::Balanced,
            baseline: Baseline {
                quantity: 1,
                notional_value: dec!(10000),
                underlying_price: dec!(150),
                strikes: vec![dec!(150)],
                days_to_expiry: 46,
                strike_step: Some(dec!(5)),
            },
            legs,
            quantity: 1,
            multiplier: dec!(100),
            notional_value: dec!(10000),
            underlying_price: dec!(150),
            as_of: accepted_at().date_naive(),
        };
        let stock = StockStrategy {
            symbol: "AAPL".into(),
            side: HedgeSide::Long,
            stock_notional: dec!(5000),
            margin: dec!(500),
            shares: 33,
            entry_price: dec!(150),
            portfolio_delta: dec!(0.5),
            notional_value: dec!(10000),
            stop_loss: Some(dec!(135)),
            take_profit: Some(dec!(180)),
        };
        SavedStrategy::accept("alice", option, stock, accepted_at())
    }

    fn snapshot(price: Option<Decimal>, days_later: i64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "AAPL".into(),
            price,
            as_of: accepted_at() + Duration::days(days_later),
            closes: Vec::new(),
            technical: Default::default(),
            fundamental: Default::default(),
            macro_indicators: Default::default(),
            option_quotes: Vec::new(),
        }
    }

    #[test]
    fn at_entry_price_both_returns_are_zero() {
        let saved = saved_long_call();
        let config = EvaluationConfig::default();

        let r = evaluate(&saved, &snapshot(Some(dec!(150)), 0), &config).unwrap();
        assert_eq!(r.option_return_pct, Decimal::ZERO);
        assert_eq!(r.stock_return_pct, Decimal::ZERO);
        assert_eq!(r.relative_performance, Performance::Tracking);

        let with_quote = snapshot(Some(dec!(150)), 0).with_option_quotes(vec![OptionQuote {
            right: OptionRight::Call,
            strike: dec!(150),
            expiry: expiry(),
            bid: dec!(4.90),
            ask: dec!(5.10),
            delta: Some(dec!(0.5)),
        }]);
        let r = evaluate(&saved, &with_quote, &config).unwrap();
        assert_eq!(r.option_return_pct, Decimal::ZERO);
        assert_eq!(r.legs[0].source, ValuationSource::LiveQuote);
    }

    #[test]
    fn rally_makes_option_outperform() {
        // +10 on the stock: 5 + 0.5 x 10 = 10, a 100% option gain vs 6.67% stock
        let r = evaluate(&saved_long_call(), &snapshot(Some(dec!(160)), 5), &EvaluationConfig::default()).unwrap();
        assert_eq!(r.option_return_pct, dec!(100));
        assert_eq!(r.stock_return_pct, dec!(6.6667));
        assert_eq!(r.option_performance, Performance::Outperforming);
        assert_eq!(r.stock_performance, Performance::Tracking);
        assert_eq!(r.relative_performance, Performance::Outperforming);
        assert_eq!(r.option_current_value, dec!(1000));
    }

    #[test]
    fn delta_approximation_floors_at_zero() {
        let r = evaluate(&saved_long_call(), &snapshot(Some(dec!(130)), 5), &EvaluationConfig::default()).unwrap();
        assert_eq!(r.legs[0].current_value, Decimal::ZERO);
        assert_eq!(r.option_return_pct, dec!(-100));
        assert_eq!(r.option_performance, Performance::Underperforming);
    }

    #[test]
    fn expired_leg_uses_intrinsic_value() {
        let r = evaluate(&saved_long_call(), &snapshot(Some(dec!(158)), 50), &EvaluationConfig::default()).unwrap();
        assert_eq!(r.legs[0].source, ValuationSource::Intrinsic);
        assert_eq!(r.legs[0].current_value, dec!(8));
        assert_eq!(r.option_return_pct, dec!(60));
    }

    #[test]
    fn short_hedge_gains_when_price_falls() {
        let mut saved = saved_long_call();
        saved.stock_strategy.side = HedgeSide::Short;
        let r = evaluate(&saved, &snapshot(Some(dec!(135)), 1), &EvaluationConfig::default()).unwrap();
        assert_eq!(r.stock_return_pct, dec!(10));
        assert_eq!(r.stock_performance, Performance::Outperforming);
    }

    #[test]
    fn unusable_snapshots_are_market_data_unavailable() {
        let saved = saved_long_call();
        let config = EvaluationConfig::default();
        for snap in [
            snapshot(None, 1),
            snapshot(Some(Decimal::ZERO), 1),
            snapshot(Some(dec!(150)), -1),
            MarketSnapshot {
                symbol: "MSFT".into(),
                ..snapshot(Some(dec!(150)), 1)
            },
        ] {
            assert!(matches!(
                evaluate(&saved, &snap, &config),
                Err(AdvisorError::MarketDataUnavailable(_))
            ));
        }
    }

    #[test]
    fn bands_are_inclusive() {
        let config = EvaluationConfig::default();
        assert_eq!(classify(dec!(10), &config), Performance::Outperforming);
        assert_eq!(classify(dec!(9.99), &config), Performance::Tracking);
        assert_eq!(classify(dec!(-10), &config), Performance::Underperforming);
        assert_eq!(classify(dec!(-9.99), &config), Performance::Tracking);
    }
}
