//! Snaps adjusted legs back onto listed quotes and rebuilds the hedge.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use delta_one_core::{
    AdvisorError, OptionChain, OptionRight, OptionStrategy, Result, StockStrategy, SynthesisConfig,
};

use crate::hedge::delta_one_hedge;
use crate::metrics::{analyze, StrategyMetrics};
use crate::optimizer::TenorWindow;
use crate::selection::{listed_expiries, nearest_expiry, nearest_strike};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repriced {
    pub strategy: OptionStrategy,
    pub stock_strategy: StockStrategy,
    pub metrics: StrategyMetrics,
}

/// Resolves every leg against `chain`: nearest listed expiry inside `tenor`
/// (ties earlier), then nearest listed strike of the same right (ties toward
/// spot) within the configured deviation.
///
/// Expiries closer than `min_days_to_expiry` are never used. Rights, sides
/// and the baseline are kept; premium and delta come from the matched quote.
///
/// # Errors
/// - `Validation` if the chain is for another symbol
/// - `DataUnavailable` if a leg has no eligible listing or a spread collapses
/// - `InconsistentState` if a matched quote carries no delta
pub fn reprice(
    strategy: &OptionStrategy,
    chain: &OptionChain,
    tenor: TenorWindow,
    config: &SynthesisConfig,
) -> Result<Repriced> {
    if !strategy.symbol.eq_ignore_ascii_case(chain.underlying()) {
        return Err(AdvisorError::validation(format!(
            "cannot reprice {} against a {} chain",
            strategy.symbol,
            chain.underlying()
        )));
    }

    let spot = chain.underlying_price();
    let max_deviation = config.max_strike_deviation * spot;
    let min_days = tenor.min_days.unwrap_or(0).max(config.min_days_to_expiry);
    let mut repriced = strategy.clone();
    repriced.underlying_price = spot;

    for leg in &mut repriced.legs {
        let expiries: Vec<NaiveDate> = listed_expiries(chain, leg.right, chain.as_of(), min_days)
            .into_iter()
            .filter(|e| tenor.contains((*e - chain.as_of()).num_days()))
            .collect();
        let expiry = nearest_expiry(&expiries, leg.expiry).ok_or_else(|| {
            AdvisorError::data_unavailable(format!(
                "{}: no {:?} expiry between {min_days} and {} days for {}",
                chain.underlying(),
                leg.right,
                tenor.max_days.map_or_else(|| "any".to_string(), |d| d.to_string()),
                leg.label()
            ))
        })?;
        let quote = nearest_strike(&chain.strikes_at(leg.right, expiry), leg.strike, spot)
            .filter(|q| (q.strike - leg.strike).abs() <= max_deviation)
            .ok_or_else(|| {
                AdvisorError::data_unavailable(format!(
                    "{}: no strike within {} of {} on {expiry}",
                    chain.underlying(),
                    max_deviation.round_dp(2),
                    leg.label()
                ))
            })?;

        if quote.strike != leg.strike || quote.expiry != leg.expiry {
            debug!(from = %leg.label(), strike = %quote.strike, expiry = %quote.expiry, "Snapped leg to listing");
        }
        leg.strike = quote.strike;
        leg.expiry = quote.expiry;
        leg.premium = Some(quote.mid());
        leg.delta = quote.delta;
    }

    if let (true, [long, short]) = (repriced.kind.is_spread(), repriced.legs.as_slice()) {
        let collapsed = match long.right {
            OptionRight::Call => short.strike <= long.strike,
            OptionRight::Put => short.strike >= long.strike,
        };
        if collapsed {
            return Err(AdvisorError::data_unavailable(format!(
                "{}: spread legs collapse to {} after repricing",
                chain.underlying(),
                long.strike
            )));
        }
    }

    let stock_strategy = delta_one_hedge(&repriced, spot, config)?;
    let metrics = analyze(&repriced, config)?;

    info!(
        symbol = %repriced.symbol,
        kind = %repriced.kind,
        portfolio_delta = %stock_strategy.portfolio_delta,
        shares = stock_strategy.shares,
        "Repriced strategy against chain"
    );

    Ok(Repriced {
        strategy: repriced,
        stock_strategy,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use delta_one_core::{Baseline, LegSide, OptionLeg, OptionQuote, StrategyKind, TradeStyle};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
    }

    fn q(strike: Decimal, days: i64, delta: Option<Decimal>) -> OptionQuote {
        OptionQuote {
            right: OptionRight::Call,
            strike,
            expiry: as_of() + Duration::days(days),
            bid: dec!(3.00),
            ask: dec!(3.40),
            delta,
        }
    }

    fn chain(quotes: Vec<OptionQuote>) -> OptionChain {
        OptionChain::new("AAPL", dec!(150), as_of(), quotes).unwrap()
    }

    fn unquoted(side: LegSide, strike: Decimal, days: i64) -> OptionLeg {
        OptionLeg {
            right: OptionRight::Call,
            side,
            strike,
            expiry: as_of() + Duration::days(days),
            premium: None,
            delta: None,
        }
    }

    fn strategy(legs: Vec<OptionLeg>) -> OptionStrategy {
        let kind = if legs.len() == 2 {
            StrategyKind::BullCallSpread
        } else {
            StrategyKind::LongCall
        };
        OptionStrategy {
            symbol: "AAPL".into(),
            kind,
            style: TradeStyle::Balanced,
            baseline: Baseline {
                quantity: 1,
                notional_value: dec!(10000),
                underlying_price: dec!(150),
                strikes: legs.iter().map(|l| l.strike).collect(),
                days_to_expiry: 44,
                strike_step: Some(dec!(5)),
            },
            legs,
            quantity: 1,
            multiplier: dec!(100),
            notional_value: dec!(10000),
            underlying_price: dec!(150),
            as_of: as_of(),
        }
    }

    #[test]
    fn snaps_to_nearest_listing() {
        let c = chain(vec![
            q(dec!(150), 28, Some(dec!(0.5))),
            q(dec!(150), 35, Some(dec!(0.52))),
            q(dec!(155), 35, Some(dec!(0.40))),
        ]);
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(152.5), 30)]);
        let out = reprice(&s, &c, TenorWindow::default(), &SynthesisConfig::default()).unwrap();
        let leg = &out.strategy.legs[0];
        assert_eq!(leg.expiry, as_of() + Duration::days(28));
        assert_eq!(leg.strike, dec!(150));
        assert_eq!(leg.premium, Some(dec!(3.20)));
        assert_eq!(out.stock_strategy.portfolio_delta, dec!(0.5));
        assert_eq!(out.strategy.baseline, s.baseline);
    }

    #[test]
    fn spread_keeps_sides_and_rebuilds_hedge() {
        let c = chain(vec![
            q(dec!(150), 30, Some(dec!(0.5))),
            q(dec!(160), 30, Some(dec!(0.3))),
        ]);
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(150), 30), unquoted(LegSide::Sell, dec!(160), 30)]);
        let out = reprice(&s, &c, TenorWindow::default(), &SynthesisConfig::default()).unwrap();
        assert_eq!(out.strategy.legs[1].side, LegSide::Sell);
        assert_eq!(out.stock_strategy.portfolio_delta, dec!(0.2));
        assert_eq!(out.stock_strategy.stock_notional, dec!(2000));
        assert!(out.strategy.is_fully_quoted());
    }

    #[test]
    fn collapsed_spread_is_unavailable() {
        let c = chain(vec![q(dec!(150), 30, Some(dec!(0.5)))]);
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(150), 30), unquoted(LegSide::Sell, dec!(155), 30)]);
        assert!(matches!(
            reprice(&s, &c, TenorWindow::default(), &SynthesisConfig::default()),
            Err(AdvisorError::DataUnavailable(_))
        ));
    }

    #[test]
    fn quote_without_delta_is_inconsistent() {
        let c = chain(vec![q(dec!(150), 30, None)]);
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(150), 30)]);
        assert!(matches!(
            reprice(&s, &c, TenorWindow::default(), &SynthesisConfig::default()),
            Err(AdvisorError::InconsistentState(_))
        ));
    }

    #[test]
    fn other_symbol_rejected() {
        let c = OptionChain::new("MSFT", dec!(400), as_of(), vec![q(dec!(400), 30, Some(dec!(0.5)))]).unwrap();
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(150), 30)]);
        assert!(matches!(
            reprice(&s, &c, TenorWindow::default(), &SynthesisConfig::default()),
            Err(AdvisorError::Validation(_))
        ));
    }

    fn short_horizon() -> TenorWindow {
        TenorWindow {
            min_days: None,
            max_days: Some(30),
        }
    }

    #[test]
    fn short_horizon_never_exceeds_cap() {
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(150), 30)]);
        let c = chain(vec![
            q(dec!(150), 5, Some(dec!(0.5))),
            q(dec!(150), 21, Some(dec!(0.5))),
            q(dec!(150), 35, Some(dec!(0.5))),
        ]);
        let out = reprice(&s, &c, short_horizon(), &SynthesisConfig::default()).unwrap();
        assert_eq!(out.strategy.days_to_expiry(), 21);

        // 35 is nearer the target but beyond the cap, 5 is under the minimum
        for days in [vec![5, 35, 60], vec![5, 60]] {
            let c = chain(days.into_iter().map(|d| q(dec!(150), d, Some(dec!(0.5)))).collect());
            assert!(matches!(
                reprice(&s, &c, short_horizon(), &SynthesisConfig::default()),
                Err(AdvisorError::DataUnavailable(_))
            ));
        }
    }

    #[test]
    fn long_horizon_respects_floor() {
        let long = TenorWindow {
            min_days: Some(60),
            max_days: None,
        };
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(150), 60)]);
        let c = chain(vec![q(dec!(150), 58, Some(dec!(0.5))), q(dec!(150), 90, Some(dec!(0.55)))]);
        let out = reprice(&s, &c, long, &SynthesisConfig::default()).unwrap();
        assert_eq!(out.strategy.days_to_expiry(), 90);

        let c = chain(vec![q(dec!(150), 58, Some(dec!(0.5)))]);
        assert!(matches!(
            reprice(&s, &c, long, &SynthesisConfig::default()),
            Err(AdvisorError::DataUnavailable(_))
        ));
    }

    #[test]
    fn strike_too_far_from_target_is_unavailable() {
        // 5% of 150 is 7.5
        let c = chain(vec![q(dec!(170), 30, Some(dec!(0.2)))]);
        let s = strategy(vec![unquoted(LegSide::Buy, dec!(150), 30)]);
        assert!(matches!(
            reprice(&s, &c, TenorWindow::default(), &SynthesisConfig::default()),
            Err(AdvisorError::DataUnavailable(_))
        ));
    }
}
