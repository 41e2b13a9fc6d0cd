//! Expiry and strike selection against a listed chain.
//!
//! Every helper here picks from quotes that exist in the chain; none of them
//! invents a strike or an expiry.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use delta_one_core::{AdvisorError, LegSide, OptionChain, OptionLeg, OptionQuote, OptionRight, Result};

/// Quotes with an offer are tradable; zero-ask rows are placeholders.
fn tradable(quote: &OptionQuote) -> bool {
    quote.ask > Decimal::ZERO
}

/// Listed tradable expiries for a right at least `min_days` after `as_of`.
#[must_use]
pub fn listed_expiries(chain: &OptionChain, right: OptionRight, as_of: NaiveDate, min_days: i64) -> Vec<NaiveDate> {
    let earliest = as_of + Duration::days(min_days);
    let mut expiries: Vec<NaiveDate> = chain
        .quotes()
        .iter()
        .filter(|q| q.right == right && tradable(q) && q.expiry >= earliest)
        .map(|q| q.expiry)
        .collect();
    expiries.sort();
    expiries.dedup();
    expiries
}

/// Expiry nearest `target`; ties go to the earlier date.
#[must_use]
pub fn nearest_expiry(expiries: &[NaiveDate], target: NaiveDate) -> Option<NaiveDate> {
    expiries
        .iter()
        .copied()
        .min_by_key(|e| ((*e - target).num_days().abs(), *e))
}

/// Expiry for a new structure: nearest `as_of + target_days` among eligible listings.
///
/// # Errors
/// Returns `DataUnavailable` if the chain lists no eligible expiry.
pub fn select_expiry(
    chain: &OptionChain,
    right: OptionRight,
    as_of: NaiveDate,
    target_days: i64,
    min_days: i64,
) -> Result<NaiveDate> {
    let expiries = listed_expiries(chain, right, as_of, min_days);
    nearest_expiry(&expiries, as_of + Duration::days(target_days)).ok_or_else(|| {
        AdvisorError::data_unavailable(format!(
            "{}: no {right:?} expiry at least {min_days} days after {as_of}",
            chain.underlying()
        ))
    })
}

/// Strike at a moneyness offset from spot; positive offsets are out-of-the-money.
#[must_use]
pub fn target_strike(spot: Decimal, right: OptionRight, offset: Decimal) -> Decimal {
    match right {
        OptionRight::Call => spot * (Decimal::ONE + offset),
        OptionRight::Put => spot * (Decimal::ONE - offset),
    }
}

/// Tradable quote whose strike is nearest `target`; ties go toward spot, then lower strike.
#[must_use]
pub fn nearest_strike<'a>(quotes: &[&'a OptionQuote], target: Decimal, spot: Decimal) -> Option<&'a OptionQuote> {
    quotes
        .iter()
        .copied()
        .filter(|q| tradable(q))
        .min_by_key(|q| ((q.strike - target).abs(), (q.strike - spot).abs(), q.strike))
}

/// Listed strike nearest the target, refusing anything further than `max_deviation`.
///
/// # Errors
/// Returns `DataUnavailable` if no tradable strike lies within the deviation.
pub fn select_strike<'a>(
    chain: &'a OptionChain,
    right: OptionRight,
    expiry: NaiveDate,
    target: Decimal,
    max_deviation: Decimal,
) -> Result<&'a OptionQuote> {
    let quotes = chain.strikes_at(right, expiry);
    nearest_strike(&quotes, target, chain.underlying_price())
        .filter(|q| (q.strike - target).abs() <= max_deviation)
        .ok_or_else(|| {
            AdvisorError::data_unavailable(format!(
                "{}: no listed {right:?} strike within {max_deviation} of {} for {expiry}",
                chain.underlying(),
                target.round_dp(2)
            ))
        })
}

/// Short leg of a vertical spread, chosen further out-of-the-money than `long`
/// so that `|long.delta - short.delta|` lands as close as possible to `target_delta`.
///
/// # Errors
/// Returns `InconsistentState` if the long leg or every candidate lacks a delta,
/// and `DataUnavailable` if nothing is listed beyond the long strike.
pub fn select_short_leg<'a>(
    chain: &'a OptionChain,
    long: &OptionQuote,
    target_delta: Decimal,
) -> Result<&'a OptionQuote> {
    let long_delta = long.delta.ok_or_else(|| {
        AdvisorError::inconsistent(format!("long leg {}{} has no delta", long.strike, long.right))
    })?;

    let further_otm: Vec<&OptionQuote> = chain
        .strikes_at(long.right, long.expiry)
        .into_iter()
        .filter(|q| tradable(q))
        .filter(|q| match long.right {
            OptionRight::Call => q.strike > long.strike,
            OptionRight::Put => q.strike < long.strike,
        })
        .collect();

    if further_otm.is_empty() {
        return Err(AdvisorError::data_unavailable(format!(
            "{}: nothing listed beyond {}{} {} for the short leg",
            chain.underlying(),
            long.strike,
            long.right,
            long.expiry
        )));
    }

    further_otm
        .into_iter()
        .filter_map(|q| q.delta.map(|d| (q, ((long_delta - d).abs() - target_delta).abs())))
        .min_by_key(|(q, miss)| (*miss, (q.strike - long.strike).abs()))
        .map(|(q, _)| q)
        .ok_or_else(|| {
            AdvisorError::inconsistent(format!(
                "{}: short-leg candidates beyond {} carry no delta",
                chain.underlying(),
                long.strike
            ))
        })
}

/// Leg built from a listed quote at its mid price.
#[must_use]
pub fn leg_from_quote(quote: &OptionQuote, side: LegSide) -> OptionLeg {
    OptionLeg {
        right: quote.right,
        side,
        strike: quote.strike,
        expiry: quote.expiry,
        premium: Some(quote.mid()),
        delta: quote.delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap() + Duration::days(d)
    }

    fn quote(right: OptionRight, strike: Decimal, expiry: NaiveDate, delta: Decimal) -> OptionQuote {
        OptionQuote {
            right,
            strike,
            expiry,
            bid: dec!(1.00),
            ask: dec!(1.20),
            delta: Some(delta),
        }
    }

    fn chain(quotes: Vec<OptionQuote>) -> OptionChain {
        OptionChain::new("MSFT", dec!(100), day(0), quotes).unwrap()
    }

    #[test]
    fn expiry_ties_go_earlier() {
        let expiries = [day(40), day(50)];
        assert_eq!(nearest_expiry(&expiries, day(45)), Some(day(40)));
    }

    #[test]
    fn expiry_respects_minimum_days() {
        let c = chain(vec![
            quote(OptionRight::Call, dec!(100), day(3), dec!(0.5)),
            quote(OptionRight::Call, dec!(100), day(60), dec!(0.5)),
        ]);
        assert_eq!(select_expiry(&c, OptionRight::Call, day(0), 5, 7).unwrap(), day(60));
        assert!(matches!(
            select_expiry(&c, OptionRight::Put, day(0), 45, 7),
            Err(AdvisorError::DataUnavailable(_))
        ));
    }

    #[test]
    fn strike_outside_deviation_is_unavailable() {
        let c = chain(vec![quote(OptionRight::Call, dec!(120), day(45), dec!(0.2))]);
        let result = select_strike(&c, OptionRight::Call, day(45), dec!(105), dec!(5));
        assert!(matches!(result, Err(AdvisorError::DataUnavailable(_))));
    }

    #[test]
    fn strike_ties_resolve_to_lower_strike() {
        let c = chain(vec![
            quote(OptionRight::Put, dec!(95), day(45), dec!(-0.35)),
            quote(OptionRight::Put, dec!(105), day(45), dec!(-0.65)),
        ]);
        let q = select_strike(&c, OptionRight::Put, day(45), dec!(100), dec!(5)).unwrap();
        assert_eq!(q.strike, dec!(95));
        let q = select_strike(&c, OptionRight::Put, day(45), dec!(101), dec!(5)).unwrap();
        assert_eq!(q.strike, dec!(105));
    }

    #[test]
    fn short_leg_matches_target_delta() {
        let c = chain(vec![
            quote(OptionRight::Call, dec!(100), day(45), dec!(0.50)),
            quote(OptionRight::Call, dec!(105), day(45), dec!(0.35)),
            quote(OptionRight::Call, dec!(110), day(45), dec!(0.20)),
            quote(OptionRight::Call, dec!(115), day(45), dec!(0.10)),
        ]);
        let long = c.find(OptionRight::Call, dec!(100), day(45)).unwrap();
        let short = select_short_leg(&c, long, dec!(0.30)).unwrap();
        assert_eq!(short.strike, dec!(110));
    }

    #[test]
    fn put_short_leg_is_lower_strike() {
        let c = chain(vec![
            quote(OptionRight::Put, dec!(90), day(45), dec!(-0.20)),
            quote(OptionRight::Put, dec!(100), day(45), dec!(-0.50)),
            quote(OptionRight::Put, dec!(110), day(45), dec!(-0.80)),
        ]);
        let long = c.find(OptionRight::Put, dec!(100), day(45)).unwrap();
        assert_eq!(select_short_leg(&c, long, dec!(0.30)).unwrap().strike, dec!(90));
    }

    #[test]
    fn no_short_candidates_is_unavailable() {
        let c = chain(vec![quote(OptionRight::Call, dec!(100), day(45), dec!(0.5))]);
        let long = c.find(OptionRight::Call, dec!(100), day(45)).unwrap();
        assert!(matches!(
            select_short_leg(&c, long, dec!(0.3)),
            Err(AdvisorError::DataUnavailable(_))
        ));
    }

    #[test]
    fn leg_uses_mid_premium() {
        let q = quote(OptionRight::Call, dec!(100), day(45), dec!(0.5));
        let leg = leg_from_quote(&q, LegSide::Buy);
        assert_eq!(leg.premium, Some(dec!(1.10)));
        assert_eq!(leg.delta, Some(dec!(0.5)));
    }
}
