//! Expiry payoff analysis for option structures.
//!
//! Payoff at expiry is piecewise linear in the underlying price with kinks
//! only at strikes, so extremes and breakevens come from evaluating the
//! kinks plus the slope beyond the highest strike.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use delta_one_core::{AdvisorError, OptionRight, OptionStrategy, Result, SynthesisConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub price: Decimal,
    pub pnl: Decimal,
}

/// Risk profile of a structure held to expiry, in account currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    /// Per share, debit positive
    pub net_premium: Decimal,
    /// Cash to open the whole position
    pub total_premium: Decimal,
    /// `None` when the upside is unbounded
    pub max_gain: Option<Decimal>,
    /// Positive amount; `None` when the downside is unbounded
    pub max_loss: Option<Decimal>,
    pub breakevens: Vec<Decimal>,
    pub payoff_curve: Vec<PayoffPoint>,
}

/// Position P&L at expiry if the underlying settles at `price`.
///
/// # Errors
/// Returns `InconsistentState` if any leg lacks a premium.
pub fn payoff_at(strategy: &OptionStrategy, price: Decimal) -> Result<Decimal> {
    let net_premium = strategy.net_premium()?;
    Ok(per_share_payoff(strategy, price, net_premium) * scale(strategy))
}

fn per_share_payoff(strategy: &OptionStrategy, price: Decimal, net_premium: Decimal) -> Decimal {
    let intrinsic: Decimal = strategy
        .legs
        .iter()
        .map(|leg| leg.side.sign() * leg.right.intrinsic(leg.strike, price))
        .sum();
    intrinsic - net_premium
}

fn scale(strategy: &OptionStrategy) -> Decimal {
    strategy.multiplier * Decimal::from(strategy.quantity)
}

/// Computes premium, extremes, breakevens and the payoff curve.
///
/// # Errors
/// Returns `InconsistentState` if the structure has no legs or a leg lacks a premium.
pub fn analyze(strategy: &OptionStrategy, config: &SynthesisConfig) -> Result<StrategyMetrics> {
    if strategy.legs.is_empty() {
        return Err(AdvisorError::inconsistent(format!(
            "{}: cannot analyze a structure with no legs",
            strategy.symbol
        )));
    }
    let net_premium = strategy.net_premium()?;
    let scale = scale(strategy);

    let mut kinks: Vec<Decimal> = std::iter::once(Decimal::ZERO)
        .chain(strategy.legs.iter().map(|leg| leg.strike))
        .collect();
    kinks.sort();
    kinks.dedup();

    let at_kinks: Vec<(Decimal, Decimal)> = kinks
        .iter()
        .map(|&price| (price, per_share_payoff(strategy, price, net_premium) * scale))
        .collect();

    // Beyond the top strike only calls move, one unit per share each.
    let tail_slope: Decimal = strategy
        .legs
        .iter()
        .filter(|leg| leg.right == OptionRight::Call)
        .map(|leg| leg.side.sign())
        .sum::<Decimal>()
        * scale;

    let best = at_kinks.iter().map(|(_, pnl)| *pnl).max().unwrap_or(Decimal::ZERO);
    let worst = at_kinks.iter().map(|(_, pnl)| *pnl).min().unwrap_or(Decimal::ZERO);

    let max_gain = (tail_slope <= Decimal::ZERO).then_some(best);
    let max_loss = (tail_slope >= Decimal::ZERO).then(|| (-worst).max(Decimal::ZERO));

    let breakevens = breakevens(&at_kinks, tail_slope);
    let payoff_curve = curve(strategy, net_premium, config);

    Ok(StrategyMetrics {
        net_premium,
        total_premium: strategy.total_premium()?,
        max_gain,
        max_loss,
        breakevens,
        payoff_curve,
    })
}

fn breakevens(at_kinks: &[(Decimal, Decimal)], tail_slope: Decimal) -> Vec<Decimal> {
    let mut found: Vec<Decimal> = Vec::new();
    for window in at_kinks.windows(2) {
        let (p0, v0) = window[0];
        let (p1, v1) = window[1];
        if v0.is_zero() {
            found.push(p0);
        }
        if (v0 < Decimal::ZERO && v1 > Decimal::ZERO) || (v0 > Decimal::ZERO && v1 < Decimal::ZERO) {
            found.push(p0 + (p1 - p0) * (-v0) / (v1 - v0));
        }
    }
    if let Some(&(top, v_top)) = at_kinks.last() {
        if v_top.is_zero() {
            found.push(top);
        } else if !tail_slope.is_zero() && (v_top < Decimal::ZERO) == (tail_slope > Decimal::ZERO) {
            found.push(top - v_top / tail_slope);
        }
    }
    found.retain(|p| *p > Decimal::ZERO);
    let mut found: Vec<Decimal> = found.into_iter().map(|p| p.round_dp(4)).collect();
    found.sort();
    found.dedup();
    found
}

fn curve(strategy: &OptionStrategy, net_premium: Decimal, config: &SynthesisConfig) -> Vec<PayoffPoint> {
    let spot = strategy.underlying_price;
    let low = spot * (Decimal::ONE - config.payoff_range_pct);
    let high = spot * (Decimal::ONE + config.payoff_range_pct);
    let points = config.payoff_points.max(2);
    let step = (high - low) / Decimal::from(points - 1);
    let scale = scale(strategy);

    (0..points)
        .map(|i| {
            let price = (low + step * Decimal::from(i)).round_dp(4);
            PayoffPoint {
                price,
                pnl: (per_share_payoff(strategy, price, net_premium) * scale).round_dp(2),
            }
        })
        .collect()
}
