//! Profile-driven adjustment of a synthesized strategy.
//!
//! Each rule derives its target from the strategy's synthesis baseline rather
//! than from its current values, so re-running the optimizer on its own output
//! with the same profile changes nothing.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use delta_one_core::{
    AdvisorError, OptimizerConfig, OptionExperience, OptionRight, OptionStrategy, Result, RiskTolerance,
    TimeHorizon, UserProfile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Quantity,
    NotionalValue,
    Strike,
    DaysToExpiry,
    /// Profile field fell back to its most conservative reading
    RiskTolerance,
    OptionExperience,
    TimeHorizon,
    /// Nothing changed
    None,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quantity => "quantity",
            Self::NotionalValue => "notional_value",
            Self::Strike => "strike",
            Self::DaysToExpiry => "days_to_expiry",
            Self::RiskTolerance => "risk_tolerance",
            Self::OptionExperience => "option_experience",
            Self::TimeHorizon => "time_horizon",
            Self::None => "none",
        };
        write!(f, "{name}")
    }
}

/// One recorded change (or fallback) made for the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub parameter: Parameter,
    /// Leg index for per-leg changes
    pub leg: Option<usize>,
    pub original: String,
    pub new: String,
    pub reason: String,
}

impl Adjustment {
    fn new(parameter: Parameter, original: impl ToString, new: impl ToString, reason: impl Into<String>) -> Self {
        Self {
            parameter,
            leg: None,
            original: original.to_string(),
            new: new.to_string(),
            reason: reason.into(),
        }
    }

    fn on_leg(mut self, index: usize) -> Self {
        self.leg = Some(index);
        self
    }

    fn missing(parameter: Parameter, fallback: &str) -> Self {
        Self::new(
            parameter,
            "missing",
            fallback,
            format!("{parameter} missing from profile; applying the most conservative rule"),
        )
    }

    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(
            self.parameter,
            Parameter::Quantity | Parameter::NotionalValue | Parameter::Strike | Parameter::DaysToExpiry
        )
    }
}

/// Days-to-expiry bounds a repriced leg must respect for the profile's horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenorWindow {
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
}

impl TenorWindow {
    #[must_use]
    pub fn for_horizon(horizon: TimeHorizon, config: &OptimizerConfig) -> Self {
        match horizon {
            TimeHorizon::Short => Self {
                min_days: None,
                max_days: Some(config.short_horizon_max_days),
            },
            TimeHorizon::Medium => Self::default(),
            TimeHorizon::Long => Self {
                min_days: Some(config.long_horizon_min_days),
                max_days: None,
            },
        }
    }

    #[must_use]
    pub fn contains(&self, days: i64) -> bool {
        self.min_days.map_or(true, |min| days >= min) && self.max_days.map_or(true, |max| days <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimization {
    pub strategy: OptionStrategy,
    /// Never empty
    pub adjustments: Vec<Adjustment>,
    pub notes: Vec<String>,
    /// Some leg moved off its quote and must be repriced before hedging.
    pub requires_reprice: bool,
    /// Where repricing may move the expiry.
    pub tenor: TenorWindow,
}

/// Fits `base` to `profile`.
///
/// Direction, leg rights and leg sides are never changed.
///
/// # Errors
/// Returns `Validation` for an out-of-range confidence level and
/// `InconsistentState` if the baseline does not describe the strategy's legs.
pub fn optimize(base: &OptionStrategy, profile: &UserProfile, config: &OptimizerConfig) -> Result<Optimization> {
    let baseline = &base.baseline;
    if baseline.quantity == 0 || baseline.strikes.len() != base.legs.len() {
        return Err(AdvisorError::inconsistent(format!(
            "{}: baseline does not match the strategy legs",
            base.symbol
        )));
    }
    if let Some(c) = profile.confidence_level {
        if !c.is_finite() || !(0.0..=1.0).contains(&c) {
            return Err(AdvisorError::validation(format!(
                "confidence_level must be in [0, 1], got {c}"
            )));
        }
    }

    let mut strategy = base.clone();
    let mut adjustments = Vec::new();
    let mut notes = Vec::new();

    // Quantity and notional by risk tolerance.
    let risk = profile.risk_tolerance.unwrap_or_else(|| {
        adjustments.push(Adjustment::missing(Parameter::RiskTolerance, "conservative"));
        RiskTolerance::Conservative
    });
    let quantity = target_quantity(baseline.quantity, risk, config)?;
    if quantity != base.quantity {
        adjustments.push(Adjustment::new(
            Parameter::Quantity,
            base.quantity,
            quantity,
            format!("{risk:?} risk tolerance scales the synthesized size of {}", baseline.quantity),
        ));
    }
    let notional = baseline.notional_value * Decimal::from(quantity) / Decimal::from(baseline.quantity);
    if notional != base.notional_value {
        adjustments.push(Adjustment::new(
            Parameter::NotionalValue,
            base.notional_value,
            notional,
            "Notional follows the structure count",
        ));
    }
    strategy.quantity = quantity;
    strategy.notional_value = notional;

    // Strikes by option experience.
    let experience = profile.option_experience.unwrap_or_else(|| {
        adjustments.push(Adjustment::missing(Parameter::OptionExperience, "none"));
        OptionExperience::None
    });
    let strikes = target_strikes(base, experience.is_novice());
    for (index, (leg, strike)) in strategy.legs.iter_mut().zip(strikes).enumerate() {
        if leg.strike != strike {
            adjustments.push(
                Adjustment::new(
                    Parameter::Strike,
                    leg.strike,
                    strike,
                    if experience.is_novice() {
                        "Limited options experience: moneyness halved toward at-the-money"
                    } else {
                        "Experienced trader: synthesized strike restored"
                    },
                )
                .on_leg(index),
            );
            leg.strike = strike;
            leg.premium = None;
            leg.delta = None;
        }
    }

    // Tenor by time horizon.
    let horizon = profile.time_horizon.unwrap_or_else(|| {
        adjustments.push(Adjustment::missing(Parameter::TimeHorizon, "short"));
        TimeHorizon::Short
    });
    let days = match horizon {
        TimeHorizon::Short => baseline.days_to_expiry.min(config.short_horizon_max_days),
        TimeHorizon::Medium => baseline.days_to_expiry,
        TimeHorizon::Long => baseline.days_to_expiry.max(config.long_horizon_min_days),
    };
    let expiry = base.as_of + chrono::Duration::days(days);
    if strategy.legs.iter().any(|leg| leg.expiry != expiry) {
        adjustments.push(Adjustment::new(
            Parameter::DaysToExpiry,
            base.days_to_expiry(),
            days,
            format!("{horizon:?} time horizon"),
        ));
        for leg in strategy.legs.iter_mut().filter(|leg| leg.expiry != expiry) {
            leg.expiry = expiry;
            leg.premium = None;
            leg.delta = None;
        }
    }

    if !adjustments.iter().any(Adjustment::is_change) {
        adjustments.push(Adjustment::new(
            Parameter::None,
            "-",
            "-",
            "No adjustment needed for this profile",
        ));
    }

    if let Some(c) = profile.confidence_level {
        if c < config.low_confidence {
            notes.push(format!(
                "Low confidence ({c:.2}): consider a smaller position or waiting for confirmation"
            ));
        } else if c > config.high_confidence {
            notes.push(format!(
                "High confidence ({c:.2}): guard against overconfidence and respect the stop levels"
            ));
        }
    }
    if experience.is_novice() {
        notes.push("Limited options experience: keep size small and watch Delta and Theta daily".to_string());
    }

    let requires_reprice = !strategy.is_fully_quoted();
    if requires_reprice {
        warn!(symbol = %strategy.symbol, "Optimized legs moved off their quotes; reprice before hedging");
    }
    info!(
        symbol = %strategy.symbol,
        direction = %strategy.direction(),
        quantity = strategy.quantity,
        changes = adjustments.iter().filter(|a| a.is_change()).count(),
        requires_reprice,
        "Optimized strategy for profile"
    );
    debug!(?adjustments, "Optimizer adjustments");

    Ok(Optimization {
        strategy,
        adjustments,
        notes,
        requires_reprice,
        tenor: TenorWindow::for_horizon(horizon, config),
    })
}

fn target_quantity(base: u32, risk: RiskTolerance, config: &OptimizerConfig) -> Result<u32> {
    let base_dec = Decimal::from(base);
    let scaled = match risk {
        RiskTolerance::Conservative => (base_dec * config.conservative_quantity_factor).floor(),
        RiskTolerance::Moderate => base_dec,
        RiskTolerance::Aggressive => (base_dec * config.aggressive_quantity_factor)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
    };
    scaled
        .to_u32()
        .map(|q| q.max(1))
        .ok_or_else(|| AdvisorError::inconsistent(format!("scaled quantity {scaled} out of range")))
}

/// Baseline strikes, or for novices each moved halfway toward the synthesis spot.
fn target_strikes(base: &OptionStrategy, novice: bool) -> Vec<Decimal> {
    let baseline = &base.baseline;
    if !novice {
        return baseline.strikes.clone();
    }

    let spot = baseline.underlying_price;
    let mut strikes: Vec<Decimal> = baseline
        .strikes
        .iter()
        .map(|&strike| {
            let halfway = spot + (strike - spot) / Decimal::TWO;
            match baseline.strike_step {
                // Midpoints round away from the baseline strike, i.e. toward spot.
                Some(step) if step > Decimal::ZERO => {
                    let steps = ((halfway - strike) / step)
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                    strike + steps * step
                }
                _ => halfway,
            }
        })
        .collect();

    // A spread's short leg must stay beyond its long leg.
    if let [long, short, ..] = strikes.as_mut_slice() {
        let long = *long;
        let right = base.kind.right();
        let collapsed = match right {
            OptionRight::Call => *short <= long,
            OptionRight::Put => *short >= long,
        };
        if collapsed {
            let gap = baseline
                .strike_step
                .filter(|s| *s > Decimal::ZERO)
                .unwrap_or_else(|| (baseline.strikes[1] - baseline.strikes[0]).abs() / Decimal::TWO);
            *short = match right {
                OptionRight::Call => long + gap,
                OptionRight::Put => long - gap,
            };
        }
    }
    strikes
}
