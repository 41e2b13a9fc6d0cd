//! Strategy synthesis: turns a thesis, a listed chain and capital into a hedged structure.
//!
//! The structure family is a pure function of the thesis; legs are always
//! picked from quotes present in the supplied chain.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use delta_one_core::{
    AdvisorError, Baseline, Direction, LegSide, OptionChain, OptionStrategy, Result, StockStrategy,
    Strength, StrategyKind, SynthesisConfig, Thesis, TradeStyle,
};

use crate::hedge::delta_one_hedge;
use crate::metrics::{analyze, StrategyMetrics};
use crate::selection::{leg_from_quote, select_expiry, select_short_leg, select_strike, target_strike};

/// Structure chosen for a thesis before any chain is consulted.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Observe(String),
    Build {
        kind: StrategyKind,
        /// Target |portfolio delta| for spreads; `None` for single legs
        target_delta: Option<Decimal>,
    },
}

/// Picks the structure family for a thesis.
#[must_use]
pub fn plan(thesis: &Thesis, config: &SynthesisConfig) -> Plan {
    let (single, spread) = match thesis.direction {
        Direction::Bullish => (StrategyKind::LongCall, StrategyKind::BullCallSpread),
        Direction::Bearish => (StrategyKind::LongPut, StrategyKind::BearPutSpread),
        Direction::Neutral => {
            return Plan::Observe(format!(
                "Neutral thesis (score {:.1}); no directional structure warranted",
                thesis.score
            ))
        }
    };

    match thesis.strength {
        Strength::Strong if thesis.score >= config.strong_score_threshold => Plan::Build {
            kind: single,
            target_delta: None,
        },
        Strength::Strong | Strength::Moderate => Plan::Build {
            kind: spread,
            target_delta: Some(config.moderate_target_delta),
        },
        Strength::Weak => Plan::Build {
            kind: spread,
            target_delta: Some(config.weak_target_delta),
        },
    }
}

/// A built option structure with its stock equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIdea {
    pub option_strategy: OptionStrategy,
    pub stock_strategy: StockStrategy,
    pub metrics: StrategyMetrics,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Synthesis {
    Observe { reason: String },
    Trade(Box<TradeIdea>),
}

impl Synthesis {
    #[must_use]
    pub fn trade(&self) -> Option<&TradeIdea> {
        match self {
            Self::Trade(idea) => Some(idea),
            Self::Observe { .. } => None,
        }
    }
}

/// Builds the structure for `thesis` from `chain`, sized against `notional_value`.
///
/// # Errors
/// - `Validation` for a non-positive notional
/// - `DataUnavailable` when the chain lacks a suitable expiry or strike
/// - `InconsistentState` when a selected leg carries no delta
pub fn synthesize(
    thesis: &Thesis,
    chain: &OptionChain,
    notional_value: Decimal,
    style: TradeStyle,
    config: &SynthesisConfig,
) -> Result<Synthesis> {
    if notional_value <= Decimal::ZERO {
        return Err(AdvisorError::validation(format!(
            "notional value must be positive, got {notional_value}"
        )));
    }

    let (kind, target_delta) = match plan(thesis, config) {
        Plan::Observe(reason) => {
            info!(symbol = chain.underlying(), "{reason}");
            return Ok(Synthesis::Observe { reason });
        }
        Plan::Build { kind, target_delta } => (kind, target_delta),
    };

    let right = kind.right();
    let spot = chain.underlying_price();
    let as_of = chain.as_of();

    let expiry = select_expiry(
        chain,
        right,
        as_of,
        config.target_days_to_expiry,
        config.min_days_to_expiry,
    )?;
    let target = target_strike(spot, right, config.moneyness_offset(style));
    let long_quote = select_strike(chain, right, expiry, target, spot * config.max_strike_deviation)?;

    let mut legs = vec![leg_from_quote(long_quote, LegSide::Buy)];
    if let Some(target_delta) = target_delta {
        let short_quote = select_short_leg(chain, long_quote, target_delta)?;
        legs.push(leg_from_quote(short_quote, LegSide::Sell));
    }

    let quantity = structure_count(notional_value, spot, config.contract_multiplier)?;
    let days_to_expiry = (expiry - as_of).num_days();

    let option_strategy = OptionStrategy {
        symbol: chain.underlying().to_string(),
        kind,
        style,
        baseline: Baseline {
            quantity,
            notional_value,
            underlying_price: spot,
            strikes: legs.iter().map(|leg| leg.strike).collect(),
            days_to_expiry,
            strike_step: chain.strike_step(right, expiry),
        },
        legs,
        quantity,
        multiplier: config.contract_multiplier,
        notional_value,
        underlying_price: spot,
        as_of,
    };

    let stock_strategy = delta_one_hedge(&option_strategy, spot, config)?;
    let metrics = analyze(&option_strategy, config)?;
    let rationale = rationale(thesis, &option_strategy, &stock_strategy);

    info!(
        symbol = %option_strategy.symbol,
        kind = %kind,
        style = %style,
        quantity,
        %expiry,
        portfolio_delta = %stock_strategy.portfolio_delta,
        "Synthesized strategy"
    );
    debug!(legs = ?option_strategy.legs, "Selected legs");

    Ok(Synthesis::Trade(Box::new(TradeIdea {
        option_strategy,
        stock_strategy,
        metrics,
        rationale,
    })))
}

/// `max(1, floor(notional / (spot × multiplier)))`
fn structure_count(notional_value: Decimal, spot: Decimal, multiplier: Decimal) -> Result<u32> {
    let per_contract = spot * multiplier;
    if per_contract <= Decimal::ZERO {
        return Err(AdvisorError::validation("contract value must be positive"));
    }
    (notional_value / per_contract)
        .floor()
        .to_u32()
        .map(|q| q.max(1))
        .ok_or_else(|| AdvisorError::validation(format!("notional {notional_value} is too large")))
}

fn rationale(thesis: &Thesis, option: &OptionStrategy, stock: &StockStrategy) -> String {
    let legs = option
        .legs
        .iter()
        .map(|leg| leg.label())
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = format!(
        "{} {} thesis (score {:.1}) -> {} x{} [{}]; Delta-One equivalent: {} {} shares (delta {})",
        thesis.strength,
        thesis.direction,
        thesis.score,
        option.kind,
        option.quantity,
        legs,
        stock.side,
        stock.shares,
        stock.portfolio_delta.round_dp(4)
    );
    if let Some(target) = thesis.target_price {
        text.push_str(&format!("; target {target}"));
    }
    if let Some(stop) = thesis.stop_price {
        text.push_str(&format!("; stop {stop}"));
    }
    text
}
