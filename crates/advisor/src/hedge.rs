//! Delta-One sizing: the stock position equivalent to an option structure.
//!
//! `stock_notional = notional × |portfolio_delta|`, margin is a fixed
//! fraction of that, and shares are whole units at the current price.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use delta_one_core::{AdvisorError, HedgeSide, OptionStrategy, Result, StockStrategy, SynthesisConfig};

/// Sizes the stock equivalent of `strategy` at `current_price`.
///
/// # Errors
/// Returns `InconsistentState` if any leg lacks a delta, and `Validation` for
/// a non-positive price.
pub fn delta_one_hedge(
    strategy: &OptionStrategy,
    current_price: Decimal,
    config: &SynthesisConfig,
) -> Result<StockStrategy> {
    let portfolio_delta = strategy.portfolio_delta()?;
    size_hedge(
        &strategy.symbol,
        strategy.notional_value,
        portfolio_delta,
        current_price,
        config,
    )
}

/// Sizes a stock position for a given portfolio delta.
///
/// Zero delta yields an explicit `HedgeSide::None` position with no shares.
///
/// # Errors
/// Returns `Validation` for a non-positive price or negative notional.
pub fn size_hedge(
    symbol: &str,
    notional_value: Decimal,
    portfolio_delta: Decimal,
    current_price: Decimal,
    config: &SynthesisConfig,
) -> Result<StockStrategy> {
    if current_price <= Decimal::ZERO {
        return Err(AdvisorError::validation(format!(
            "{symbol}: current price must be positive to size a hedge"
        )));
    }
    if notional_value < Decimal::ZERO {
        return Err(AdvisorError::validation(format!("{symbol}: notional must not be negative")));
    }

    let side = HedgeSide::from_delta(portfolio_delta);
    let stock_notional = notional_value * portfolio_delta.abs();
    let margin = stock_notional * config.margin_rate;
    let shares = (stock_notional / current_price)
        .floor()
        .to_u64()
        .ok_or_else(|| AdvisorError::inconsistent(format!("{symbol}: share count out of range")))?;

    let (stop_loss, take_profit) = match side {
        HedgeSide::Long => (
            Some(current_price * (Decimal::ONE - config.stop_loss_pct)),
            Some(current_price * (Decimal::ONE + config.take_profit_pct)),
        ),
        HedgeSide::Short => (
            Some(current_price * (Decimal::ONE + config.stop_loss_pct)),
            Some(current_price * (Decimal::ONE - config.take_profit_pct)),
        ),
        HedgeSide::None => (None, None),
    };

    debug!(
        symbol,
        %portfolio_delta,
        %stock_notional,
        shares,
        side = %side,
        "Sized Delta-One hedge"
    );

    Ok(StockStrategy {
        symbol: symbol.to_string(),
        side,
        stock_notional,
        margin,
        shares,
        entry_price: current_price,
        portfolio_delta,
        notional_value,
        stop_loss,
        take_profit,
    })
}
