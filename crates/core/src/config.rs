use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::option::TradeStyle;

/// Explicit configuration passed to every advisor component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub thesis: ThesisConfig,
    pub synthesis: SynthesisConfig,
    pub optimizer: OptimizerConfig,
    pub evaluation: EvaluationConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThesisConfig {
    /// Directional theses scoring below this are neutralized by caution language.
    pub caution_score_cutoff: f64,
    pub caution_tokens: Vec<String>,
}

impl Default for ThesisConfig {
    fn default() -> Self {
        let tokens = [
            "not", "don't", "do not", "wait", "waiting", "small position", "avoid",
            "cautious", "caution", "careful", "hold off", "sidelines", "observe", "watch and see",
            "不是", "观望", "谨慎", "小仓位", "等待", "不建议", "避免",
        ];
        Self {
            caution_score_cutoff: 70.0,
            caution_tokens: tokens.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Minimum score for a strong thesis to get a single-leg structure.
    pub strong_score_threshold: f64,
    /// Margin posted on the stock hedge, as a fraction of its notional.
    pub margin_rate: Decimal,
    /// Shares per contract.
    pub contract_multiplier: Decimal,
    /// Moneyness offsets as fractions of spot; positive is out-of-the-money.
    pub aggressive_offset: Decimal,
    pub balanced_offset: Decimal,
    pub conservative_offset: Decimal,
    /// Target |portfolio delta| for spreads.
    pub moderate_target_delta: Decimal,
    pub weak_target_delta: Decimal,
    pub target_days_to_expiry: i64,
    pub min_days_to_expiry: i64,
    /// Furthest a listed strike may sit from its target, as a fraction of spot.
    pub max_strike_deviation: Decimal,
    /// Stock hedge exit levels as fractions of entry price.
    pub stop_loss_pct: Decimal,
    pub take_profit_pct: Decimal,
    /// Payoff curve spans spot × (1 ± range).
    pub payoff_range_pct: Decimal,
    pub payoff_points: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            strong_score_threshold: 70.0,
            margin_rate: Decimal::new(10, 2),
            contract_multiplier: Decimal::from(100),
            aggressive_offset: Decimal::new(5, 2),
            balanced_offset: Decimal::ZERO,
            conservative_offset: Decimal::new(-3, 2),
            moderate_target_delta: Decimal::new(30, 2),
            weak_target_delta: Decimal::new(15, 2),
            target_days_to_expiry: 45,
            min_days_to_expiry: 7,
            max_strike_deviation: Decimal::new(5, 2),
            stop_loss_pct: Decimal::new(10, 2),
            take_profit_pct: Decimal::new(20, 2),
            payoff_range_pct: Decimal::new(30, 2),
            payoff_points: 101,
        }
    }
}

impl SynthesisConfig {
    #[must_use]
    pub fn moneyness_offset(&self, style: TradeStyle) -> Decimal {
        match style {
            TradeStyle::Aggressive => self.aggressive_offset,
            TradeStyle::Balanced => self.balanced_offset,
            TradeStyle::Conservative => self.conservative_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub conservative_quantity_factor: Decimal,
    pub aggressive_quantity_factor: Decimal,
    pub short_horizon_max_days: i64,
    pub long_horizon_min_days: i64,
    pub low_confidence: f64,
    pub high_confidence: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            conservative_quantity_factor: Decimal::new(5, 1),
            aggressive_quantity_factor: Decimal::new(15, 1),
            short_horizon_max_days: 30,
            long_horizon_min_days: 60,
            low_confidence: 0.5,
            high_confidence: 0.8,
        }
    }
}

/// Return classification bands, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub outperform_threshold_pct: Decimal,
    pub underperform_threshold_pct: Decimal,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            outperform_threshold_pct: Decimal::from(10),
            underperform_threshold_pct: Decimal::from(-10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bound on each collaborator fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    pub history_days: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 5_000,
            history_days: 90,
        }
    }
}

impl AdvisorConfig {
    /// Rejects configurations that would break the advisor's invariants.
    ///
    /// # Errors
    /// Returns `Validation` describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        let s = &self.synthesis;
        if !(0.0..=100.0).contains(&self.thesis.caution_score_cutoff) {
            return Err(AdvisorError::validation("thesis.caution_score_cutoff must be in [0, 100]"));
        }
        if self.thesis.caution_tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(AdvisorError::validation("thesis.caution_tokens must not contain blanks"));
        }
        if s.margin_rate <= Decimal::ZERO || s.margin_rate > Decimal::ONE {
            return Err(AdvisorError::validation("synthesis.margin_rate must be in (0, 1]"));
        }
        if s.contract_multiplier <= Decimal::ZERO {
            return Err(AdvisorError::validation("synthesis.contract_multiplier must be positive"));
        }
        for (name, target) in [
            ("moderate_target_delta", s.moderate_target_delta),
            ("weak_target_delta", s.weak_target_delta),
        ] {
            if target <= Decimal::ZERO || target > Decimal::ONE {
                return Err(AdvisorError::validation(format!("synthesis.{name} must be in (0, 1]")));
            }
        }
        if s.min_days_to_expiry < 0 || s.target_days_to_expiry < s.min_days_to_expiry {
            return Err(AdvisorError::validation(
                "synthesis.target_days_to_expiry must be >= min_days_to_expiry >= 0",
            ));
        }
        if s.max_strike_deviation <= Decimal::ZERO {
            return Err(AdvisorError::validation("synthesis.max_strike_deviation must be positive"));
        }
        if s.payoff_points < 2 || s.payoff_range_pct <= Decimal::ZERO || s.payoff_range_pct >= Decimal::ONE {
            return Err(AdvisorError::validation(
                "synthesis.payoff_points must be >= 2 and payoff_range_pct in (0, 1)",
            ));
        }
        let o = &self.optimizer;
        if o.conservative_quantity_factor <= Decimal::ZERO || o.aggressive_quantity_factor <= Decimal::ZERO {
            return Err(AdvisorError::validation("optimizer quantity factors must be positive"));
        }
        if o.short_horizon_max_days <= 0 || o.long_horizon_min_days < o.short_horizon_max_days {
            return Err(AdvisorError::validation(
                "optimizer.long_horizon_min_days must be >= short_horizon_max_days > 0",
            ));
        }
        let e = &self.evaluation;
        if e.outperform_threshold_pct <= Decimal::ZERO || e.underperform_threshold_pct >= Decimal::ZERO {
            return Err(AdvisorError::validation(
                "evaluation bands must satisfy underperform < 0 < outperform",
            ));
        }
        if self.service.fetch_timeout_ms == 0 {
            return Err(AdvisorError::validation("service.fetch_timeout_ms must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_valid() {
        AdvisorConfig::default().validate().unwrap();
    }

    #[test]
    fn default_offsets_by_style() {
        let s = SynthesisConfig::default();
        assert_eq!(s.moneyness_offset(TradeStyle::Aggressive), dec!(0.05));
        assert_eq!(s.moneyness_offset(TradeStyle::Balanced), dec!(0));
        assert_eq!(s.moneyness_offset(TradeStyle::Conservative), dec!(-0.03));
        assert_eq!(s.margin_rate, dec!(0.10));
    }

    #[test]
    fn inverted_bands_rejected() {
        let mut config = AdvisorConfig::default();
        config.evaluation.underperform_threshold_pct = dec!(5);
        assert!(matches!(config.validate(), Err(AdvisorError::Validation(_))));
    }
}
