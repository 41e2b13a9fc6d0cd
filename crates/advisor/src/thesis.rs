//! Thesis interpretation with consistency correction of declared signals.
//!
//! A declared bullish/bearish signal whose own narrative hedges ("wait",
//! "small position", "avoid", ...) and whose score is below the cutoff is
//! downgraded to neutral/weak before anything downstream can act on it.

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use tracing::info;

use delta_one_core::{AdvisorError, Direction, RawSignal, Result, Strength, Thesis, ThesisConfig};

/// Turns raw directional signals into consistency-corrected theses.
#[derive(Debug, Clone)]
pub struct ThesisInterpreter {
    cutoff: f64,
    caution: Regex,
}

impl ThesisInterpreter {
    /// Compiles the caution vocabulary.
    ///
    /// ASCII tokens match on word boundaries; CJK tokens match anywhere.
    ///
    /// # Errors
    /// Returns `Validation` if the vocabulary is empty or cannot be compiled.
    pub fn new(config: &ThesisConfig) -> Result<Self> {
        let mut tokens: Vec<&str> = config
            .caution_tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(AdvisorError::validation("caution vocabulary is empty"));
        }
        // Longest first so multi-word phrases win over their prefixes.
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternatives: Vec<String> = tokens
            .iter()
            .map(|token| {
                let escaped = token
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+");
                if token.is_ascii() {
                    format!(r"\b{escaped}\b")
                } else {
                    escaped
                }
            })
            .collect();

        let caution = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| AdvisorError::validation(format!("caution vocabulary: {e}")))?;

        Ok(Self {
            cutoff: config.caution_score_cutoff,
            caution,
        })
    }

    /// Interprets a declared signal.
    ///
    /// # Errors
    /// Returns `Validation` if the score or narrative is missing or malformed.
    pub fn interpret(
        &self,
        score: Option<f64>,
        declared_direction: Direction,
        declared_strength: Strength,
        narrative: Option<&str>,
    ) -> Result<Thesis> {
        self.interpret_signal(&RawSignal {
            score,
            direction: declared_direction,
            strength: declared_strength,
            narrative: narrative.map(str::to_string),
            target_price: None,
            stop_price: None,
        })
    }

    /// Interprets a declared signal carrying optional target/stop levels.
    ///
    /// # Errors
    /// Returns `Validation` if the score or narrative is missing or malformed,
    /// or if a price level is not positive.
    pub fn interpret_signal(&self, signal: &RawSignal) -> Result<Thesis> {
        let score = signal
            .score
            .ok_or_else(|| AdvisorError::validation("thesis score is missing"))?;
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(AdvisorError::validation(format!(
                "thesis score must be in [0, 100], got {score}"
            )));
        }

        let narrative = signal
            .narrative
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AdvisorError::validation("thesis narrative is missing"))?;

        for (name, level) in [("target", signal.target_price), ("stop", signal.stop_price)] {
            if level.is_some_and(|p| p <= Decimal::ZERO) {
                return Err(AdvisorError::validation(format!("{name} price must be positive")));
            }
        }

        let cautions = self.caution_tokens_in(narrative);
        let contradicts = !cautions.is_empty()
            && signal.direction.is_directional()
            && score < self.cutoff;

        let (direction, strength) = if contradicts {
            info!(
                declared = %signal.direction,
                strength = %signal.strength,
                score,
                ?cautions,
                "Hedged narrative contradicts declared direction, neutralizing"
            );
            (Direction::Neutral, Strength::Weak)
        } else {
            (signal.direction, signal.strength)
        };

        Ok(Thesis {
            direction,
            strength,
            score,
            rationale: narrative.to_string(),
            target_price: signal.target_price,
            stop_price: signal.stop_price,
            corrected: contradicts,
        })
    }

    /// Caution tokens found in a narrative, lowercased, in order of appearance.
    #[must_use]
    pub fn caution_tokens_in(&self, narrative: &str) -> Vec<String> {
        self.caution
            .find_iter(narrative)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> ThesisInterpreter {
        ThesisInterpreter::new(&ThesisConfig::default()).unwrap()
    }

    #[test]
    fn caution_below_cutoff_neutralizes() {
        let thesis = interpreter()
            .interpret(
                Some(65.0),
                Direction::Bullish,
                Strength::Moderate,
                Some("Momentum is building but I would wait for a pullback."),
            )
            .unwrap();
        assert_eq!(thesis.direction, Direction::Neutral);
        assert_eq!(thesis.strength, Strength::Weak);
        assert!(thesis.corrected);
    }

    #[test]
    fn bearish_with_cjk_caution_neutralizes() {
        let thesis = interpreter()
            .interpret(Some(40.0), Direction::Bearish, Strength::Strong, Some("趋势偏弱，建议观望"))
            .unwrap();
        assert_eq!(thesis.direction, Direction::Neutral);
        assert_eq!(thesis.strength, Strength::Weak);
    }

    #[test]
    fn high_score_keeps_declared_values() {
        let thesis = interpreter()
            .interpret(Some(82.0), Direction::Bullish, Strength::Strong, Some("Avoid chasing, but trend is strong"))
            .unwrap();
        assert_eq!(thesis.direction, Direction::Bullish);
        assert_eq!(thesis.strength, Strength::Strong);
        assert!(!thesis.corrected);
    }

    #[test]
    fn score_at_cutoff_is_not_corrected() {
        let thesis = interpreter()
            .interpret(Some(70.0), Direction::Bearish, Strength::Moderate, Some("wait for a bounce to short"))
            .unwrap();
        assert_eq!(thesis.direction, Direction::Bearish);
    }

    #[test]
    fn clean_narrative_passes_through() {
        let thesis = interpreter()
            .interpret(Some(55.0), Direction::Bullish, Strength::Moderate, Some("Earnings beat, guidance raised"))
            .unwrap();
        assert_eq!(thesis.direction, Direction::Bullish);
        assert_eq!(thesis.strength, Strength::Moderate);
    }

    #[test]
    fn word_boundaries_respected() {
        let i = interpreter();
        assert!(i.caution_tokens_in("Nothing cannot stop this; notable strength").is_empty());
        assert_eq!(i.caution_tokens_in("Only a SMALL   position here"), vec!["small   position"]);
        assert_eq!(i.caution_tokens_in("do not chase"), vec!["do not"]);
    }

    #[test]
    fn neutral_declared_is_untouched() {
        let thesis = interpreter()
            .interpret(Some(30.0), Direction::Neutral, Strength::Moderate, Some("avoid for now"))
            .unwrap();
        assert_eq!(thesis.direction, Direction::Neutral);
        assert_eq!(thesis.strength, Strength::Moderate);
        assert!(!thesis.corrected);
    }

    #[test]
    fn missing_inputs_fail() {
        let i = interpreter();
        assert!(matches!(
            i.interpret(None, Direction::Bullish, Strength::Strong, Some("rally")),
            Err(AdvisorError::Validation(_))
        ));
        assert!(matches!(
            i.interpret(Some(50.0), Direction::Bullish, Strength::Strong, None),
            Err(AdvisorError::Validation(_))
        ));
        assert!(matches!(
            i.interpret(Some(50.0), Direction::Bullish, Strength::Strong, Some("   ")),
            Err(AdvisorError::Validation(_))
        ));
        assert!(i.interpret(Some(f64::NAN), Direction::Bullish, Strength::Strong, Some("x")).is_err());
        assert!(i.interpret(Some(101.0), Direction::Bullish, Strength::Strong, Some("x")).is_err());
    }

    #[test]
    fn levels_carried_and_validated() {
        let i = interpreter();
        let mut signal = RawSignal {
            score: Some(75.0),
            direction: Direction::Bullish,
            strength: Strength::Strong,
            narrative: Some("Breakout confirmed".to_string()),
            target_price: Some(Decimal::from(180)),
            stop_price: Some(Decimal::from(140)),
        };
        let thesis = i.interpret_signal(&signal).unwrap();
        assert_eq!(thesis.target_price, Some(Decimal::from(180)));

        signal.stop_price = Some(Decimal::ZERO);
        assert!(i.interpret_signal(&signal).is_err());
    }

    /// Every directional, sub-cutoff signal containing any default token is neutralized.
    #[test]
    fn every_default_token_triggers_correction() {
        let config = ThesisConfig::default();
        let i = ThesisInterpreter::new(&config).unwrap();
        for token in &config.caution_tokens {
            for direction in [Direction::Bullish, Direction::Bearish] {
                for score in [0.0, 35.5, 69.99] {
                    let narrative = format!("Setup looks fine; {token} until confirmation.");
                    let thesis = i
                        .interpret(Some(score), direction, Strength::Strong, Some(&narrative))
                        .unwrap();
                    assert_eq!(thesis.direction, Direction::Neutral, "token {token}");
                    assert_eq!(thesis.strength, Strength::Weak, "token {token}");
                }
            }
        }
    }
}
