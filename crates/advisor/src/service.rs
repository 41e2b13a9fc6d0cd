//! Advisor service wiring the pure components to their collaborators.
//!
//! Every collaborator call is a single fetch bounded by
//! `service.fetch_timeout_ms`. Failures surface immediately; retrying is the
//! caller's business.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use delta_one_core::{
    AdvisorConfig, AdvisorError, MarketDataProvider, MarketSnapshot, OptionChain, OptionStrategy, ProfileStore,
    RawSignal, SavedStrategy, StockStrategy, StrategyStore, Thesis, TradeStyle, UserProfile,
};

use crate::evaluator::{evaluate, EvaluationResult};
use crate::hedge::delta_one_hedge;
use crate::metrics::{analyze, StrategyMetrics};
use crate::optimizer::{optimize, Adjustment, Optimization};
use crate::reprice::reprice;
use crate::synthesizer::{plan, synthesize, Plan, Synthesis, TradeIdea};
use crate::thesis::ThesisInterpreter;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    /// The profile or strategy store failed.
    #[error("{operation} failed: {message}")]
    Store { operation: &'static str, message: String },
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub username: String,
    pub symbol: String,
    pub signal: RawSignal,
    pub notional_value: Decimal,
    /// Overrides the style implied by the user's investment style.
    #[serde(default)]
    pub style: Option<TradeStyle>,
}

/// Synthesized, personalized and (when needed) repriced trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedTrade {
    pub option_strategy: OptionStrategy,
    pub stock_strategy: StockStrategy,
    pub metrics: StrategyMetrics,
    /// Structure as synthesized, before the profile was applied
    pub synthesized: OptionStrategy,
    pub adjustments: Vec<Adjustment>,
    pub notes: Vec<String>,
    pub rationale: String,
    pub repriced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Observe { reason: String },
    Trade(Box<PersonalizedTrade>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub thesis: Thesis,
    pub outcome: Outcome,
}

pub struct AdvisorService<M, P, S> {
    market: M,
    profiles: P,
    store: S,
    config: AdvisorConfig,
    interpreter: ThesisInterpreter,
}

impl<M, P, S> AdvisorService<M, P, S>
where
    M: MarketDataProvider,
    P: ProfileStore,
    S: StrategyStore,
{
    /// # Errors
    /// Returns `Validation` if the configuration is rejected.
    pub fn new(market: M, profiles: P, store: S, config: AdvisorConfig) -> Result<Self, AdvisorError> {
        config.validate()?;
        let interpreter = ThesisInterpreter::new(&config.thesis)?;
        Ok(Self {
            market,
            profiles,
            store,
            config,
            interpreter,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Interprets, synthesizes, personalizes and reprices a trade idea.
    ///
    /// A neutral (or neutralized) thesis returns `Observe` without touching
    /// market data.
    ///
    /// # Errors
    /// Any `AdvisorError` from the pipeline; a chain fetch failure or timeout
    /// is `DataUnavailable`. Profile store failures are `Store`.
    pub async fn recommend(&self, request: &RecommendRequest) -> ServiceResult<Recommendation> {
        let symbol = request.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(AdvisorError::validation("symbol is required").into());
        }

        let thesis = self.interpreter.interpret_signal(&request.signal)?;
        if let Plan::Observe(reason) = plan(&thesis, &self.config.synthesis) {
            info!(username = %request.username, symbol = %symbol, "{reason}");
            return Ok(Recommendation {
                thesis,
                outcome: Outcome::Observe { reason },
            });
        }

        let (chain, profile) = tokio::join!(
            self.bounded("option chain", self.market.get_option_chain(&symbol)),
            self.bounded("profile", self.profiles.get_profile(&request.username)),
        );
        let chain = chain.map_err(AdvisorError::DataUnavailable)?;
        if !chain.underlying().eq_ignore_ascii_case(&symbol) {
            return Err(AdvisorError::data_unavailable(format!(
                "provider returned a {} chain for {symbol}",
                chain.underlying()
            ))
            .into());
        }
        let profile = profile
            .map_err(|message| ServiceError::Store {
                operation: "get_profile",
                message,
            })?
            .unwrap_or_else(|| {
                warn!(username = %request.username, "No profile on record; using conservative fallbacks");
                UserProfile::default()
            });

        let style = request
            .style
            .or_else(|| profile.investment_style.map(|s| s.trade_style()))
            .unwrap_or(TradeStyle::Balanced);

        let idea = match synthesize(&thesis, &chain, request.notional_value, style, &self.config.synthesis)? {
            Synthesis::Observe { reason } => {
                return Ok(Recommendation {
                    thesis,
                    outcome: Outcome::Observe { reason },
                })
            }
            Synthesis::Trade(idea) => idea,
        };

        let optimization = optimize(&idea.option_strategy, &profile, &self.config.optimizer)?;
        let trade = self.finish(&chain, *idea, optimization)?;

        info!(
            username = %request.username,
            symbol = %symbol,
            kind = %trade.option_strategy.kind,
            quantity = trade.option_strategy.quantity,
            hedge = %trade.stock_strategy.side,
            shares = trade.stock_strategy.shares,
            repriced = trade.repriced,
            "Recommendation ready"
        );

        Ok(Recommendation {
            thesis,
            outcome: Outcome::Trade(Box::new(trade)),
        })
    }

    fn finish(
        &self,
        chain: &OptionChain,
        idea: TradeIdea,
        optimization: Optimization,
    ) -> Result<PersonalizedTrade, AdvisorError> {
        let synthesis = &self.config.synthesis;
        let (option_strategy, stock_strategy, metrics) = if optimization.requires_reprice {
            let repriced = reprice(&optimization.strategy, chain, optimization.tenor, synthesis)?;
            (repriced.strategy, repriced.stock_strategy, repriced.metrics)
        } else {
            let stock = delta_one_hedge(&optimization.strategy, chain.underlying_price(), synthesis)?;
            let metrics = analyze(&optimization.strategy, synthesis)?;
            (optimization.strategy, stock, metrics)
        };

        Ok(PersonalizedTrade {
            option_strategy,
            stock_strategy,
            metrics,
            synthesized: idea.option_strategy,
            adjustments: optimization.adjustments,
            notes: optimization.notes,
            rationale: idea.rationale,
            repriced: optimization.requires_reprice,
        })
    }

    /// Freezes an accepted trade and hands it to the strategy store.
    ///
    /// # Errors
    /// `InconsistentState` if the trade still has unquoted legs; `Store` if
    /// the save fails.
    pub async fn accept(
        &self,
        username: &str,
        trade: &PersonalizedTrade,
        accepted_at: DateTime<Utc>,
    ) -> ServiceResult<SavedStrategy> {
        if username.trim().is_empty() {
            return Err(AdvisorError::validation("username is required").into());
        }
        if !trade.option_strategy.is_fully_quoted() {
            return Err(AdvisorError::inconsistent("cannot accept a strategy with unquoted legs").into());
        }

        let saved = SavedStrategy::accept(
            username,
            trade.option_strategy.clone(),
            trade.stock_strategy.clone(),
            accepted_at,
        );
        let id = self
            .bounded("save strategy", self.store.save(&saved))
            .await
            .map_err(|message| ServiceError::Store {
                operation: "save",
                message,
            })?;

        info!(id = %id, username, symbol = %saved.symbol, "Strategy accepted");
        Ok(saved)
    }

    /// Evaluates a saved strategy against a freshly fetched quote.
    ///
    /// Live option quotes and closes are attached when the provider has them;
    /// their absence only falls back to the delta approximation.
    ///
    /// # Errors
    /// - `Validation` for an unknown id
    /// - `MarketDataUnavailable` when the quote fetch fails or times out
    /// - `Store` when the strategy store fails
    pub async fn evaluate_saved(&self, id: Uuid) -> ServiceResult<EvaluationResult> {
        let saved = self
            .bounded("load strategy", self.store.get(id))
            .await
            .map_err(|message| ServiceError::Store {
                operation: "get",
                message,
            })?
            .ok_or_else(|| AdvisorError::validation(format!("no saved strategy with id {id}")))?;

        let symbol = saved.symbol.as_str();
        let (quote, chain, closes) = tokio::join!(
            self.bounded("quote", self.market.get_quote(symbol)),
            self.bounded("option chain", self.market.get_option_chain(symbol)),
            self.bounded("history", self.market.get_history(symbol, self.config.service.history_days)),
        );
        let quote = quote.map_err(AdvisorError::MarketDataUnavailable)?;

        let mut snapshot = MarketSnapshot::from_quote(&quote);
        match chain {
            Ok(chain) if chain.underlying().eq_ignore_ascii_case(symbol) => {
                snapshot = snapshot.with_option_quotes(chain.quotes().to_vec());
            }
            Ok(chain) => warn!(symbol, got = chain.underlying(), "Ignoring chain for another symbol"),
            Err(e) => warn!(symbol, error = %e, "No live option quotes; valuing legs by delta"),
        }
        match closes {
            Ok(closes) => snapshot = snapshot.with_closes(closes),
            Err(e) => warn!(symbol, error = %e, "History unavailable"),
        }

        Ok(evaluate(&saved, &snapshot, &self.config.evaluation)?)
    }

    /// Saved strategies for a user, as returned by the store.
    ///
    /// # Errors
    /// `Store` if the listing fails.
    pub async fn history(&self, username: &str) -> ServiceResult<Vec<SavedStrategy>> {
        self.bounded("list strategies", self.store.list(username))
            .await
            .map_err(|message| ServiceError::Store {
                operation: "list",
                message,
            })
    }

    /// Runs one collaborator call under the configured timeout.
    async fn bounded<T, F>(&self, what: &str, call: F) -> Result<T, String>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let limit = Duration::from_millis(self.config.service.fetch_timeout_ms);
        match timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(format!("{what}: {e:#}")),
            Err(_) => Err(format!("{what}: timed out after {}ms", limit.as_millis())),
        }
    }
}
