//! Deterministic hedged-strategy advisor.
//!
//! Pipeline, leaves first:
//! - `thesis`: neutralizes directional signals whose narrative hedges
//! - `synthesizer`: picks a structure from a listed chain and sizes its Delta-One stock equivalent
//! - `optimizer`: fits size, strike and tenor to a user profile
//! - `reprice`: snaps adjusted legs back onto listed quotes
//! - `evaluator`: classifies an accepted strategy's realized returns
//! - `service`: runs the above around the market data, profile and strategy collaborators
//!
//! Everything except `service` is synchronous and free of I/O and clock reads.

pub mod evaluator;
pub mod hedge;
pub mod metrics;
pub mod optimizer;
pub mod reprice;
pub mod selection;
pub mod service;
pub mod synthesizer;
pub mod thesis;

pub use evaluator::{classify, evaluate, EvaluationResult, LegValuation, Performance, ValuationSource};
pub use hedge::{delta_one_hedge, size_hedge};
pub use metrics::{analyze, payoff_at, PayoffPoint, StrategyMetrics};
pub use optimizer::{optimize, Adjustment, Optimization, Parameter, TenorWindow};
pub use reprice::{reprice, Repriced};
pub use service::{
    AdvisorService, Outcome, PersonalizedTrade, RecommendRequest, Recommendation, ServiceError, ServiceResult,
};
pub use synthesizer::{plan, synthesize, Plan, Synthesis, TradeIdea};
pub use thesis::ThesisInterpreter;
