//! Core types, errors, configuration and collaborator traits for the
//! Delta-One strategy advisor.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod market;
pub mod option;
pub mod profile;
pub mod saved;
pub mod thesis;
pub mod traits;

pub use config::{
    AdvisorConfig, EvaluationConfig, OptimizerConfig, ServiceConfig, SynthesisConfig, ThesisConfig,
};
pub use config_loader::ConfigLoader;
pub use error::{AdvisorError, Result};
pub use market::{MarketSnapshot, OptionChain, OptionQuote, Quote};
pub use option::{
    Baseline, HedgeSide, LegSide, OptionLeg, OptionRight, OptionStrategy, StockStrategy,
    StrategyKind, TradeStyle,
};
pub use profile::{InvestmentStyle, OptionExperience, RiskTolerance, TimeHorizon, UserProfile};
pub use saved::SavedStrategy;
pub use thesis::{Direction, RawSignal, Strength, Thesis};
pub use traits::{MarketDataProvider, ProfileStore, StrategyStore};
