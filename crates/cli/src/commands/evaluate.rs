//! Evaluate command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use delta_one_advisor::AdvisorService;
use delta_one_core::AdvisorConfig;

use super::print_json;
use crate::offline::{read_json, MarketFile, StaticMarketData, StaticProfiles};
use crate::store::JsonFileStore;

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Id of the saved strategy
    #[arg(long)]
    pub id: Uuid,

    /// JSON market capture with at least a quote
    #[arg(short, long)]
    pub market: PathBuf,

    /// Directory of saved strategies
    #[arg(long, env = "DELTA_ONE_STORE", default_value = "data/strategies")]
    pub store: PathBuf,
}

/// Runs the evaluate command.
///
/// # Errors
/// Returns an error if the strategy is unknown or the market file has no usable quote.
pub async fn run_evaluate(args: EvaluateArgs, config: AdvisorConfig) -> Result<()> {
    let market: MarketFile = read_json(&args.market)?;
    let service = AdvisorService::new(
        StaticMarketData::new(market),
        StaticProfiles::default(),
        JsonFileStore::new(&args.store),
        config,
    )?;

    let result = service.evaluate_saved(args.id).await?;
    print_json(&result)
}
