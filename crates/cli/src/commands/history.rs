//! History command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use delta_one_advisor::AdvisorService;
use delta_one_core::AdvisorConfig;

use super::print_json;
use crate::offline::{MarketFile, StaticMarketData, StaticProfiles};
use crate::store::JsonFileStore;

/// Arguments for the history command.
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    #[arg(short, long)]
    pub username: String,

    /// Directory of saved strategies
    #[arg(long, env = "DELTA_ONE_STORE", default_value = "data/strategies")]
    pub store: PathBuf,
}

/// Runs the history command.
///
/// # Errors
/// Returns an error if the store directory cannot be read.
pub async fn run_history(args: HistoryArgs, config: AdvisorConfig) -> Result<()> {
    let service = AdvisorService::new(
        StaticMarketData::new(MarketFile::default()),
        StaticProfiles::default(),
        JsonFileStore::new(&args.store),
        config,
    )?;
    let saved = service.history(&args.username).await?;
    tracing::info!(username = %args.username, count = saved.len(), "Loaded strategy history");
    print_json(&saved)
}
