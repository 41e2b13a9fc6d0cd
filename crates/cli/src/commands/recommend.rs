//! Recommend command.
//!
//! Runs interpretation, synthesis, personalization and repricing over a
//! captured market file, optionally saving the result as accepted.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use delta_one_advisor::{AdvisorService, Outcome, Recommendation};
use delta_one_core::{AdvisorConfig, SavedStrategy};

use super::print_json;
use crate::offline::{read_json, RecommendInput, StaticMarketData, StaticProfiles};
use crate::store::JsonFileStore;

/// Arguments for the recommend command.
#[derive(Args, Debug, Clone)]
pub struct RecommendArgs {
    /// JSON file holding the request, an optional profile and the market capture
    #[arg(short, long)]
    pub input: PathBuf,

    /// Save the trade as accepted
    #[arg(long)]
    pub accept: bool,

    /// Acceptance time (RFC 3339); defaults to when the market capture was taken
    #[arg(long, requires = "accept")]
    pub accepted_at: Option<DateTime<Utc>>,

    /// Directory of saved strategies
    #[arg(long, env = "DELTA_ONE_STORE", default_value = "data/strategies")]
    pub store: PathBuf,
}

#[derive(Serialize)]
struct RecommendOutput {
    recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    accepted: Option<SavedStrategy>,
}

/// Runs the recommend command.
///
/// # Errors
/// Returns an error if the input is unreadable or the advisor rejects it.
pub async fn run_recommend(args: RecommendArgs, config: AdvisorConfig) -> Result<()> {
    let input: RecommendInput = read_json(&args.input)?;
    let username = input.request.username.clone();
    let accepted_at = args
        .accepted_at
        .or_else(|| input.market.captured_at())
        .unwrap_or_else(Utc::now);

    let service = AdvisorService::new(
        StaticMarketData::new(input.market),
        StaticProfiles::single(&username, input.profile),
        JsonFileStore::new(&args.store),
        config,
    )?;

    let recommendation = service.recommend(&input.request).await?;

    let accepted = match (&recommendation.outcome, args.accept) {
        (Outcome::Trade(trade), true) => Some(service.accept(&username, trade, accepted_at).await?),
        (Outcome::Observe { .. }, true) => {
            tracing::warn!("Nothing to accept: the advisor recommends observing");
            None
        }
        (_, false) => None,
    };

    print_json(&RecommendOutput {
        recommendation,
        accepted,
    })
}
