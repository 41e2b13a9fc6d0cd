use clap::{Parser, Subcommand};

mod commands;
mod offline;
mod store;

use commands::{EvaluateArgs, HistoryArgs, RecommendArgs};

#[derive(Parser)]
#[command(name = "delta-one")]
#[command(about = "Hedged option / Delta-One stock strategy advisor", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Advisor.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a personalized strategy from a signal and a market capture
    Recommend(RecommendArgs),
    /// Evaluate a saved strategy against a market capture
    Evaluate(EvaluateArgs),
    /// List a user's saved strategies
    History(HistoryArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = delta_one_core::ConfigLoader::load_from(&cli.config)?;

    match cli.command {
        Commands::Recommend(args) => commands::run_recommend(args, config).await?,
        Commands::Evaluate(args) => commands::run_evaluate(args, config).await?,
        Commands::History(args) => commands::run_history(args, config).await?,
    }

    Ok(())
}
