//! CLI commands for the Delta-One advisor.

pub mod evaluate;
pub mod history;
pub mod recommend;

pub use evaluate::{run_evaluate, EvaluateArgs};
pub use history::{run_history, HistoryArgs};
pub use recommend::{run_recommend, RecommendArgs};

use anyhow::Result;
use serde::Serialize;

/// Prints a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
