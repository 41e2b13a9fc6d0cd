//! Runs the `delta-one` binary against the demo captures.

use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn delta_one(store: &TempDir, args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_delta-one"))
        .args(["--config", "does-not-exist.toml"])
        .args(args)
        .args(["--store", store.path().to_str().unwrap()])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run delta-one");
    assert!(
        output.status.success(),
        "delta-one {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn recommend_accept_then_history() {
    let store = TempDir::new().unwrap();
    let input = demo("recommend_aapl.json");

    let out = delta_one(&store, &["recommend", "--input", input.to_str().unwrap(), "--accept"]);
    let trade = &out["recommendation"]["outcome"];
    assert_eq!(trade["type"], "trade");
    assert_eq!(trade["option_strategy"]["kind"], "long_call");
    assert_eq!(trade["repriced"], true);
    assert_eq!(trade["stock_strategy"]["side"], "long");

    let id = out["accepted"]["id"].as_str().unwrap().to_string();

    let history = delta_one(&store, &["history", "--username", "alice"]);
    let saved = history.as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["id"], id.as_str());

    let empty = delta_one(&store, &["history", "--username", "bob"]);
    assert!(empty.as_array().unwrap().is_empty());
}

fn pct(value: &Value) -> f64 {
    value.as_str().and_then(|s| s.parse().ok()).expect("percent is a decimal string")
}

#[test]
fn accepted_demo_trade_evaluates_against_later_capture() {
    let store = TempDir::new().unwrap();
    let input = demo("recommend_aapl.json");
    let market = demo("market_aapl.json");

    let out = delta_one(&store, &["recommend", "--input", input.to_str().unwrap(), "--accept"]);
    // Stamped with the capture's day, not the wall clock
    assert_eq!(out["accepted"]["accepted_at"], "2026-11-02T00:00:00Z");
    let id = out["accepted"]["id"].as_str().unwrap().to_string();

    let result = delta_one(&store, &["evaluate", "--id", &id, "--market", market.to_str().unwrap()]);
    assert_eq!(result["strategy_id"], id.as_str());
    assert_eq!(result["current_price"], "158.40");
    // 150C bought at 4.00 now quoted 8.20; stock 150 -> 158.40
    assert!((pct(&result["option_return_pct"]) - 105.0).abs() < 1e-9);
    assert!((pct(&result["stock_return_pct"]) - 5.6).abs() < 1e-9);
    assert_eq!(result["option_performance"], "outperforming");
    assert_eq!(result["relative_performance"], "outperforming");
}
