// =============================================================================
// Crossover Engine — Replay Entry Point
// =============================================================================
//
//   crossover-engine [config.json] <history.csv>...
//
// Each CSV file is one symbol (the upper-cased file stem).  Every symbol gets
// its own engine on its own task; signals are written to stdout as JSON
// lines and a per-symbol summary is logged at the end.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crossover_engine::crossover::{CrossoverEngine, MacdDetector};
use crossover_engine::market_data::{
    feed_stream, load_history, render_timestamp, spawn_replay, FeedEvent, SymbolFeed,
};
use crossover_engine::market_data::feed::FEED_CHANNEL_CAPACITY;
use crossover_engine::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let config_path = match args.first() {
        Some(p) if p.extension().is_some_and(|e| e == "json") => Some(args.remove(0)),
        _ => std::env::var("CROSSOVER_CONFIG").ok().map(PathBuf::from),
    };

    let mut config = match config_path {
        Some(path) => RuntimeConfig::load(&path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            RuntimeConfig::default()
        }),
        None => RuntimeConfig::default(),
    };
    config.apply_env_overrides();
    config
        .engine
        .validate()
        .context("invalid engine configuration")?;

    if args.is_empty() {
        bail!("usage: crossover-engine [config.json] <history.csv>...");
    }

    info!(
        short = %format!("{}({})", config.engine.short_kind, config.engine.short_window),
        long = %format!("{}({})", config.engine.long_kind, config.engine.long_window),
        seed = %config.engine.ema_seed_policy,
        files = args.len(),
        "Crossover replay starting"
    );

    // ── 2. Spawn one feed per symbol ─────────────────────────────────────
    let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
    let mut handles = Vec::new();

    for path in &args {
        let symbol = symbol_for(path);
        if !config.symbols.is_empty() && !config.symbols.contains(&symbol) {
            info!(symbol = %symbol, "Skipping symbol not in configured list");
            continue;
        }

        let points = match load_history(path) {
            Ok(points) => points,
            Err(e) => {
                error!(symbol = %symbol, error = %format!("{e:#}"), "Failed to load history");
                continue;
            }
        };

        let engine = CrossoverEngine::new(config.engine.clone())?;
        let mut feed = SymbolFeed::new(symbol.clone(), engine)
            .with_periods_per_year(config.periods_per_year);
        if let Some(macd) = &config.macd {
            feed = feed.with_macd(MacdDetector::new(macd, config.engine.ema_seed_policy)?);
        }

        handles.push((symbol, spawn_replay(feed, points, tx.clone())));
    }
    drop(tx);

    // ── 3. Stream events to stdout ───────────────────────────────────────
    let mut events = Box::pin(feed_stream(rx));
    while let Some(event) = events.next().await {
        let line = match &event {
            FeedEvent::Signal { symbol, signal } => json!({
                "type": "signal",
                "symbol": symbol,
                "time": render_timestamp(signal.timestamp),
                "signal": signal,
            }),
            FeedEvent::Macd { symbol, event } => json!({
                "type": "macd",
                "symbol": symbol,
                "time": render_timestamp(event.timestamp),
                "event": event,
            }),
            FeedEvent::Rejected {
                symbol,
                point,
                error,
            } => json!({
                "type": "rejected",
                "symbol": symbol,
                "point": point,
                "error": error.to_string(),
            }),
        };
        println!("{line}");
    }

    // ── 4. Summaries ─────────────────────────────────────────────────────
    for (symbol, handle) in handles {
        match handle.await {
            Ok(Ok(summary)) => {
                let r = &summary.report;
                info!(
                    symbol = %symbol,
                    bars = r.bars,
                    golden_crosses = r.golden_crosses,
                    death_crosses = r.death_crosses,
                    strategy_return = %format!("{:.2}%", r.total_return * 100.0),
                    buy_hold_return = %format!("{:.2}%", r.buy_hold_return * 100.0),
                    win_rate = %format!("{:.2}%", r.win_rate * 100.0),
                    strategy_sharpe = %format!("{:.2}", r.strategy_sharpe),
                    rejected = summary.rejected,
                    "Replay summary"
                );
                if !summary.warm {
                    warn!(symbol = %symbol, "History too short: engine never warmed up");
                }
            }
            Ok(Err(e)) => error!(symbol = %symbol, error = %e, "Feed failed"),
            Err(e) => error!(symbol = %symbol, error = %e, "Feed task panicked"),
        }
    }

    Ok(())
}

fn symbol_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| path.display().to_string())
}
