// =============================================================================
// Crossover Engine — streaming moving-average crossover signals
// =============================================================================

//! Feed ordered price points in; get a `Buy` whenever the short average
//! crosses above the long average and a `Sell` whenever it crosses below.
//!
//! ```
//! use crossover_engine::{AverageKind, CrossoverEngine, EngineConfig, PricePoint, SignalKind};
//!
//! let mut engine = CrossoverEngine::new(EngineConfig::new(3, 5, AverageKind::Sma))?;
//! let prices = [10.0, 11.0, 12.0, 13.0, 14.0, 9.0, 8.0, 7.0, 20.0, 21.0];
//! let points = prices.iter().enumerate().map(|(i, &p)| PricePoint::new(i as i64, p));
//! let signals = engine.run(points)?;
//!
//! let kinds: Vec<SignalKind> = signals.iter().map(|s| s.kind).collect();
//! assert_eq!(kinds, [SignalKind::Sell, SignalKind::Buy]);
//! # Ok::<(), crossover_engine::EngineError>(())
//! ```

pub mod crossover;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod performance;
pub mod runtime_config;
pub mod types;

pub use crossover::{CrossoverDetector, CrossoverEngine, EngineSnapshot, SignalStream};
pub use error::EngineError;
pub use runtime_config::{EngineConfig, MacdConfig, RuntimeConfig};
pub use types::{
    AverageKind, EmaSeedPolicy, PricePoint, Signal, SignalKind, TrendSign, WarmupStatus,
};
