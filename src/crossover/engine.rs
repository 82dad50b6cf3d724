// =============================================================================
// CrossoverEngine — validated ingestion around the detector
// =============================================================================
//
// The engine is the only entry point that accepts raw price points.  It
// rejects, before any tracker is touched:
//   - non-finite prices (and non-positive ones unless disabled in config)
//   - timestamps that are not strictly after the last accepted one
// A rejected point leaves every piece of state exactly as it was, since an
// average cannot later forget a corrupting value.
//
// Single writer: `process` takes `&mut self`.  Run one engine per symbol and
// serialise producers in front of it.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::indicators::MovingAverageTracker;
use crate::runtime_config::EngineConfig;
use crate::types::{PricePoint, Signal, TrendSign, WarmupStatus};

use super::detector::CrossoverDetector;
use super::sign::SignTracker;
use super::stream::SignalStream;

/// Serialisable copy of everything an engine needs to resume a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub config: EngineConfig,
    pub short: MovingAverageTracker,
    pub long: MovingAverageTracker,
    pub previous_sign: TrendSign,
    pub last_reading: Option<(f64, f64)>,
    pub last_timestamp: Option<i64>,
    pub signals_emitted: u64,
}

#[derive(Debug, Clone)]
pub struct CrossoverEngine {
    config: EngineConfig,
    detector: CrossoverDetector,
    last_timestamp: Option<i64>,
    signals_emitted: u64,
}

impl CrossoverEngine {
    /// Build an engine, failing fast on misconfigured windows.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let short = MovingAverageTracker::new(
            config.short_kind,
            config.short_window,
            config.ema_seed_policy,
        );
        let long = MovingAverageTracker::new(
            config.long_kind,
            config.long_window,
            config.ema_seed_policy,
        );

        Ok(Self {
            config,
            detector: CrossoverDetector::new(short, long),
            last_timestamp: None,
            signals_emitted: 0,
        })
    }

    /// Ingest one price point.
    ///
    /// `Ok(None)` means either "no crossover" (both legs warm) or "not yet
    /// determinable" (a leg is cold); check [`warmup`](Self::warmup) to tell
    /// them apart.
    pub fn process(&mut self, point: PricePoint) -> Result<Option<Signal>> {
        self.validate(&point)?;

        let before = self.warmup();
        self.last_timestamp = Some(point.timestamp);
        let signal = self.detector.process(&point);
        let after = self.warmup();

        if !before.short_warm && after.short_warm {
            debug!(
                window = self.config.short_window,
                kind = %self.config.short_kind,
                observations = after.observations,
                "short leg warm"
            );
        }
        if !before.long_warm && after.long_warm {
            debug!(
                window = self.config.long_window,
                kind = %self.config.long_kind,
                observations = after.observations,
                "long leg warm"
            );
        }

        if let Some(s) = &signal {
            self.signals_emitted += 1;
            info!(
                kind = %s.kind,
                timestamp = s.timestamp,
                price = s.price,
                short = s.short_value,
                long = s.long_value,
                "crossover"
            );
        }

        Ok(signal)
    }

    fn validate(&self, point: &PricePoint) -> Result<()> {
        let bad_price = !point.price.is_finite()
            || (self.config.require_positive_price && point.price <= 0.0);
        if bad_price {
            return Err(EngineError::InvalidPrice {
                timestamp: point.timestamp,
                price: point.price,
            });
        }

        if let Some(previous) = self.last_timestamp {
            if point.timestamp <= previous {
                return Err(EngineError::OutOfOrderInput {
                    previous,
                    received: point.timestamp,
                });
            }
        }

        Ok(())
    }

    /// Lazily turn `input` into a stream of signals.  Rejections surface as
    /// `Err` items; the stream keeps going so the caller decides whether to
    /// drop, reorder or abort.
    pub fn stream<I>(&mut self, input: I) -> SignalStream<'_, I::IntoIter>
    where
        I: IntoIterator<Item = PricePoint>,
    {
        SignalStream::new(self, input.into_iter())
    }

    /// Feed every point, stopping at the first rejection.
    pub fn run<I>(&mut self, input: I) -> Result<Vec<Signal>>
    where
        I: IntoIterator<Item = PricePoint>,
    {
        self.stream(input).collect()
    }

    pub fn warmup(&self) -> WarmupStatus {
        WarmupStatus {
            short_warm: self.detector.short().is_warm(),
            long_warm: self.detector.long().is_warm(),
            observations: self.detector.short().observations(),
        }
    }

    pub fn is_warm(&self) -> bool {
        self.warmup().is_warm()
    }

    pub fn trend(&self) -> TrendSign {
        self.detector.trend()
    }

    pub fn last_reading(&self) -> Option<(f64, f64)> {
        self.detector.last_reading()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp
    }

    pub fn observations(&self) -> u64 {
        self.detector.short().observations()
    }

    pub fn signals_emitted(&self) -> u64 {
        self.signals_emitted
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            config: self.config.clone(),
            short: self.detector.short().clone(),
            long: self.detector.long().clone(),
            previous_sign: self.detector.trend(),
            last_reading: self.detector.last_reading(),
            last_timestamp: self.last_timestamp,
            signals_emitted: self.signals_emitted,
        }
    }

    /// Rebuild an engine from a snapshot.  The trackers must match the
    /// embedded config.
    pub fn restore(snapshot: EngineSnapshot) -> Result<Self> {
        let EngineSnapshot {
            config,
            short,
            long,
            previous_sign,
            last_reading,
            last_timestamp,
            signals_emitted,
        } = snapshot;

        config.validate()?;
        if !short.matches(config.short_kind, config.short_window, config.ema_seed_policy) {
            return Err(EngineError::InconsistentSnapshot { leg: "short" });
        }
        if !long.matches(config.long_kind, config.long_window, config.ema_seed_policy) {
            return Err(EngineError::InconsistentSnapshot { leg: "long" });
        }

        Ok(Self {
            config,
            detector: CrossoverDetector::from_parts(
                short,
                long,
                SignTracker::from_sign(previous_sign),
                last_reading,
            ),
            last_timestamp,
            signals_emitted,
        })
    }
}
