// =============================================================================
// Symbol Feed — async single-consumer driver for one engine
// =============================================================================
//
// Producers push `PricePoint`s into a bounded mpsc queue; one task per symbol
// drains it into that symbol's engine and forwards everything it produces on
// an output channel.  Rejected points are forwarded as `FeedEvent::Rejected`
// rather than skipped, because dropping a point silently would change the
// window contents behind the caller's back.
//
// Symbols never share an engine, so feed tasks run with zero coordination.
// =============================================================================

use anyhow::{Context, Result};
use futures_util::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::crossover::{CrossoverEngine, MacdDetector, MacdEvent};
use crate::error::EngineError;
use crate::performance::PerformanceReport;
use crate::types::{PricePoint, Signal, TrendSign};

/// Queue depth for both the input and output channels of a replay.
pub const FEED_CHANNEL_CAPACITY: usize = 1024;

/// Everything a feed task emits, tagged with its symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Signal {
        symbol: String,
        signal: Signal,
    },
    Macd {
        symbol: String,
        event: MacdEvent,
    },
    Rejected {
        symbol: String,
        point: PricePoint,
        error: EngineError,
    },
}

impl FeedEvent {
    pub fn symbol(&self) -> &str {
        match self {
            Self::Signal { symbol, .. } | Self::Macd { symbol, .. } | Self::Rejected { symbol, .. } => {
                symbol
            }
        }
    }
}

/// End-of-feed summary for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSummary {
    pub symbol: String,
    pub accepted: u64,
    pub rejected: u64,
    pub signals: u64,
    pub warm: bool,
    pub final_trend: TrendSign,
    pub report: PerformanceReport,
}

/// One symbol's engine plus its optional MACD leg.
pub struct SymbolFeed {
    symbol: String,
    engine: CrossoverEngine,
    macd: Option<MacdDetector>,
    periods_per_year: f64,
}

impl SymbolFeed {
    pub fn new(symbol: impl Into<String>, engine: CrossoverEngine) -> Self {
        Self {
            symbol: symbol.into(),
            engine,
            macd: None,
            periods_per_year: 252.0,
        }
    }

    pub fn with_macd(mut self, macd: MacdDetector) -> Self {
        self.macd = Some(macd);
        self
    }

    pub fn with_periods_per_year(mut self, periods: f64) -> Self {
        self.periods_per_year = periods;
        self
    }

    /// Drain `rx` until every producer has hung up.
    ///
    /// Fails only if the output channel is closed while events are pending.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<PricePoint>,
        tx: mpsc::Sender<FeedEvent>,
    ) -> Result<FeedSummary> {
        let mut prices = Vec::new();
        let mut trends = Vec::new();
        let mut signals = Vec::new();
        let mut rejected = 0u64;

        info!(symbol = %self.symbol, "feed started");

        while let Some(point) = rx.recv().await {
            match self.engine.process(point) {
                Ok(signal) => {
                    prices.push(point.price);
                    trends.push(self.engine.trend());

                    if let Some(signal) = signal {
                        signals.push(signal);
                        let event = FeedEvent::Signal {
                            symbol: self.symbol.clone(),
                            signal,
                        };
                        tx.send(event).await.context("feed output channel closed")?;
                    }

                    if let Some(macd) = self.macd.as_mut() {
                        for event in macd.process(&point) {
                            debug!(symbol = %self.symbol, kind = %event.kind, "macd event");
                            let event = FeedEvent::Macd {
                                symbol: self.symbol.clone(),
                                event,
                            };
                            tx.send(event).await.context("feed output channel closed")?;
                        }
                    }
                }
                Err(error) => {
                    rejected += 1;
                    warn!(symbol = %self.symbol, error = %error, "price point rejected");
                    let event = FeedEvent::Rejected {
                        symbol: self.symbol.clone(),
                        point,
                        error,
                    };
                    tx.send(event).await.context("feed output channel closed")?;
                }
            }
        }

        let report =
            PerformanceReport::from_replay(&prices, &trends, &signals, self.periods_per_year);
        let summary = FeedSummary {
            symbol: self.symbol,
            accepted: prices.len() as u64,
            rejected,
            signals: signals.len() as u64,
            warm: self.engine.is_warm(),
            final_trend: self.engine.trend(),
            report,
        };

        info!(
            symbol = %summary.symbol,
            accepted = summary.accepted,
            rejected = summary.rejected,
            signals = summary.signals,
            trend = %summary.final_trend,
            "feed finished"
        );
        Ok(summary)
    }
}

/// Replay a recorded history through `feed` on its own tasks: one producer
/// pushing `points` into a bounded queue, one consumer running the feed.
pub fn spawn_replay(
    feed: SymbolFeed,
    points: Vec<PricePoint>,
    tx: mpsc::Sender<FeedEvent>,
) -> JoinHandle<Result<FeedSummary>> {
    let (point_tx, point_rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        for point in points {
            if point_tx.send(point).await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(feed.run(point_rx, tx))
}

/// Adapt a feed output channel into a `Stream`.
pub fn feed_stream(rx: mpsc::Receiver<FeedEvent>) -> impl Stream<Item = FeedEvent> {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|event| (event, rx)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_config::{EngineConfig, MacdConfig};
    use crate::types::{AverageKind, EmaSeedPolicy, SignalKind};
    use futures_util::StreamExt;

    fn scenario_points() -> Vec<PricePoint> {
        [10.0, 11.0, 12.0, 13.0, 14.0, 9.0, 8.0, 7.0, 20.0, 21.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(i as i64 + 1, p))
            .collect()
    }

    fn feed(symbol: &str) -> SymbolFeed {
        let engine = CrossoverEngine::new(EngineConfig::new(3, 5, AverageKind::Sma)).unwrap();
        SymbolFeed::new(symbol, engine)
    }

    #[tokio::test]
    async fn forwards_signals_in_order() {
        let (tx, rx) = mpsc::channel(16);
        let handle = spawn_replay(feed("NSEI"), scenario_points(), tx);

        let events: Vec<FeedEvent> = feed_stream(rx).collect().await;
        let summary = handle.await.unwrap().unwrap();

        let kinds: Vec<SignalKind> = events
            .iter()
            .filter_map(|e| match e {
                FeedEvent::Signal { signal, .. } => Some(signal.kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![SignalKind::Sell, SignalKind::Buy]);
        assert!(events.iter().all(|e| e.symbol() == "NSEI"));

        assert_eq!(summary.accepted, 10);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.signals, 2);
        assert!(summary.warm);
        assert_eq!(summary.final_trend, TrendSign::Positive);
        assert_eq!(summary.report.golden_crosses, 1);
        assert_eq!(summary.report.bars, 10);
    }

    #[tokio::test]
    async fn rejections_are_forwarded_not_swallowed() {
        let mut points = scenario_points();
        points.insert(3, PricePoint::new(2, 99.0));
        points.insert(5, PricePoint::new(50, f64::NAN));

        let (tx, rx) = mpsc::channel(16);
        let handle = spawn_replay(feed("BAD"), points, tx);
        let events: Vec<FeedEvent> = feed_stream(rx).collect().await;
        let summary = handle.await.unwrap().unwrap();

        let rejected: Vec<&EngineError> = events
            .iter()
            .filter_map(|e| match e {
                FeedEvent::Rejected { error, .. } => Some(error),
                _ => None,
            })
            .collect();
        assert_eq!(rejected.len(), 2);
        assert!(matches!(rejected[0], EngineError::OutOfOrderInput { .. }));
        assert!(matches!(rejected[1], EngineError::InvalidPrice { .. }));
        assert_eq!(summary.rejected, 2);
        // The clean points still produce the same two signals.
        assert_eq!(summary.signals, 2);
    }

    #[tokio::test]
    async fn macd_events_are_tagged() {
        let macd = MacdDetector::new(
            &MacdConfig {
                fast: 2,
                slow: 4,
                signal: 2,
            },
            EmaSeedPolicy::FirstPrice,
        )
        .unwrap();
        let (tx, rx) = mpsc::channel(64);
        let handle = spawn_replay(feed("MACD").with_macd(macd), scenario_points(), tx);

        let events: Vec<FeedEvent> = feed_stream(rx).collect().await;
        handle.await.unwrap().unwrap();

        assert!(events.iter().any(|e| matches!(e, FeedEvent::Macd { .. })));
    }

    #[tokio::test]
    async fn independent_symbols_run_concurrently() {
        let (tx, rx) = mpsc::channel(64);
        let handles: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|s| spawn_replay(feed(s), scenario_points(), tx.clone()))
            .collect();
        drop(tx);

        let events: Vec<FeedEvent> = feed_stream(rx).collect().await;
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap().signals, 2);
        }
        for s in ["A", "B", "C"] {
            let per_symbol: Vec<SignalKind> = events
                .iter()
                .filter(|e| e.symbol() == s)
                .filter_map(|e| match e {
                    FeedEvent::Signal { signal, .. } => Some(signal.kind),
                    _ => None,
                })
                .collect();
            assert_eq!(per_symbol, vec![SignalKind::Sell, SignalKind::Buy]);
        }
    }

    #[tokio::test]
    async fn closed_output_fails_the_feed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let summary = spawn_replay(feed("X"), scenario_points(), tx).await.unwrap();
        assert!(summary.is_err());
    }
}
