// =============================================================================
// MacdDetector — signal-line and zero-line crossings
// =============================================================================
//
// Two independent SignTrackers with the same tie policy as the main detector:
//   signal line : sign(MACD - Signal)
//   zero line   : sign(MACD)
// The zero-line tracker starts as soon as the MACD line is defined; the
// signal-line tracker once the signal EMA is warm.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indicators::{MacdReading, MacdTracker};
use crate::runtime_config::MacdConfig;
use crate::types::{EmaSeedPolicy, PricePoint};

use super::sign::{Crossing, SignTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdEventKind {
    /// MACD crossed above its signal line.
    SignalLineBuy,
    /// MACD crossed below its signal line.
    SignalLineSell,
    /// MACD turned positive.
    ZeroLineUp,
    /// MACD turned negative.
    ZeroLineDown,
}

impl std::fmt::Display for MacdEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignalLineBuy => write!(f, "SignalLineBuy"),
            Self::SignalLineSell => write!(f, "SignalLineSell"),
            Self::ZeroLineUp => write!(f, "ZeroLineUp"),
            Self::ZeroLineDown => write!(f, "ZeroLineDown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdEvent {
    pub timestamp: i64,
    pub price: f64,
    pub macd: f64,
    /// `None` for zero-line events raised before the signal line is warm.
    pub reading: Option<MacdReading>,
    pub kind: MacdEventKind,
}

#[derive(Debug, Clone)]
pub struct MacdDetector {
    tracker: MacdTracker,
    signal_line: SignTracker,
    zero_line: SignTracker,
}

impl MacdDetector {
    pub fn new(config: &MacdConfig, seed: EmaSeedPolicy) -> Result<Self> {
        Ok(Self {
            tracker: MacdTracker::new(config.fast, config.slow, config.signal, seed)?,
            signal_line: SignTracker::new(),
            zero_line: SignTracker::new(),
        })
    }

    /// Feed a point that has already passed engine validation.  Returns up to
    /// two events (one per line), zero-line first.
    pub fn process(&mut self, point: &PricePoint) -> Vec<MacdEvent> {
        let reading = self.tracker.update(point.price);
        let mut events = Vec::new();

        let Some(macd) = self.tracker.macd_line() else {
            return events;
        };

        if let Some(crossing) = self.zero_line.observe(macd) {
            events.push(MacdEvent {
                timestamp: point.timestamp,
                price: point.price,
                macd,
                reading,
                kind: match crossing {
                    Crossing::Upward => MacdEventKind::ZeroLineUp,
                    Crossing::Downward => MacdEventKind::ZeroLineDown,
                },
            });
        }

        if let Some(r) = reading {
            if let Some(crossing) = self.signal_line.observe(r.histogram) {
                events.push(MacdEvent {
                    timestamp: point.timestamp,
                    price: point.price,
                    macd,
                    reading,
                    kind: match crossing {
                        Crossing::Upward => MacdEventKind::SignalLineBuy,
                        Crossing::Downward => MacdEventKind::SignalLineSell,
                    },
                });
            }
        }

        events
    }

    pub fn is_warm(&self) -> bool {
        self.tracker.is_warm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> MacdDetector {
        let config = MacdConfig {
            fast: 3,
            slow: 6,
            signal: 3,
        };
        MacdDetector::new(&config, EmaSeedPolicy::FirstPrice).unwrap()
    }

    fn run(d: &mut MacdDetector, prices: &[f64]) -> Vec<MacdEvent> {
        prices
            .iter()
            .enumerate()
            .flat_map(|(i, &p)| d.process(&PricePoint::new(i as i64, p)))
            .collect()
    }

    #[test]
    fn rejects_bad_config() {
        let config = MacdConfig {
            fast: 26,
            slow: 12,
            signal: 9,
        };
        assert!(MacdDetector::new(&config, EmaSeedPolicy::SmaSeed).is_err());
    }

    #[test]
    fn v_shape_produces_zero_line_up() {
        let mut d = detector();
        let mut prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        prices.extend((0..30).map(|i| 81.0 + i as f64 * 2.0));

        let events = run(&mut d, &prices);
        let zero_up: Vec<_> = events
            .iter()
            .filter(|e| e.kind == MacdEventKind::ZeroLineUp)
            .collect();
        assert_eq!(zero_up.len(), 1);
        assert!(zero_up[0].macd > 0.0);
        assert!(zero_up[0].timestamp >= 20);

        // The signal line turns before the zero line does.
        let first_buy = events
            .iter()
            .find(|e| e.kind == MacdEventKind::SignalLineBuy)
            .unwrap();
        assert!(first_buy.timestamp <= zero_up[0].timestamp);
        assert!(d.is_warm());
    }

    #[test]
    fn events_alternate_per_line() {
        let mut d = detector();
        let prices: Vec<f64> = (0..300).map(|i| 50.0 + (i as f64 / 6.0).sin() * 4.0).collect();
        let events = run(&mut d, &prices);

        let signal_line: Vec<_> = events
            .iter()
            .filter(|e| matches!(e.kind, MacdEventKind::SignalLineBuy | MacdEventKind::SignalLineSell))
            .collect();
        assert!(signal_line.len() > 4);
        for pair in signal_line.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }
}
