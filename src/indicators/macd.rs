// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal_period) of MACD
//   Histogram = MACD - Signal
//
// The MACD line is defined once both price EMAs are warm; only from then on
// is it fed into the signal-line EMA.  A reading is produced once the signal
// EMA is warm as well.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::EmaTracker;
use crate::error::{EngineError, Result};
use crate::types::EmaSeedPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdTracker {
    fast: EmaTracker,
    slow: EmaTracker,
    signal: EmaTracker,
    last_macd: Option<f64>,
}

impl MacdTracker {
    /// Requires `1 <= fast < slow` and `signal >= 1`.
    pub fn new(fast: usize, slow: usize, signal: usize, seed: EmaSeedPolicy) -> Result<Self> {
        if fast == 0 || signal == 0 || fast >= slow {
            return Err(EngineError::MisconfiguredMacd { fast, slow, signal });
        }

        Ok(Self {
            fast: EmaTracker::new(fast, seed),
            slow: EmaTracker::new(slow, seed),
            signal: EmaTracker::new(signal, seed),
            last_macd: None,
        })
    }

    pub fn update(&mut self, price: f64) -> Option<MacdReading> {
        // Both legs must see every price, so no early return between them.
        let fast = self.fast.update(price);
        let slow = self.slow.update(price);

        let macd = fast? - slow?;
        self.last_macd = Some(macd);

        let signal = self.signal.update(macd)?;
        Some(MacdReading {
            macd,
            signal,
            histogram: macd - signal,
        })
    }

    /// Latest MACD line value, available before the signal line is warm.
    pub fn macd_line(&self) -> Option<f64> {
        self.last_macd
    }

    pub fn is_warm(&self) -> bool {
        self.signal.is_warm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ema::calculate_ema;

    #[test]
    fn rejects_bad_periods() {
        assert!(MacdTracker::new(26, 12, 9, EmaSeedPolicy::FirstPrice).is_err());
        assert!(MacdTracker::new(12, 12, 9, EmaSeedPolicy::FirstPrice).is_err());
        assert!(MacdTracker::new(0, 12, 9, EmaSeedPolicy::FirstPrice).is_err());
        assert_eq!(
            MacdTracker::new(3, 6, 0, EmaSeedPolicy::SmaSeed),
            Err(EngineError::MisconfiguredMacd {
                fast: 3,
                slow: 6,
                signal: 0
            })
        );
    }

    #[test]
    fn matches_batch_ema_composition() {
        let closes: Vec<f64> = (0..80).map(|i| 20.0 + (i as f64 * 0.25).cos() * 3.0).collect();
        let seed = EmaSeedPolicy::SmaSeed;

        let fast = calculate_ema(&closes, 3, seed);
        let slow = calculate_ema(&closes, 6, seed);
        // Align fast to slow: slow starts at index 5, fast at index 2.
        let macd: Vec<f64> = slow
            .iter()
            .enumerate()
            .map(|(i, s)| fast[i + 3] - s)
            .collect();
        let signal = calculate_ema(&macd, 4, seed);

        let mut tracker = MacdTracker::new(3, 6, 4, seed).unwrap();
        let readings: Vec<MacdReading> = closes.iter().filter_map(|&c| tracker.update(c)).collect();

        assert_eq!(readings.len(), signal.len());
        for (r, s) in readings.iter().zip(signal.iter()) {
            assert!((r.signal - s).abs() < 1e-12);
            assert!((r.histogram - (r.macd - r.signal)).abs() < 1e-15);
        }
    }

    #[test]
    fn macd_line_defined_before_signal() {
        let mut tracker = MacdTracker::new(2, 3, 5, EmaSeedPolicy::SmaSeed).unwrap();
        for p in [1.0, 2.0, 3.0] {
            assert!(tracker.update(p).is_none());
        }
        assert!(tracker.macd_line().is_some());
        assert!(!tracker.is_warm());
    }
}
