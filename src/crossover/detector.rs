// =============================================================================
// CrossoverDetector — short vs long moving-average sign changes
// =============================================================================
//
// Per price:
//   1. feed both trackers
//   2. if either is cold, no signal (trend not yet defined)
//   3. delta = short - long, routed through the SignTracker
//   4. Negative -> Positive => Buy,  Positive -> Negative => Sell
//
// Input is assumed valid; `CrossoverEngine` rejects bad points before they
// reach this type.

use crate::indicators::MovingAverageTracker;
use crate::types::{PricePoint, Signal, SignalKind, TrendSign};

use super::sign::{Crossing, SignTracker};

#[derive(Debug, Clone)]
pub struct CrossoverDetector {
    short: MovingAverageTracker,
    long: MovingAverageTracker,
    sign: SignTracker,
    last_reading: Option<(f64, f64)>,
}

impl CrossoverDetector {
    pub fn new(short: MovingAverageTracker, long: MovingAverageTracker) -> Self {
        Self {
            short,
            long,
            sign: SignTracker::new(),
            last_reading: None,
        }
    }

    pub(crate) fn from_parts(
        short: MovingAverageTracker,
        long: MovingAverageTracker,
        sign: SignTracker,
        last_reading: Option<(f64, f64)>,
    ) -> Self {
        Self {
            short,
            long,
            sign,
            last_reading,
        }
    }

    pub fn process(&mut self, point: &PricePoint) -> Option<Signal> {
        let short = self.short.update(point.price);
        let long = self.long.update(point.price);

        let (short_value, long_value) = match (short, long) {
            (Some(s), Some(l)) => (s, l),
            _ => return None,
        };
        self.last_reading = Some((short_value, long_value));

        let kind = match self.sign.observe(short_value - long_value)? {
            Crossing::Upward => SignalKind::Buy,
            Crossing::Downward => SignalKind::Sell,
        };

        Some(Signal {
            timestamp: point.timestamp,
            price: point.price,
            short_value,
            long_value,
            kind,
        })
    }

    /// Last non-zero sign of `short - long`; `Undefined` until both legs are
    /// warm and the delta has been non-zero at least once.
    pub fn trend(&self) -> TrendSign {
        self.sign.current()
    }

    /// Latest `(short, long)` pair once both legs are warm.
    pub fn last_reading(&self) -> Option<(f64, f64)> {
        self.last_reading
    }

    pub fn short(&self) -> &MovingAverageTracker {
        &self.short
    }

    pub fn long(&self) -> &MovingAverageTracker {
        &self.long
    }
}
