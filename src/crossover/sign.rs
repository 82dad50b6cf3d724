// =============================================================================
// SignTracker — the Undefined / Positive / Negative state machine
// =============================================================================
//
// Tie policy: a delta of exactly zero is a touch point, not a direction.  It
// emits nothing and does not overwrite the stored sign; the last non-zero
// sign is kept until the delta resolves again.  The first non-zero delta only
// establishes a sign (there is nothing to cross from).

use serde::{Deserialize, Serialize};

use crate::types::TrendSign;

/// Direction of a confirmed sign change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// Negative -> Positive.
    Upward,
    /// Positive -> Negative.
    Downward,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTracker {
    previous: TrendSign,
}

impl SignTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_sign(previous: TrendSign) -> Self {
        Self { previous }
    }

    /// Record `delta` and report a crossing if the sign flipped.
    pub fn observe(&mut self, delta: f64) -> Option<Crossing> {
        let sign = if delta > 0.0 {
            TrendSign::Positive
        } else if delta < 0.0 {
            TrendSign::Negative
        } else {
            return None;
        };

        let crossing = match (self.previous, sign) {
            (TrendSign::Negative, TrendSign::Positive) => Some(Crossing::Upward),
            (TrendSign::Positive, TrendSign::Negative) => Some(Crossing::Downward),
            _ => None,
        };
        self.previous = sign;
        crossing
    }

    #[inline]
    pub fn current(&self) -> TrendSign {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_resolution_only_establishes() {
        let mut s = SignTracker::new();
        assert_eq!(s.current(), TrendSign::Undefined);
        assert_eq!(s.observe(-1.0), None);
        assert_eq!(s.current(), TrendSign::Negative);
    }

    #[test]
    fn zero_before_any_sign_stays_undefined() {
        let mut s = SignTracker::new();
        assert_eq!(s.observe(0.0), None);
        assert_eq!(s.current(), TrendSign::Undefined);
    }

    #[test]
    fn flips_report_direction() {
        let mut s = SignTracker::new();
        s.observe(2.0);
        assert_eq!(s.observe(1.0), None);
        assert_eq!(s.observe(-0.5), Some(Crossing::Downward));
        assert_eq!(s.observe(-0.1), None);
        assert_eq!(s.observe(3.0), Some(Crossing::Upward));
    }

    // Chosen tie policy: zero is transient and the prior sign is retained.
    #[test]
    fn zero_touch_is_transient() {
        let mut s = SignTracker::new();
        s.observe(1.0);
        assert_eq!(s.observe(0.0), None);
        assert_eq!(s.current(), TrendSign::Positive);
        // Touch and bounce back up: no signal.
        assert_eq!(s.observe(0.5), None);
        // Touch then go through: one signal, on the resolving observation.
        assert_eq!(s.observe(0.0), None);
        assert_eq!(s.observe(0.0), None);
        assert_eq!(s.observe(-0.5), Some(Crossing::Downward));
    }
}
