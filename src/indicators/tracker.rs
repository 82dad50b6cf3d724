// =============================================================================
// MovingAverageTracker — one leg of the crossover engine
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::EmaTracker;
use super::sma::SmaTracker;
use crate::types::{AverageKind, EmaSeedPolicy};

/// A single moving average, either SMA or EMA.
///
/// Cold until enough prices have been observed, then warm for good.  The
/// serialised form is the tracker's full state and is what engine snapshots
/// carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MovingAverageTracker {
    Sma(SmaTracker),
    Ema(EmaTracker),
}

impl MovingAverageTracker {
    /// `seed` only applies to EMA legs.
    pub fn new(kind: AverageKind, window: usize, seed: EmaSeedPolicy) -> Self {
        match kind {
            AverageKind::Sma => Self::Sma(SmaTracker::new(window)),
            AverageKind::Ema => Self::Ema(EmaTracker::new(window, seed)),
        }
    }

    /// Feed one price. Returns `None` while cold.
    pub fn update(&mut self, price: f64) -> Option<f64> {
        match self {
            Self::Sma(t) => t.update(price),
            Self::Ema(t) => t.update(price),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Sma(t) => t.value(),
            Self::Ema(t) => t.value(),
        }
    }

    pub fn is_warm(&self) -> bool {
        match self {
            Self::Sma(t) => t.is_warm(),
            Self::Ema(t) => t.is_warm(),
        }
    }

    pub fn window(&self) -> usize {
        match self {
            Self::Sma(t) => t.window(),
            Self::Ema(t) => t.window(),
        }
    }

    pub fn kind(&self) -> AverageKind {
        match self {
            Self::Sma(_) => AverageKind::Sma,
            Self::Ema(_) => AverageKind::Ema,
        }
    }

    pub fn observations(&self) -> u64 {
        match self {
            Self::Sma(t) => t.observations(),
            Self::Ema(t) => t.observations(),
        }
    }

    /// Whether this tracker could have been built from the given settings.
    pub(crate) fn matches(&self, kind: AverageKind, window: usize, seed: EmaSeedPolicy) -> bool {
        match self {
            Self::Sma(t) => kind == AverageKind::Sma && t.window() == window && t.is_consistent(),
            Self::Ema(t) => {
                kind == AverageKind::Ema
                    && t.window() == window
                    && t.seed_policy() == seed
                    && t.is_consistent()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_kind() {
        let mut sma = MovingAverageTracker::new(AverageKind::Sma, 2, EmaSeedPolicy::FirstPrice);
        let mut ema = MovingAverageTracker::new(AverageKind::Ema, 2, EmaSeedPolicy::FirstPrice);

        assert_eq!(sma.kind(), AverageKind::Sma);
        assert_eq!(ema.kind(), AverageKind::Ema);

        // Seed policy is ignored for SMA: still cold after one price.
        assert_eq!(sma.update(4.0), None);
        assert_eq!(ema.update(4.0), Some(4.0));

        assert_eq!(sma.update(6.0), Some(5.0));
        assert!(sma.is_warm());
        assert_eq!(sma.observations(), 2);
        assert_eq!(ema.window(), 2);
    }

    #[test]
    fn serde_preserves_state() {
        let mut t = MovingAverageTracker::new(AverageKind::Sma, 3, EmaSeedPolicy::SmaSeed);
        for p in [1.0, 2.0, 3.0, 4.0] {
            t.update(p);
        }
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"kind\":\"Sma\""));

        let mut restored: MovingAverageTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);
        assert_eq!(restored.update(5.0), t.update(5.0));
    }

    #[test]
    fn matches_rejects_foreign_settings() {
        let t = MovingAverageTracker::new(AverageKind::Ema, 5, EmaSeedPolicy::SmaSeed);
        assert!(t.matches(AverageKind::Ema, 5, EmaSeedPolicy::SmaSeed));
        assert!(!t.matches(AverageKind::Ema, 5, EmaSeedPolicy::FirstPrice));
        assert!(!t.matches(AverageKind::Sma, 5, EmaSeedPolicy::SmaSeed));
        assert!(!t.matches(AverageKind::Ema, 6, EmaSeedPolicy::SmaSeed));
    }
}
