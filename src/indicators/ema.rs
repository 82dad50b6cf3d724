// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// evaluated as EMA_{t-1} + multiplier * (close_t - EMA_{t-1}), which leaves a
// constant series bit-for-bit unchanged.
//
// Seeding is selected by `EmaSeedPolicy`:
//   FirstPrice => the first close is the first EMA value (warm immediately)
//   SmaSeed    => the SMA of the first `period` closes (warm after `period`)
//
// The two policies produce different early values; the gap shrinks by a
// factor of (1 - multiplier) per bar.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::EmaSeedPolicy;

/// Streaming EMA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaTracker {
    window: usize,
    multiplier: f64,
    seed: EmaSeedPolicy,
    current: Option<f64>,
    seed_sum: f64,
    observations: u64,
}

impl EmaTracker {
    pub fn new(window: usize, seed: EmaSeedPolicy) -> Self {
        debug_assert!(window >= 1, "EMA window must be >= 1");
        Self {
            window,
            multiplier: 2.0 / (window + 1) as f64,
            seed,
            current: None,
            seed_sum: 0.0,
            observations: 0,
        }
    }

    pub fn update(&mut self, price: f64) -> Option<f64> {
        self.observations += 1;

        match self.current {
            Some(prev) => {
                self.current = Some(prev + self.multiplier * (price - prev));
            }
            None => match self.seed {
                EmaSeedPolicy::FirstPrice => self.current = Some(price),
                EmaSeedPolicy::SmaSeed => {
                    self.seed_sum += price;
                    if self.observations >= self.window as u64 {
                        self.current = Some(self.seed_sum / self.window as f64);
                    }
                }
            },
        }

        self.current
    }

    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.current
    }

    #[inline]
    pub fn is_warm(&self) -> bool {
        self.current.is_some()
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    #[inline]
    pub fn seed_policy(&self) -> EmaSeedPolicy {
        self.seed
    }

    #[inline]
    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Used to vet deserialised snapshots: warmth must follow from the
    /// observation count and seed policy.
    pub(crate) fn is_consistent(&self) -> bool {
        if self.window < 1 || (self.multiplier - 2.0 / (self.window + 1) as f64).abs() >= 1e-15 {
            return false;
        }
        if self.current.is_some_and(|v| !v.is_finite()) || !self.seed_sum.is_finite() {
            return false;
        }
        let warm_after = match self.seed {
            EmaSeedPolicy::FirstPrice => 1,
            EmaSeedPolicy::SmaSeed => self.window as u64,
        };
        if self.current.is_some() != (self.observations >= warm_after) {
            return false;
        }
        match self.seed {
            EmaSeedPolicy::FirstPrice => self.seed_sum == 0.0,
            EmaSeedPolicy::SmaSeed => self.observations > 0 || self.seed_sum == 0.0,
        }
    }
}

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the period is zero or no value becomes
/// defined.  With `SmaSeed` each output element corresponds to a close
/// starting at index `period - 1`; with `FirstPrice` there is one output per
/// close.
pub fn calculate_ema(closes: &[f64], period: usize, seed: EmaSeedPolicy) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }

    let mut tracker = EmaTracker::new(period, seed);
    closes.iter().filter_map(|&c| tracker.update(c)).collect()
}
