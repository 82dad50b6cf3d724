// =============================================================================
// Simple Moving Average (SMA) — Incremental ring buffer
// =============================================================================
//
// SMA is the unweighted mean of the last `window` prices.
//
//   sum_t = sum_{t-1} - evicted + close_t
//   SMA_t = sum_t / window
//
// The running sum is re-derived from the buffer once per full turnover of the
// ring (every `window` evictions), so rounding error from the add/subtract
// pairs cannot accumulate across a long stream.  Cost stays O(1) amortised.
// =============================================================================

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Streaming SMA over a fixed window.  Cold until `window` prices are seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaTracker {
    window: usize,
    buffer: VecDeque<f64>,
    sum: f64,
    evictions: usize,
    observations: u64,
}

impl SmaTracker {
    /// `window` must be at least 1; the engine rejects zero windows before
    /// any tracker is built.
    pub fn new(window: usize) -> Self {
        debug_assert!(window >= 1, "SMA window must be >= 1");
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
            sum: 0.0,
            evictions: 0,
            observations: 0,
        }
    }

    /// Push a price and return the average once warm.
    pub fn update(&mut self, price: f64) -> Option<f64> {
        if self.buffer.len() >= self.window {
            if let Some(evicted) = self.buffer.pop_front() {
                self.sum -= evicted;
                self.evictions += 1;
            }
        }
        self.buffer.push_back(price);
        self.sum += price;
        self.observations += 1;

        if self.evictions >= self.window {
            self.sum = self.buffer.iter().sum();
            self.evictions = 0;
        }

        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.is_warm() {
            Some(self.sum / self.window as f64)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_warm(&self) -> bool {
        self.buffer.len() >= self.window
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    #[inline]
    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Used to vet deserialised snapshots: the buffer length must agree with
    /// the observation count and the running sum with the buffer contents.
    pub(crate) fn is_consistent(&self) -> bool {
        if self.window < 1 || self.evictions >= self.window {
            return false;
        }
        let expected_len = self.observations.min(self.window as u64);
        if self.buffer.len() as u64 != expected_len {
            return false;
        }
        if !self.sum.is_finite() || self.buffer.iter().any(|p| !p.is_finite()) {
            return false;
        }
        let exact: f64 = self.buffer.iter().sum();
        let scale = self.buffer.iter().map(|p| p.abs()).sum::<f64>().max(1.0);
        (self.sum - exact).abs() <= 1e-9 * scale
    }
}

/// Compute the SMA series for `closes` over `period`.
///
/// Each output element corresponds to a close starting at index
/// `period - 1`.  Returns an empty `Vec` when `period == 0` or the input is
/// shorter than `period`.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let mut tracker = SmaTracker::new(period);
    closes.iter().filter_map(|&c| tracker.update(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_catches_tampered_state() {
        let mut sma = SmaTracker::new(3);
        for p in [1.0, 2.0, 3.0, 4.0, 5.0] {
            sma.update(p);
        }
        assert!(sma.is_consistent());

        let mut bad_sum = sma.clone();
        bad_sum.sum += 1.0;
        assert!(!bad_sum.is_consistent());

        let mut short_buffer = sma.clone();
        short_buffer.buffer.pop_front();
        assert!(!short_buffer.is_consistent());

        let mut bad_count = sma.clone();
        bad_count.observations = 1;
        assert!(!bad_count.is_consistent());

        assert!(SmaTracker::new(4).is_consistent());
    }

    #[test]
    fn cold_until_window_filled() {
        let mut sma = SmaTracker::new(3);
        assert_eq!(sma.update(1.0), None);
        assert_eq!(sma.update(2.0), None);
        assert!(!sma.is_warm());
        assert_eq!(sma.update(3.0), Some(2.0));
        assert!(sma.is_warm());
        assert_eq!(sma.observations(), 3);
    }

    #[test]
    fn evicts_oldest_price() {
        let mut sma = SmaTracker::new(3);
        for p in [1.0, 2.0, 3.0] {
            sma.update(p);
        }
        // (2 + 3 + 10) / 3
        assert_eq!(sma.update(10.0), Some(5.0));
        // (3 + 10 + 2) / 3
        assert_eq!(sma.update(2.0), Some(5.0));
    }

    #[test]
    fn window_of_one_tracks_price_exactly() {
        let mut sma = SmaTracker::new(1);
        for p in [10.1, 0.3, 7.77, 1e-9, 12345.678] {
            assert_eq!(sma.update(p), Some(p));
        }
    }

    #[test]
    fn resum_keeps_constant_input_exact() {
        let mut sma = SmaTracker::new(4);
        for _ in 0..1_000 {
            sma.update(0.1);
        }
        let expected = [0.1_f64; 4].iter().sum::<f64>() / 4.0;
        assert_eq!(sma.value(), Some(expected));
    }

    #[test]
    fn matches_naive_window_mean() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + ((i * 7) % 13) as f64 * 0.37).collect();
        let series = calculate_sma(&closes, 5);
        assert_eq!(series.len(), closes.len() - 4);
        for (i, v) in series.iter().enumerate() {
            let naive = closes[i..i + 5].iter().sum::<f64>() / 5.0;
            assert!((v - naive).abs() < 1e-9, "index {i}: got {v}, expected {naive}");
        }
    }

    #[test]
    fn batch_edge_cases() {
        assert!(calculate_sma(&[1.0, 2.0], 0).is_empty());
        assert!(calculate_sma(&[1.0, 2.0], 3).is_empty());
        assert_eq!(calculate_sma(&[2.0, 4.0, 6.0], 3), vec![4.0]);
    }
}
