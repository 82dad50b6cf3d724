// =============================================================================
// Moving-Average Indicators
// =============================================================================
//
// Incremental, side-effect-free trackers.  Each `update` consumes one price
// and returns `Option<f64>` so callers are forced to handle the cold
// (insufficient-data) state.

pub mod ema;
pub mod macd;
pub mod sma;
pub mod tracker;

pub use ema::{calculate_ema, EmaTracker};
pub use macd::{MacdReading, MacdTracker};
pub use sma::{calculate_sma, SmaTracker};
pub use tracker::MovingAverageTracker;
