// =============================================================================
// Crossover Module
// =============================================================================
//
// Price in -> both trackers updated -> delta recomputed -> sign compared to
// previous -> signal emitted or not.

pub mod detector;
pub mod engine;
pub mod macd;
pub mod sign;
pub mod stream;

pub use detector::CrossoverDetector;
pub use engine::{CrossoverEngine, EngineSnapshot};
pub use macd::{MacdDetector, MacdEvent, MacdEventKind};
pub use sign::{Crossing, SignTracker};
pub use stream::SignalStream;
