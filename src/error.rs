// =============================================================================
// Engine rejection taxonomy
// =============================================================================
//
// Every variant is a local, synchronous rejection.  Retrying without new or
// corrected input reproduces the same error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Timestamp not strictly greater than the last accepted one.
    #[error("out-of-order input: timestamp {received} is not after {previous}")]
    OutOfOrderInput { previous: i64, received: i64 },

    /// Non-finite price, or non-positive price when positivity is required.
    #[error("invalid price {price} at timestamp {timestamp}")]
    InvalidPrice { timestamp: i64, price: f64 },

    /// Zero window length, or `short >= long`.
    #[error("misconfigured windows: short={short}, long={long} (need 0 < short < long)")]
    MisconfiguredWindows { short: usize, long: usize },

    /// A standalone average was asked for with a zero window.
    #[error("zero window for {name}")]
    ZeroWindow { name: &'static str },

    /// Snapshot whose tracker state disagrees with its config or with itself.
    #[error("inconsistent snapshot: {leg} leg does not match the configuration")]
    InconsistentSnapshot { leg: &'static str },

    /// Zero period, or `fast >= slow`.
    #[error("misconfigured MACD: fast={fast}, slow={slow}, signal={signal}")]
    MisconfiguredMacd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}
