// =============================================================================
// Shared types used across the crossover engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// One price observation fed into an engine.
///
/// `timestamp` is an ordinal: epoch milliseconds when loaded from a dated
/// history, or any strictly increasing integer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Direction of an emitted crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Short average crossed above the long average (golden cross).
    Buy,
    /// Short average crossed below the long average (death cross).
    Sell,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
        }
    }
}

/// Immutable crossover event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: i64,
    pub price: f64,
    pub short_value: f64,
    pub long_value: f64,
    pub kind: SignalKind,
}

/// Last recorded direction of `short - long`.
///
/// A zero delta is never stored; see [`crate::crossover::SignTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendSign {
    Undefined,
    Positive,
    Negative,
}

impl Default for TrendSign {
    fn default() -> Self {
        Self::Undefined
    }
}

impl TrendSign {
    /// Position implied by the trend: +1 long, -1 short, 0 flat.
    pub fn position(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
            Self::Undefined => 0.0,
        }
    }
}

impl std::fmt::Display for TrendSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "Undefined"),
            Self::Positive => write!(f, "Positive"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}

/// Averaging method used by one leg of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AverageKind {
    Sma,
    Ema,
}

impl Default for AverageKind {
    fn default() -> Self {
        Self::Sma
    }
}

impl std::fmt::Display for AverageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sma => write!(f, "SMA"),
            Self::Ema => write!(f, "EMA"),
        }
    }
}

impl std::str::FromStr for AverageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(Self::Sma),
            "ema" => Ok(Self::Ema),
            other => Err(format!("unknown average kind '{other}'")),
        }
    }
}

/// How an EMA obtains its first value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaSeedPolicy {
    /// Seed with the first observed price; warm immediately.
    FirstPrice,
    /// Seed with the SMA of the first `window` prices; warm after `window`
    /// observations.
    SmaSeed,
}

impl Default for EmaSeedPolicy {
    fn default() -> Self {
        Self::SmaSeed
    }
}

impl std::fmt::Display for EmaSeedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstPrice => write!(f, "FirstPrice"),
            Self::SmaSeed => write!(f, "SmaSeed"),
        }
    }
}

impl std::str::FromStr for EmaSeedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "firstprice" => Ok(Self::FirstPrice),
            "smaseed" | "sma" => Ok(Self::SmaSeed),
            other => Err(format!("unknown EMA seed policy '{other}'")),
        }
    }
}

/// Warm-up state of both legs. Absence of a signal while either leg is
/// cold means "not yet determinable", not "no crossover".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupStatus {
    pub short_warm: bool,
    pub long_warm: bool,
    pub observations: u64,
}

impl WarmupStatus {
    pub fn is_warm(&self) -> bool {
        self.short_warm && self.long_warm
    }
}
