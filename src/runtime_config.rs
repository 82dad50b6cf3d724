// =============================================================================
// Runtime Configuration — engine settings with atomic save
// =============================================================================
//
// `EngineConfig` is the explicit constructor argument of every engine; nothing
// in the kernel reads ambient or global settings.  `RuntimeConfig` wraps it
// with the settings the replay binary needs (symbols, MACD periods,
// annualisation).
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::types::{AverageKind, EmaSeedPolicy};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_short_window() -> usize {
    20
}

fn default_long_window() -> usize {
    50
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_periods_per_year() -> f64 {
    252.0
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Window lengths and averaging kinds for one crossover engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fast leg window length. Must be >= 1 and < `long_window`.
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    /// Slow leg window length.
    #[serde(default = "default_long_window")]
    pub long_window: usize,

    #[serde(default)]
    pub short_kind: AverageKind,

    #[serde(default)]
    pub long_kind: AverageKind,

    /// Seeding rule shared by every EMA leg.
    #[serde(default)]
    pub ema_seed_policy: EmaSeedPolicy,

    /// Reject prices <= 0 in addition to non-finite ones.
    #[serde(default = "default_true")]
    pub require_positive_price: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
            short_kind: AverageKind::Sma,
            long_kind: AverageKind::Sma,
            ema_seed_policy: EmaSeedPolicy::SmaSeed,
            require_positive_price: true,
        }
    }
}

impl EngineConfig {
    /// Both legs of the same kind.
    pub fn new(short_window: usize, long_window: usize, kind: AverageKind) -> Self {
        Self {
            short_window,
            long_window,
            short_kind: kind,
            long_kind: kind,
            ..Self::default()
        }
    }

    pub fn with_seed_policy(mut self, policy: EmaSeedPolicy) -> Self {
        self.ema_seed_policy = policy;
        self
    }

    /// Fails fast on a zero window or `short_window >= long_window`.
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        if self.short_window == 0 || self.long_window == 0 || self.short_window >= self.long_window
        {
            return Err(EngineError::MisconfiguredWindows {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }
}

// =============================================================================
// MacdConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdConfig {
    #[serde(default = "default_macd_fast")]
    pub fast: usize,

    #[serde(default = "default_macd_slow")]
    pub slow: usize,

    #[serde(default = "default_macd_signal")]
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: default_macd_fast(),
            slow: default_macd_slow(),
            signal: default_macd_signal(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the replay binary.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    /// MACD leg; `None` disables it.
    #[serde(default)]
    pub macd: Option<MacdConfig>,

    /// Restrict replay to these symbols (file stems). Empty means all.
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Bars per year for volatility annualisation (252 for daily bars).
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            macd: None,
            symbols: Vec::new(),
            periods_per_year: default_periods_per_year(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;
        config.symbols = normalise_symbols(config.symbols.iter().map(String::as_str));

        info!(
            path = %path.display(),
            short_window = config.engine.short_window,
            long_window = config.engine.long_window,
            symbols = ?config.symbols,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `CROSSOVER_*` environment overrides through `lookup`.
    ///
    /// Unparseable values are logged and ignored; the caller still validates
    /// the final engine config before building anything.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CROSSOVER_SHORT_WINDOW") {
            match v.trim().parse() {
                Ok(n) => self.engine.short_window = n,
                Err(e) => warn!(value = %v, error = %e, "ignoring CROSSOVER_SHORT_WINDOW"),
            }
        }
        if let Some(v) = lookup("CROSSOVER_LONG_WINDOW") {
            match v.trim().parse() {
                Ok(n) => self.engine.long_window = n,
                Err(e) => warn!(value = %v, error = %e, "ignoring CROSSOVER_LONG_WINDOW"),
            }
        }
        if let Some(v) = lookup("CROSSOVER_SHORT_KIND") {
            match v.parse() {
                Ok(k) => self.engine.short_kind = k,
                Err(e) => warn!(value = %v, error = %e, "ignoring CROSSOVER_SHORT_KIND"),
            }
        }
        if let Some(v) = lookup("CROSSOVER_LONG_KIND") {
            match v.parse() {
                Ok(k) => self.engine.long_kind = k,
                Err(e) => warn!(value = %v, error = %e, "ignoring CROSSOVER_LONG_KIND"),
            }
        }
        if let Some(v) = lookup("CROSSOVER_EMA_SEED") {
            match v.parse() {
                Ok(p) => self.engine.ema_seed_policy = p,
                Err(e) => warn!(value = %v, error = %e, "ignoring CROSSOVER_EMA_SEED"),
            }
        }
        if let Some(v) = lookup("CROSSOVER_SYMBOLS") {
            self.symbols = normalise_symbols(v.split(','));
        }
    }

    /// [`apply_overrides`](Self::apply_overrides) against the process
    /// environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

/// Symbols are matched against upper-cased file stems.
fn normalise_symbols<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
