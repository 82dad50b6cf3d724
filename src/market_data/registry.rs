// =============================================================================
// EngineRegistry — one crossover engine per symbol
// =============================================================================
//
// Symbols share nothing, so each gets its own engine behind its own mutex.
// The map lock is only held long enough to find or create an entry; the
// per-engine mutex serialises concurrent producers of the same symbol so
// that every `process` call completes before the next one starts.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::crossover::{CrossoverEngine, EngineSnapshot};
use crate::error::Result;
use crate::runtime_config::EngineConfig;
use crate::types::{PricePoint, Signal, TrendSign, WarmupStatus};

pub struct EngineRegistry {
    config: EngineConfig,
    engines: RwLock<HashMap<String, Arc<Mutex<CrossoverEngine>>>>,
}

impl EngineRegistry {
    /// Validates `config` once; every engine created later uses it.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engines: RwLock::new(HashMap::new()),
        })
    }

    fn engine(&self, symbol: &str) -> Result<Arc<Mutex<CrossoverEngine>>> {
        if let Some(engine) = self.engines.read().get(symbol) {
            return Ok(engine.clone());
        }

        let mut map = self.engines.write();
        if let Some(engine) = map.get(symbol) {
            return Ok(engine.clone());
        }
        let engine = Arc::new(Mutex::new(CrossoverEngine::new(self.config.clone())?));
        map.insert(symbol.to_string(), engine.clone());
        info!(symbol = %symbol, "engine created");
        Ok(engine)
    }

    /// Feed one point to the symbol's engine, creating it on first use.
    pub fn ingest(&self, symbol: &str, point: PricePoint) -> Result<Option<Signal>> {
        let engine = self.engine(symbol)?;
        let mut engine = engine.lock();
        engine.process(point)
    }

    pub fn warmup(&self, symbol: &str) -> Option<WarmupStatus> {
        self.engines.read().get(symbol).map(|e| e.lock().warmup())
    }

    pub fn trend(&self, symbol: &str) -> Option<TrendSign> {
        self.engines.read().get(symbol).map(|e| e.lock().trend())
    }

    pub fn snapshot(&self, symbol: &str) -> Option<EngineSnapshot> {
        self.engines.read().get(symbol).map(|e| e.lock().snapshot())
    }

    /// Replace (or create) the symbol's engine from a snapshot.
    pub fn restore(&self, symbol: &str, snapshot: EngineSnapshot) -> Result<()> {
        let engine = CrossoverEngine::restore(snapshot)?;
        self.engines
            .write()
            .insert(symbol.to_string(), Arc::new(Mutex::new(engine)));
        Ok(())
    }

    /// Registered symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.engines.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
