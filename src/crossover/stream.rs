// =============================================================================
// SignalStream — lazy signal sequence over a price iterator
// =============================================================================
//
// Finite when replaying a history, unbounded over a live iterator.  Points
// that produce no signal are consumed silently; rejected points surface as
// `Err` items and the stream continues with the next point.

use crate::error::EngineError;
use crate::types::{PricePoint, Signal};

use super::engine::CrossoverEngine;

pub struct SignalStream<'a, I> {
    engine: &'a mut CrossoverEngine,
    input: I,
}

impl<'a, I> SignalStream<'a, I>
where
    I: Iterator<Item = PricePoint>,
{
    pub(crate) fn new(engine: &'a mut CrossoverEngine, input: I) -> Self {
        Self { engine, input }
    }

    /// The engine driving this stream, e.g. to check warm-up mid-replay.
    pub fn engine(&self) -> &CrossoverEngine {
        self.engine
    }
}

impl<'a, I> Iterator for SignalStream<'a, I>
where
    I: Iterator<Item = PricePoint>,
{
    type Item = Result<Signal, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let point = self.input.next()?;
            match self.engine.process(point) {
                Ok(Some(signal)) => return Some(Ok(signal)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
