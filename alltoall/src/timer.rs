use std::time::Instant;

use mpi_config::MPIEngine;

use crate::BenchResult;

/// Result of a measured operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timed<R> {
    pub value: R,
    pub elapsed_ms: f64,
}

/// Wall-clock timer whose start is aligned across the world by a barrier.
///
/// The trailing barrier is left to the caller, so the caller decides what may overlap with
/// slower peers finishing.
#[derive(Debug)]
pub struct BarrierTimer<'a, E: MPIEngine> {
    engine: &'a E,
}

impl<'a, E: MPIEngine> BarrierTimer<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    pub fn measure<R, F>(&self, op: F) -> BenchResult<Timed<R>>
    where
        F: FnOnce() -> BenchResult<R>,
    {
        self.engine.barrier();
        let start = Instant::now();
        let value = op()?;
        self.engine.synchronize()?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(Timed { value, elapsed_ms })
    }
}
