use mpi_config::MPIEngine;

use crate::{BenchError, BenchResult, ChunkLayout, Element};

/// Blocking equal-split exchange over a process-group handle.
///
/// Every rank in the world must call `exchange` with buffers of the same layout; a rank that
/// skips the call leaves the others blocked.
#[derive(Debug)]
pub struct ExchangeClient<'a, E: MPIEngine> {
    engine: &'a E,
    layout: ChunkLayout,
}

impl<'a, E: MPIEngine> ExchangeClient<'a, E> {
    pub fn new(engine: &'a E, layout: ChunkLayout) -> Self {
        Self { engine, layout }
    }

    #[inline(always)]
    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// An output buffer matching the layout. Its contents are overwritten by every exchange.
    pub fn allocate_output<T: Element>(&self) -> Vec<T> {
        vec![T::from_index(0); self.layout.total_elems()]
    }

    /// Send chunk `d` of `payload` to rank `d` and receive chunk `s` of `output` from rank `s`.
    ///
    /// Returns once the data has arrived: the engine's synchronization step runs before this
    /// returns, so a caller timing the call measures data movement rather than submission.
    pub fn exchange<T: Element>(&self, payload: &[T], output: &mut [T]) -> BenchResult<()> {
        let expected = self.layout.total_elems();
        for actual in [payload.len(), output.len()] {
            if actual != expected {
                return Err(BenchError::BufferSize { expected, actual });
            }
        }

        self.engine.all_to_all(payload, output)?;
        self.engine.synchronize()?;
        Ok(())
    }
}
