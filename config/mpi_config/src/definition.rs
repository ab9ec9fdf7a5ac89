use mpi::datatype::Equivalence;

use crate::{MPIError, MPIResult};

/// Element types that can travel through a collective.
///
/// `Equivalence` lets the MPI engine hand typed slices to the runtime without a byte cast;
/// `'static` lets the local engine pass them between threads as `Any`.
pub trait Transferable: Equivalence + Copy + Send + Sync + 'static {}

impl<T: Equivalence + Copy + Send + Sync + 'static> Transferable for T {}

/// MPI APIs
pub trait MPIEngine {
    const ROOT_RANK: usize = 0;

    /// The communication limit for MPI is 2^30. Save 10 bits for #parties here.
    /// Measured in elements per peer per collective call.
    const CHUNK_SIZE: usize;

    /// Short name of the transport, used in reports
    fn backend_name(&self) -> &'static str;

    /// Get the number of processes in the world
    fn world_size(&self) -> usize;

    /// Get the rank of the current process
    fn world_rank(&self) -> usize;

    /// Check if there is only one process in the world
    #[inline(always)]
    fn is_single_process(&self) -> bool {
        self.world_size() == 1
    }

    /// Check if the current process is the root process
    #[inline(always)]
    fn is_root(&self) -> bool {
        self.world_rank() == Self::ROOT_RANK
    }

    /// Barrier for all the processes
    fn barrier(&self);

    /// Equal-split all-to-all.
    ///
    /// `send` and `recv` both hold `world_size` chunks of the same length. Chunk `d` of `send`
    /// on rank `s` ends up in chunk `s` of `recv` on rank `d`. Blocks until every rank has both
    /// sent and received its share.
    fn all_to_all<T: Transferable>(&self, send: &[T], recv: &mut [T]) -> MPIResult<()>;

    /// Wait for work the transport may still be doing on behalf of the caller.
    ///
    /// Host transports complete inside `all_to_all`, so the default does nothing.
    #[inline]
    fn synchronize(&self) -> MPIResult<()> {
        Ok(())
    }
}

/// Validate the local buffers of an all-to-all and return the per-peer chunk length.
#[inline]
pub fn check_exchange_len(world_size: usize, send_len: usize, recv_len: usize) -> MPIResult<usize> {
    if send_len != recv_len {
        return Err(MPIError::BufferLengthMismatch {
            send: send_len,
            recv: recv_len,
        });
    }
    if world_size == 0 {
        return Err(MPIError::EmptyWorld);
    }
    if send_len % world_size != 0 {
        return Err(MPIError::UnevenSplit {
            len: send_len,
            world_size,
        });
    }
    Ok(send_len / world_size)
}
