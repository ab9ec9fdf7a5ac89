use std::{fmt::Debug, ops::Range};

use mpi::{
    environment::Universe,
    topology::SimpleCommunicator,
    traits::*,
};

use crate::{check_exchange_len, MPIEngine, MPIResult, Transferable};

#[derive(Clone)]
pub struct MPIConfig<'a> {
    pub world: Option<&'a SimpleCommunicator>,
    pub world_size: i32,
    pub world_rank: i32,
}

impl Default for MPIConfig<'_> {
    fn default() -> Self {
        Self {
            world: None,
            world_size: 1,
            world_rank: 0,
        }
    }
}

impl Debug for MPIConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let world_fmt = self.world.map(|_| 0usize);

        f.debug_struct("MPIConfig")
            .field("world", &world_fmt)
            .field("world_size", &self.world_size)
            .field("world_rank", &self.world_rank)
            .finish()
    }
}

impl<'a> MPIConfig<'a> {
    /// Initialize the MPI environment.
    ///
    /// Returns `None` if MPI was already initialized in this process. Dropping the returned
    /// universe finalizes MPI.
    #[inline]
    pub fn init() -> Option<Universe> {
        mpi::initialize()
    }

    /// Handle over `world`, or a single-process handle when `world` is `None`
    pub fn new(world: Option<&'a SimpleCommunicator>) -> Self {
        let (world_size, world_rank) = match world {
            Some(world) => (world.size(), world.rank()),
            None => (1, 0),
        };
        log::debug!("MPI world initialized: rank {world_rank} of {world_size}");
        Self {
            world,
            world_size,
            world_rank,
        }
    }
}

impl MPIEngine for MPIConfig<'_> {
    const CHUNK_SIZE: usize = 1usize << 20;

    #[inline(always)]
    fn backend_name(&self) -> &'static str {
        "mpi"
    }

    #[inline(always)]
    fn world_size(&self) -> usize {
        self.world_size as usize
    }

    #[inline(always)]
    fn world_rank(&self) -> usize {
        self.world_rank as usize
    }

    #[inline(always)]
    fn barrier(&self) {
        if let Some(world) = self.world {
            world.barrier();
        }
    }

    fn all_to_all<T: Transferable>(&self, send: &[T], recv: &mut [T]) -> MPIResult<()> {
        let chunk_len = check_exchange_len(self.world_size(), send.len(), recv.len())?;

        let world = match self.world {
            Some(world) => world,
            None => {
                recv.copy_from_slice(send);
                return Ok(());
            }
        };

        if chunk_len <= Self::CHUNK_SIZE {
            world.all_to_all_into(send, recv);
            return Ok(());
        }

        chunked_all_to_all(send, recv, self.world_size(), Self::CHUNK_SIZE, |s, r| {
            world.all_to_all_into(s, r);
            Ok(())
        })
    }
}

/// Run an all-to-all whose per-peer chunks are too long for a single call as several rounds.
///
/// Round `k` moves elements `k * chunk_size..` of every peer chunk. The slices for all peers are
/// packed contiguously before each call and scattered back into place afterwards, so the result
/// is identical to a single exchange.
pub(crate) fn chunked_all_to_all<T, F>(
    send: &[T],
    recv: &mut [T],
    world_size: usize,
    chunk_size: usize,
    mut exchange: F,
) -> MPIResult<()>
where
    T: Copy,
    F: FnMut(&[T], &mut [T]) -> MPIResult<()>,
{
    let chunk_len = check_exchange_len(world_size, send.len(), recv.len())?;
    if chunk_len == 0 {
        return exchange(send, recv);
    }

    let round_capacity = chunk_size.min(chunk_len) * world_size;
    let mut send_round = vec![send[0]; round_capacity];
    let mut recv_round = vec![send[0]; round_capacity];

    for round in round_ranges(chunk_len, chunk_size) {
        let round_elems = round.len() * world_size;
        pack_round(send, chunk_len, &round, &mut send_round[..round_elems]);
        exchange(&send_round[..round_elems], &mut recv_round[..round_elems])?;
        unpack_round(&recv_round[..round_elems], chunk_len, &round, recv);
    }
    Ok(())
}

#[inline]
fn round_ranges(chunk_len: usize, chunk_size: usize) -> impl Iterator<Item = Range<usize>> {
    (0..chunk_len)
        .step_by(chunk_size.max(1))
        .map(move |start| start..(start + chunk_size).min(chunk_len))
}

#[inline]
fn pack_round<T: Copy>(src: &[T], chunk_len: usize, round: &Range<usize>, dst: &mut [T]) {
    src.chunks(chunk_len)
        .zip(dst.chunks_mut(round.len()))
        .for_each(|(peer_chunk, slot)| slot.copy_from_slice(&peer_chunk[round.clone()]));
}

#[inline]
fn unpack_round<T: Copy>(src: &[T], chunk_len: usize, round: &Range<usize>, dst: &mut [T]) {
    src.chunks(round.len())
        .zip(dst.chunks_mut(chunk_len))
        .for_each(|(slot, peer_chunk)| peer_chunk[round.clone()].copy_from_slice(slot));
}
