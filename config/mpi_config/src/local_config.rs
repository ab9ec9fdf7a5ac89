//! An in-process world: every rank is a thread of the current process.
//!
//! Each rank owns one mailbox. An all-to-all posts the local send buffer into the rank's own
//! mailbox, waits for the whole world at a barrier, reads its chunk out of every mailbox, and
//! waits again before the mailbox is cleared. Every rank inspects every mailbox, so a length or
//! type mismatch is seen by all ranks and reported on all of them.

use std::{
    any::Any,
    fmt::Debug,
    sync::{Arc, Barrier, Mutex, MutexGuard},
};

use rayon::ThreadPoolBuilder;

use crate::{check_exchange_len, MPIEngine, MPIError, MPIResult, Transferable};

type Mailbox = Mutex<Option<Box<dyn Any + Send>>>;

struct LocalWorld {
    world_size: usize,
    barrier: Barrier,
    mailboxes: Vec<Mailbox>,
}

#[derive(Clone)]
pub struct LocalConfig {
    world: Arc<LocalWorld>,
    world_rank: usize,
}

impl Debug for LocalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalConfig")
            .field("world_size", &self.world.world_size)
            .field("world_rank", &self.world_rank)
            .finish()
    }
}

impl LocalConfig {
    /// Create the handles of a fresh world, indexed by rank.
    pub fn new_world(world_size: usize) -> MPIResult<Vec<Self>> {
        if world_size == 0 {
            return Err(MPIError::EmptyWorld);
        }
        let world = Arc::new(LocalWorld {
            world_size,
            barrier: Barrier::new(world_size),
            mailboxes: (0..world_size).map(|_| Mutex::new(None)).collect(),
        });
        Ok((0..world_size)
            .map(|world_rank| Self {
                world: world.clone(),
                world_rank,
            })
            .collect())
    }

    /// A world with a single rank; collectives never block.
    pub fn single() -> Self {
        let world = Arc::new(LocalWorld {
            world_size: 1,
            barrier: Barrier::new(1),
            mailboxes: vec![Mutex::new(None)],
        });
        Self {
            world,
            world_rank: 0,
        }
    }

    #[inline]
    fn mailbox(&self, rank: usize) -> MPIResult<MutexGuard<'_, Option<Box<dyn Any + Send>>>> {
        self.world.mailboxes[rank]
            .lock()
            .map_err(|_| MPIError::PoisonedMailbox(rank))
    }

    /// Copy this rank's chunk out of every peer's mailbox.
    ///
    /// Checks every mailbox before touching `recv`, so all ranks reach the same verdict.
    fn collect<T: Transferable>(&self, chunk_len: usize, recv: &mut [T]) -> MPIResult<()> {
        let expected = recv.len();
        let guards = (0..self.world.world_size)
            .map(|rank| self.mailbox(rank))
            .collect::<MPIResult<Vec<_>>>()?;

        let mut peers = Vec::with_capacity(guards.len());
        for (rank, guard) in guards.iter().enumerate() {
            let peer = guard
                .as_ref()
                .and_then(|posted| posted.downcast_ref::<Vec<T>>())
                .ok_or(MPIError::PeerTypeMismatch { rank })?;
            if peer.len() != expected {
                return Err(MPIError::PeerLengthMismatch {
                    rank,
                    expected,
                    actual: peer.len(),
                });
            }
            peers.push(peer);
        }

        let own = self.world_rank * chunk_len..(self.world_rank + 1) * chunk_len;
        peers
            .iter()
            .zip(recv.chunks_mut(chunk_len.max(1)))
            .for_each(|(peer, slot)| slot.copy_from_slice(&peer[own.clone()]));
        Ok(())
    }
}

impl MPIEngine for LocalConfig {
    /// Threads share an address space; there is no message size limit to work around.
    const CHUNK_SIZE: usize = usize::MAX;

    #[inline(always)]
    fn backend_name(&self) -> &'static str {
        "local"
    }

    #[inline(always)]
    fn world_size(&self) -> usize {
        self.world.world_size
    }

    #[inline(always)]
    fn world_rank(&self) -> usize {
        self.world_rank
    }

    #[inline(always)]
    fn barrier(&self) {
        self.world.barrier.wait();
    }

    fn all_to_all<T: Transferable>(&self, send: &[T], recv: &mut [T]) -> MPIResult<()> {
        let chunk_len = check_exchange_len(self.world_size(), send.len(), recv.len())?;

        *self.mailbox(self.world_rank)? = Some(Box::new(send.to_vec()));
        self.barrier();
        let verdict = self.collect(chunk_len, recv);
        self.barrier();
        *self.mailbox(self.world_rank)? = None;

        verdict
    }
}

/// Run `op` once on every rank of a fresh local world and return the results by rank.
///
/// Ranks run on a dedicated pool with exactly one thread per rank, so blocking collectives never
/// starve each other.
pub fn run_local_world<R, F>(world_size: usize, op: F) -> MPIResult<Vec<R>>
where
    R: Send,
    F: Fn(&LocalConfig) -> R + Sync,
{
    let configs = LocalConfig::new_world(world_size)?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(world_size)
        .thread_name(|rank| format!("local-rank-{rank}"))
        .build()?;
    Ok(pool.broadcast(|ctx| op(&configs[ctx.index()])))
}
