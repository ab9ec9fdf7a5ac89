use thiserror::Error;

#[derive(Debug, Error)]
pub enum MPIError {
    #[error("send buffer holds {send} elements but receive buffer holds {recv}")]
    BufferLengthMismatch { send: usize, recv: usize },

    #[error("buffer of {len} elements cannot be split evenly across {world_size} ranks")]
    UnevenSplit { len: usize, world_size: usize },

    #[error("rank {rank} posted {actual} elements to the exchange, expected {expected}")]
    PeerLengthMismatch {
        rank: usize,
        expected: usize,
        actual: usize,
    },

    #[error("rank {rank} posted a buffer of a different element type")]
    PeerTypeMismatch { rank: usize },

    #[error("mailbox of rank {0} is poisoned")]
    PoisonedMailbox(usize),

    #[error("world size must be at least 1")]
    EmptyWorld,

    #[error("MPI is already initialized in this process")]
    AlreadyInitialized,

    #[error("failed to build the local rank pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type MPIResult<T> = std::result::Result<T, MPIError>;
