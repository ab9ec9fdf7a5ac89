use mpi_config::MPIError;
use thiserror::Error;

use crate::DType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("msg_bytes ({msg_bytes}) must be divisible by dtype size ({elem_size})")]
    IndivisibleMessage { msg_bytes: usize, elem_size: usize },

    #[error("this benchmark expects world_size={expected}, but got {actual}")]
    WorldSizeMismatch { expected: usize, actual: usize },

    #[error("iteration count must be positive")]
    ZeroIterations,

    #[error("payload of {world_size} chunks x {elements_per_chunk} elements overflows usize")]
    PayloadTooLarge {
        world_size: usize,
        elements_per_chunk: usize,
    },

    #[error("run requested as {requested} but configured for {configured}")]
    DTypeMismatch { configured: DType, requested: DType },

    #[error("Unknown string `{0}` for dtype")]
    UnknownDType(String),

    #[error("Unknown string `{0}` for backend")]
    UnknownBackend(String),
}

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("collective error: {0}")]
    Collective(#[from] MPIError),

    #[error("buffer holds {actual} elements, the chunk layout needs {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("verification failed on rank {rank} in {failures} of {iterations} iterations")]
    Verification {
        rank: usize,
        failures: usize,
        iterations: usize,
    },
}

pub type BenchResult<T> = std::result::Result<T, BenchError>;
