use std::{fmt::Display, ops::Range, str::FromStr};

use crate::{ConfigError, DType};

pub const MI_B: usize = 1024 * 1024;

/// Transport the benchmark runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// One process per rank, launched by `mpirun`/`mpiexec`
    Mpi,
    /// One thread per rank inside the current process
    Local,
}

impl Backend {
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Backend::Mpi => "mpi",
            Backend::Local => "local",
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mpi" => Ok(Backend::Mpi),
            "local" => Ok(Backend::Local),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One exchange, one verification
    Single,
    /// `iters` exchanges over the same payload, each timed and verified on its own
    Repeated { iters: usize },
}

impl Mode {
    #[inline]
    pub fn iterations(&self) -> usize {
        match self {
            Mode::Single => 1,
            Mode::Repeated { iters } => *iters,
        }
    }
}

/// Everything a rank needs to take part in a run. All ranks must hold an identical copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub backend: Backend,
    pub dtype: DType,
    /// Bytes sent to each peer
    pub msg_bytes: usize,
    pub mode: Mode,
    /// Set for variants that only make sense with an exact number of ranks
    pub fixed_world_size: Option<usize>,
}

impl BenchConfig {
    pub const DEFAULT_MSG_BYTES: usize = 4 * MI_B;
    pub const DEFAULT_ITERS: usize = 5;
    pub const PAIR_WORLD_SIZE: usize = 2;

    /// A single exchange over any number of ranks
    pub fn single_shot(backend: Backend, dtype: DType, msg_bytes: usize) -> Self {
        Self {
            backend,
            dtype,
            msg_bytes,
            mode: Mode::Single,
            fixed_world_size: None,
        }
    }

    /// Repeated exchanges between exactly two ranks
    pub fn pair(backend: Backend, dtype: DType, msg_bytes: usize, iters: usize) -> Self {
        Self {
            backend,
            dtype,
            msg_bytes,
            mode: Mode::Repeated { iters },
            fixed_world_size: Some(Self::PAIR_WORLD_SIZE),
        }
    }

    #[inline]
    pub fn elements_per_chunk(&self) -> Result<usize, ConfigError> {
        let elem_size = self.dtype.size();
        if self.msg_bytes % elem_size != 0 {
            return Err(ConfigError::IndivisibleMessage {
                msg_bytes: self.msg_bytes,
                elem_size,
            });
        }
        Ok(self.msg_bytes / elem_size)
    }

    /// Check the configuration against the actual world. Must run before any collective call.
    pub fn validate(&self, world_size: usize) -> Result<ChunkLayout, ConfigError> {
        if let Some(expected) = self.fixed_world_size {
            if expected != world_size {
                return Err(ConfigError::WorldSizeMismatch {
                    expected,
                    actual: world_size,
                });
            }
        }
        if self.mode == (Mode::Repeated { iters: 0 }) {
            return Err(ConfigError::ZeroIterations);
        }

        let elements_per_chunk = self.elements_per_chunk()?;
        ChunkLayout::new(world_size, elements_per_chunk)
    }
}

/// How a payload or output buffer splits into per-peer chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    pub world_size: usize,
    pub elements_per_chunk: usize,
}

impl ChunkLayout {
    pub fn new(world_size: usize, elements_per_chunk: usize) -> Result<Self, ConfigError> {
        world_size
            .checked_mul(elements_per_chunk)
            .ok_or(ConfigError::PayloadTooLarge {
                world_size,
                elements_per_chunk,
            })?;
        Ok(Self {
            world_size,
            elements_per_chunk,
        })
    }

    #[inline(always)]
    pub fn total_elems(&self) -> usize {
        self.world_size * self.elements_per_chunk
    }

    /// Range of the chunk associated with `peer`
    #[inline]
    pub fn chunk(&self, peer: usize) -> Range<usize> {
        peer * self.elements_per_chunk..(peer + 1) * self.elements_per_chunk
    }
}
