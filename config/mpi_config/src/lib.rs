//! Process-group handles used by the all-to-all benchmark.
//!
//! - `MPIEngine`: the collective API the benchmark core is written against
//! - `MPIConfig`: the engine backed by a real MPI world (`mpirun`/`mpiexec`)
//! - `LocalConfig`: the engine backed by threads of a single process; each thread is one rank
//!
//! Assumptions shared by all engines
//! 1. Every rank owns its send and receive buffers exclusively.
//! 2. Data moves between ranks only through the collective calls.
//! 3. IMPORTANT!!! Every rank issues the same sequence of collective calls with matching
//!    buffer lengths; otherwise the group hangs or fails.

mod definition;
pub use definition::{check_exchange_len, MPIEngine, Transferable};

mod errors;
pub use errors::{MPIError, MPIResult};

mod local_config;
pub use local_config::{run_local_world, LocalConfig};

mod mpi_config;
pub use mpi_config::MPIConfig;

#[macro_export]
macro_rules! root_println {
    ($config: expr, $($arg:tt)*) => {
        if $config.is_root() {
            println!($($arg)*);
        }
    };
}
