use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    thread::JoinHandle,
    time::Duration,
};

use alltoall::{
    Backend, BenchConfig, BenchError, BenchResult, Benchmark, DType, LaunchEnv, RunSummary,
};
use clap::{Args, Parser, Subcommand};
use kv_store::{
    smoke_test, spawn_eviction, CancellationToken, EvictionConfig, EvictionStats, HttpStore,
    SmokeReport, StoreResult,
};
use log::{info, warn};
use mpi_config::{run_local_world, MPIConfig, MPIEngine, MPIError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Latency and correctness benchmark for all_to_all", long_about = None)]
pub struct AllToAllArgs {
    /// Uniform, Pinned, or Pair subcommands
    #[clap(subcommand)]
    pub variant: BenchVariant,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Transport: mpi, or local
    #[arg(short, long, default_value = "mpi")]
    pub backend: Backend,

    /// Bytes sent to each peer
    #[arg(short, long, default_value_t = BenchConfig::DEFAULT_MSG_BYTES)]
    pub msg_bytes: usize,

    /// Element type: int32, int64, or float32
    #[arg(short, long, default_value = "float32")]
    pub dtype: DType,

    /// Number of ranks, local backend only
    #[arg(short, long, default_value_t = 2)]
    pub world_size: usize,
}

#[derive(Debug, Subcommand, Clone)]
pub enum BenchVariant {
    /// One exchange over every rank in the world
    Uniform {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Same as uniform, and cross-checks the launcher's RANK/WORLD_SIZE environment
    Pinned {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Repeated exchanges between exactly two ranks
    Pair {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of timed iterations
        #[arg(short, long, default_value_t = BenchConfig::DEFAULT_ITERS)]
        iters: usize,
    },
}

impl BenchVariant {
    pub fn common(&self) -> &CommonArgs {
        match self {
            BenchVariant::Uniform { common }
            | BenchVariant::Pinned { common }
            | BenchVariant::Pair { common, .. } => common,
        }
    }

    pub fn bench_config(&self) -> BenchConfig {
        let common = self.common();
        match self {
            BenchVariant::Uniform { .. } | BenchVariant::Pinned { .. } => {
                BenchConfig::single_shot(common.backend, common.dtype, common.msg_bytes)
            }
            BenchVariant::Pair { iters, .. } => {
                BenchConfig::pair(common.backend, common.dtype, common.msg_bytes, *iters)
            }
        }
    }
}

/// Run one rank's share of the benchmark
pub fn run_rank<E: MPIEngine>(engine: &E, variant: &BenchVariant) -> BenchResult<RunSummary> {
    if let BenchVariant::Pinned { .. } = variant {
        let rank = engine.world_rank();
        let env = LaunchEnv::from_env();
        println!("{}", env.report_line(rank));
        for mismatch in env.mismatches(rank, engine.world_size()) {
            warn!("rank {rank}: {mismatch}");
        }
    }

    Benchmark::new(engine, variant.bench_config())?.run()
}

/// Run every rank this process hosts and return their summaries
pub fn execute(args: &AllToAllArgs) -> BenchResult<Vec<RunSummary>> {
    let common = args.variant.common();
    match common.backend {
        Backend::Mpi => {
            let universe = MPIConfig::init().ok_or(MPIError::AlreadyInitialized)?;
            let world = universe.world();
            let mpi_config = MPIConfig::new(Some(&world));
            if common.world_size != mpi_config.world_size() {
                info!(
                    "--world-size {} ignored, the MPI world has {} ranks",
                    common.world_size,
                    mpi_config.world_size()
                );
            }
            Ok(vec![run_rank(&mpi_config, &args.variant)?])
        }
        Backend::Local => run_local_world(common.world_size, |engine| {
            run_rank(engine, &args.variant)
        })
        .map_err(BenchError::from)?
        .into_iter()
        .collect(),
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP key-value store", long_about = None)]
pub struct StoreServerArgs {
    /// IP host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// IP Port
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,
}

impl StoreServerArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Smoke test and background eviction against a store server", long_about = None)]
pub struct StoreSmokeArgs {
    /// Store server endpoint
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    pub endpoint: String,

    /// Keys matching this regex are evicted every interval
    #[arg(long, default_value = EvictionConfig::DEFAULT_PATTERN)]
    pub pattern: String,

    /// Eviction interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl StoreSmokeArgs {
    pub fn eviction_config(&self) -> EvictionConfig {
        EvictionConfig {
            pattern: self.pattern.clone(),
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

/// A started smoke session: the eviction task is running in the background
pub struct SmokeSession {
    pub report: SmokeReport,
    eviction: JoinHandle<EvictionStats>,
    token: CancellationToken,
}

impl SmokeSession {
    pub fn start(args: &StoreSmokeArgs, token: CancellationToken) -> StoreResult<Self> {
        let store = HttpStore::connect(&args.endpoint)?;
        let eviction = spawn_eviction(
            Arc::new(store.clone()),
            args.eviction_config(),
            token.clone(),
        )?;

        let report = match smoke_test(&store) {
            Ok(report) => report,
            Err(e) => {
                token.cancel();
                let _ = eviction.join();
                return Err(e);
            }
        };
        Ok(Self {
            report,
            eviction,
            token,
        })
    }

    /// Block until the token is cancelled, then stop the eviction task
    pub fn wait(self) -> EvictionStats {
        while !self.token.wait_timeout(Duration::from_secs(1)) {}
        match self.eviction.join() {
            Ok(stats) => stats,
            Err(_) => {
                warn!("eviction task panicked");
                EvictionStats::default()
            }
        }
    }
}
