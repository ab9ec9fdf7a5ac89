use log::{debug, info, warn};
use mpi_config::{root_println, MPIEngine};

use crate::{
    generate_payload, report, BarrierTimer, BenchConfig, BenchError, BenchResult, ChunkLayout,
    ConfigError, DType, Element, ExchangeClient, Mode, Verification, Verifier,
};

/// Outcome of one timed and verified exchange. Reported, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult<T> {
    /// 1-based
    pub iteration: usize,
    pub elapsed_ms: f64,
    pub verification: Verification<T>,
}

/// Element-type independent view of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rank: usize,
    pub elapsed_ms: Vec<f64>,
}

impl RunSummary {
    fn new<T>(rank: usize, results: &[IterationResult<T>]) -> Self {
        Self {
            rank,
            elapsed_ms: results.iter().map(|r| r.elapsed_ms).collect(),
        }
    }

    #[inline]
    pub fn iterations(&self) -> usize {
        self.elapsed_ms.len()
    }
}

/// One rank's share of a benchmark run.
///
/// Construction validates the configuration against the world, so a bad configuration fails on
/// every rank before any of them enters a collective.
#[derive(Debug)]
pub struct Benchmark<'a, E: MPIEngine> {
    engine: &'a E,
    config: BenchConfig,
    layout: ChunkLayout,
}

impl<'a, E: MPIEngine> Benchmark<'a, E> {
    pub fn new(engine: &'a E, config: BenchConfig) -> BenchResult<Self> {
        let layout = config.validate(engine.world_size())?;
        debug!(
            "rank {}: validated {:?} into {:?}",
            engine.world_rank(),
            config,
            layout
        );
        Ok(Self {
            engine,
            config,
            layout,
        })
    }

    #[inline(always)]
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    #[inline(always)]
    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// Run with the configured element type
    pub fn run(&self) -> BenchResult<RunSummary> {
        let rank = self.engine.world_rank();
        match self.config.dtype {
            DType::Int32 => self.run_as::<i32>().map(|r| RunSummary::new(rank, &r)),
            DType::Int64 => self.run_as::<i64>().map(|r| RunSummary::new(rank, &r)),
            DType::Float32 => self.run_as::<f32>().map(|r| RunSummary::new(rank, &r)),
        }
    }

    /// Run with element type `T`, which must match the configured dtype.
    ///
    /// Verification failures do not stop the run early: every rank completes the same sequence
    /// of collectives, and a failing rank reports the error after the last barrier.
    pub fn run_as<T: Element>(&self) -> BenchResult<Vec<IterationResult<T>>> {
        if T::DTYPE != self.config.dtype {
            return Err(ConfigError::DTypeMismatch {
                configured: self.config.dtype,
                requested: T::DTYPE,
            }
            .into());
        }

        let rank = self.engine.world_rank();
        let payload = generate_payload::<T>(rank, &self.layout);
        let client = ExchangeClient::new(self.engine, self.layout);
        let mut output = client.allocate_output::<T>();
        let timer = BarrierTimer::new(self.engine);
        let verifier = Verifier::new(rank, self.layout);
        println!("{}", report::payload_line(rank, &self.config, &self.layout));

        let iters = self.config.mode.iterations();
        let mut results = Vec::with_capacity(iters);
        match self.config.mode {
            Mode::Single => {
                self.engine.barrier();
                root_println!(
                    self.engine,
                    "{}",
                    report::header(&self.config, &self.layout, self.engine.backend_name())
                );
                self.engine.barrier();

                results.push(self.run_iteration(
                    1,
                    &client,
                    &timer,
                    &verifier,
                    &payload,
                    &mut output,
                )?);

                self.engine.barrier();
                root_println!(self.engine, "{}", report::footer());
            }
            Mode::Repeated { iters } => {
                println!("{}", report::repeated_plan(rank, &self.config, &self.layout));
                // make sure every rank is ready before the first timed iteration
                self.engine.barrier();

                for iteration in 1..=iters {
                    results.push(self.run_iteration(
                        iteration,
                        &client,
                        &timer,
                        &verifier,
                        &payload,
                        &mut output,
                    )?);
                }

                self.engine.barrier();
                info!("rank {rank}: completed all {iters} iterations");
            }
        }

        let failures = results.iter().filter(|r| !r.verification.is_ok()).count();
        if failures > 0 {
            return Err(BenchError::Verification {
                rank,
                failures,
                iterations: results.len(),
            });
        }
        Ok(results)
    }

    fn run_iteration<T: Element>(
        &self,
        iteration: usize,
        client: &ExchangeClient<'_, E>,
        timer: &BarrierTimer<'_, E>,
        verifier: &Verifier,
        payload: &[T],
        output: &mut [T],
    ) -> BenchResult<IterationResult<T>> {
        let rank = self.engine.world_rank();
        let iters = self.config.mode.iterations();
        debug!("rank {rank}: starting all_to_all {iteration}/{iters}");

        let timed = timer.measure(|| client.exchange(payload, output))?;
        println!(
            "{}",
            report::elapsed_line(rank, iteration, iters, timed.elapsed_ms)
        );

        // no rank inspects its output or moves on while peers are still exchanging
        self.engine.barrier();

        let verification = verifier.verify(output);
        println!("{}", report::verification_line(rank, &verification));
        for mismatch in &verification.mismatches {
            warn!(
                "rank {rank}: iteration {iteration} offset {} expected {} got {}",
                mismatch.offset, mismatch.expected, mismatch.actual
            );
        }

        Ok(IterationResult {
            iteration,
            elapsed_ms: timed.elapsed_ms,
            verification,
        })
    }
}
