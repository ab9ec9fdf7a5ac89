use std::process::exit;

use bin::executor::*;
use clap::Parser;
use log::{error, info};

fn main() {
    // launch env mismatches and verification mismatches are warnings
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = AllToAllArgs::parse();

    match execute(&args) {
        Ok(summaries) => {
            for summary in summaries {
                info!(
                    "rank {}: {} iteration(s), {:?} ms",
                    summary.rank,
                    summary.iterations(),
                    summary.elapsed_ms
                );
            }
        }
        Err(e) => {
            error!("{e}");
            eprintln!("alltoall-bench failed: {e}");
            exit(1);
        }
    }
}
