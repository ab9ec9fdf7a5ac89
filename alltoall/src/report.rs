//! Human-readable console lines. Not meant to be machine-parsed.

use std::fmt::Debug;

use chrono::Local;

use crate::{BenchConfig, ChunkLayout, LaunchEnv, Verification, MI_B};

#[inline]
pub(crate) fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

#[inline]
fn mib(bytes: usize) -> f64 {
    bytes as f64 / MI_B as f64
}

pub(crate) fn payload_line(rank: usize, config: &BenchConfig, layout: &ChunkLayout) -> String {
    let total_bytes = layout.total_elems() * config.dtype.size();
    format!(
        "[{}] Rank {}: Creating payload with {} elements ({:.2} MiB total, {} elems/msg = {:.2} MiB/msg)",
        timestamp(),
        rank,
        layout.total_elems(),
        mib(total_bytes),
        layout.elements_per_chunk,
        mib(config.msg_bytes),
    )
}

pub(crate) fn header(config: &BenchConfig, layout: &ChunkLayout, backend: &str) -> String {
    format!(
        "\n[{}] === Uniform all_to_all ===\n\
         world_size={}, msg_bytes_per_peer={}, dtype={}, elems_per_msg={}, backend={}",
        timestamp(),
        layout.world_size,
        config.msg_bytes,
        config.dtype,
        layout.elements_per_chunk,
        backend,
    )
}

pub(crate) fn footer() -> String {
    format!("[{}] ================================", timestamp())
}

pub(crate) fn repeated_plan(rank: usize, config: &BenchConfig, layout: &ChunkLayout) -> String {
    format!(
        "[{}] Rank {}: world_size={}, msg_bytes_per_peer={}, dtype={}, total_elems={}, elems_per_peer={}",
        timestamp(),
        rank,
        layout.world_size,
        config.msg_bytes,
        config.dtype,
        layout.total_elems(),
        layout.elements_per_chunk,
    )
}

pub(crate) fn elapsed_line(rank: usize, iteration: usize, iters: usize, elapsed_ms: f64) -> String {
    if iters == 1 {
        format!(
            "[{}] Rank {}: all_to_all completed in {:.2} ms",
            timestamp(),
            rank,
            elapsed_ms
        )
    } else {
        format!(
            "[{}] Rank {}: iteration {}/{} all_to_all took {:.2} ms",
            timestamp(),
            rank,
            iteration,
            iters,
            elapsed_ms
        )
    }
}

pub(crate) fn verification_line<T: Debug>(rank: usize, verification: &Verification<T>) -> String {
    let sample = &verification.sample;
    let status = if verification.is_ok() { "ok" } else { "MISMATCH" };
    format!(
        "[{}] Rank {}: Verification {} - output_numel={} first_vals={:?} last_vals={:?}",
        timestamp(),
        rank,
        status,
        sample.numel,
        sample.first,
        sample.last,
    )
}

fn or_unset(value: Option<usize>) -> String {
    value.map_or_else(|| "unset".to_string(), |v| v.to_string())
}

pub(crate) fn launch_line(rank: usize, env: &LaunchEnv) -> String {
    format!(
        "[{}] Rank {}: Initializing with MASTER_ADDR={}, MASTER_PORT={}, WORLD_SIZE={}, RANK={}, LOCAL_RANK={}",
        timestamp(),
        rank,
        env.master_addr,
        env.master_port,
        or_unset(env.world_size),
        or_unset(env.rank),
        or_unset(env.local_rank),
    )
}
