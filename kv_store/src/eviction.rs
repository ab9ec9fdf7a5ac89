use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{info, warn};
use regex::Regex;

use crate::{KvStore, StoreResult};

/// Shared cancellation flag.
///
/// Clones observe the same flag. Waiting on the token returns early once it is cancelled, so a
/// sleeping task stops without finishing its interval.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        // a bool cannot be left half-written, so a poisoned flag is still usable
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`. Returns true if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = cvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionConfig {
    pub pattern: String,
    pub interval: Duration,
}

impl EvictionConfig {
    pub const DEFAULT_PATTERN: &'static str = ".*p2d.*";
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            pattern: Self::DEFAULT_PATTERN.to_string(),
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// What an eviction task did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionStats {
    pub cycles: usize,
    pub removed: usize,
    pub errors: usize,
}

/// Start a background thread that evicts matching keys every `config.interval` until `token`
/// is cancelled.
///
/// The pattern is compiled once up front so an invalid one fails here rather than on every
/// cycle. Store errors during a cycle are logged and counted; the task keeps running.
pub fn spawn_eviction<S>(
    store: Arc<S>,
    config: EvictionConfig,
    token: CancellationToken,
) -> StoreResult<JoinHandle<EvictionStats>>
where
    S: KvStore + ?Sized + 'static,
{
    Regex::new(&config.pattern)?;
    info!(
        "eviction task started, pattern {:?}, interval {:?}",
        config.pattern, config.interval
    );

    let handle = thread::Builder::new()
        .name("kv-eviction".to_string())
        .spawn(move || {
            let mut stats = EvictionStats::default();
            while !token.is_cancelled() {
                stats.cycles += 1;
                match store.remove_by_regex(&config.pattern) {
                    Ok(0) => {}
                    Ok(removed) => {
                        info!("evicted {removed} keys matching {:?}", config.pattern);
                        stats.removed += removed;
                    }
                    Err(e) => {
                        warn!("eviction cycle {} failed: {e}", stats.cycles);
                        stats.errors += 1;
                    }
                }
                if token.wait_timeout(config.interval) {
                    break;
                }
            }
            info!("eviction task stopped after {} cycles", stats.cycles);
            stats
        })?;
    Ok(handle)
}
