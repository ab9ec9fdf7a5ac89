use log::warn;

use crate::report;

/// Rendezvous information a launcher exports to every rank.
///
/// Only reported and cross-checked; rank and world size always come from the process-group
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEnv {
    pub rank: Option<usize>,
    pub world_size: Option<usize>,
    pub local_rank: Option<usize>,
    pub master_addr: String,
    pub master_port: String,
}

impl LaunchEnv {
    pub const DEFAULT_MASTER_ADDR: &'static str = "localhost";
    pub const DEFAULT_MASTER_PORT: &'static str = "29500";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| {
            let value = lookup(key)?;
            match value.trim().parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("ignoring non-numeric {key}={value}");
                    None
                }
            }
        };

        Self {
            rank: number("RANK"),
            world_size: number("WORLD_SIZE"),
            local_rank: number("LOCAL_RANK"),
            master_addr: lookup("MASTER_ADDR")
                .unwrap_or_else(|| Self::DEFAULT_MASTER_ADDR.to_string()),
            master_port: lookup("MASTER_PORT")
                .unwrap_or_else(|| Self::DEFAULT_MASTER_PORT.to_string()),
        }
    }

    /// Console line announcing the rendezvous environment seen by `rank`
    pub fn report_line(&self, rank: usize) -> String {
        report::launch_line(rank, self)
    }

    /// Describe every disagreement between the launcher and the runtime
    pub fn mismatches(&self, rank: usize, world_size: usize) -> Vec<String> {
        let mut found = vec![];
        if let Some(env_rank) = self.rank.filter(|r| *r != rank) {
            found.push(format!("RANK={env_rank} but the runtime assigned rank {rank}"));
        }
        if let Some(env_size) = self.world_size.filter(|s| *s != world_size) {
            found.push(format!(
                "WORLD_SIZE={env_size} but the runtime world has {world_size} ranks"
            ));
        }
        found
    }
}
