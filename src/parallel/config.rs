use serde::{Deserialize, Serialize};

use super::error::{Result, TransformError};

/// Rendezvous buffer size used when nothing else is configured.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Worker threads per CPU core when `max_workers` is 0 (auto-detect).
/// Transforms are often I/O bound, so the pool oversubscribes the cores.
pub const AUTO_WORKERS_PER_CORE: usize = 4;

/// Lower bound for the auto-detected pool size.
pub const MIN_AUTO_WORKERS: usize = 8;

/// Configuration for a transform group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Maximum produced-but-undelivered values (rendezvous channel capacity)
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Maximum worker threads running tasks at once (0 = auto-detect)
    #[serde(default)]
    pub max_workers: usize,
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            max_workers: 0,
        }
    }
}

impl GroupConfig {
    /// Config with an explicit buffer size; zero is bumped to one.
    pub fn with_max_in_flight(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            ..Self::default()
        }
    }

    /// Cap the worker pool; 0 restores auto-detection.
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Worker threads to start for `task_count` tasks.
    ///
    /// Never more threads than tasks. Each task still runs exactly once; the
    /// pool only bounds how many run at the same moment.
    pub fn effective_workers(&self, task_count: usize) -> usize {
        let cap = if self.max_workers > 0 {
            self.max_workers
        } else {
            (num_cpus::get() * AUTO_WORKERS_PER_CORE).max(MIN_AUTO_WORKERS)
        };
        cap.min(task_count)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 {
            return Err(TransformError::InvalidConfig(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
