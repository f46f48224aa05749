//! The options object handed in by the outer provisioning layer.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Run configuration.
///
/// Every field has a default, so a partial (or empty) options document
/// works; the outer layer that provisions the target is free to carry
/// extra fields of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// Base offset into the seeded user table; worker `i` logs in as the
    /// identity at `user_offset + i`.
    pub user_offset: usize,
    /// Seed for plan generation. Same seed, same plan.
    pub random_seed: u64,
    /// Optional pause between consecutive actions of a worker, in seconds.
    pub delay: Option<f64>,
    /// Measured actions across all workers.
    pub iterations: usize,
    /// Actions executed (and discarded) before measurement starts.
    pub warmup_iterations: usize,
    /// Target service port on localhost.
    pub port_num: u16,
    /// Concurrent simulated users.
    pub worker_threads: usize,
    /// Where the outer reporting layer wants artifacts written.
    pub out_dir: PathBuf,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            user_offset: 0,
            random_seed: 1_234_567_890,
            delay: None,
            iterations: 100,
            warmup_iterations: 0,
            port_num: 4567,
            worker_threads: 5,
            out_dir: PathBuf::from("/tmp"),
        }
    }
}

impl SimOptions {
    pub fn delay_duration(&self) -> Option<Duration> {
        self.delay.map(Duration::from_secs_f64)
    }
}
