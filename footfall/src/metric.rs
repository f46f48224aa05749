//! Measurement samples produced by workers.

use std::fmt::Debug;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::macros::metric;

/// Samples that the framework collects and aggregates.
/// Metrics can be composed of other metrics as well.
pub trait Metric
where
    Self: Serialize + DeserializeOwned + PartialOrd + PartialEq + Send + Sync + Debug + Clone,
{
}

/// Wall-clock time attributed to one action within one worker's timeline.
///
/// `elapsed` runs from the start of the previous action (or from login
/// completion, for the first action) to the start of this one, so a
/// worker's samples tile its measured time with no gaps and no overlap —
/// these are timeline spans, not per-request timings.
#[metric]
pub struct LatencySample {
    pub worker: usize,
    pub seq: usize,
    pub elapsed: Duration,
}

/// One worker's complete, in-order latency sequence — the unit a worker
/// hands to the aggregator when it finishes its slice. A worker with an
/// empty slice reports an empty series.
#[metric]
pub struct WorkerSeries {
    pub worker: usize,
    pub samples: Vec<LatencySample>,
}

impl WorkerSeries {
    pub fn empty(worker: usize) -> Self {
        Self {
            worker,
            samples: Vec::new(),
        }
    }
}
