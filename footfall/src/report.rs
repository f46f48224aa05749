//! Reports and Reporters.
//!
//! A [`Report`] turns a raw aggregate into derived, human-oriented numbers;
//! a [`Reporter`] takes a report somewhere (stdout, file, a metrics
//! service). The aggregate keeps every sample, so different reports can
//! derive whatever statistics they need without losing information.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::aggregate::{Aggregate, RunAggregate};

pub trait Report<A>
where
    Self: Send + Sync + Debug + From<A> + Serialize + DeserializeOwned,
    A: Aggregate,
{
}

#[async_trait]
pub trait Reporter<A: Aggregate, R: Report<A>> {
    async fn report(&self, report: R) -> Result<(), Box<dyn std::error::Error>>;
}

/// Latency digest for one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub worker: usize,
    pub count: usize,
    pub mean: Duration,
    pub max: Duration,
}

/// Run digest: totals plus one row per worker, preserving the per-worker
/// grouping callers need for fairness checks across simulated users.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub workers: Vec<WorkerSummary>,
    pub total_count: usize,
    pub mean: Duration,
}

impl From<RunAggregate> for RunReport {
    fn from(agg: RunAggregate) -> Self {
        let mut workers = Vec::new();
        let mut total = Duration::ZERO;
        let mut total_count = 0usize;

        for (worker, samples) in agg.workers() {
            let count = samples.len();
            let sum: Duration = samples.iter().map(|s| s.elapsed).sum();
            let max = samples
                .iter()
                .map(|s| s.elapsed)
                .max()
                .unwrap_or(Duration::ZERO);
            let mean = if count == 0 {
                Duration::ZERO
            } else {
                sum / count as u32
            };
            workers.push(WorkerSummary {
                worker,
                count,
                mean,
                max,
            });
            total += sum;
            total_count += count;
        }

        let mean = if total_count == 0 {
            Duration::ZERO
        } else {
            total / total_count as u32
        };
        Self {
            workers,
            total_count,
            mean,
        }
    }
}

impl Report<RunAggregate> for RunReport {}

pub struct StdoutReporter;

#[async_trait]
impl Reporter<RunAggregate, RunReport> for StdoutReporter {
    async fn report(&self, report: RunReport) -> Result<(), Box<dyn std::error::Error>> {
        println!("{report:#?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{LatencySample, WorkerSeries};

    fn sample(worker: usize, seq: usize, ms: u64) -> LatencySample {
        LatencySample {
            worker,
            seq,
            elapsed: Duration::from_millis(ms),
        }
    }

    #[test]
    fn per_worker_and_overall_means_are_derived_from_raw_samples() {
        let mut agg = RunAggregate::new();
        agg.consume(&WorkerSeries {
            worker: 0,
            samples: vec![sample(0, 0, 10), sample(0, 1, 30)],
        });
        agg.consume(&WorkerSeries {
            worker: 1,
            samples: vec![sample(1, 0, 80)],
        });

        let report = RunReport::from(agg);
        assert_eq!(report.total_count, 3);
        assert_eq!(report.mean, Duration::from_millis(40));
        assert_eq!(report.workers[0].mean, Duration::from_millis(20));
        assert_eq!(report.workers[0].max, Duration::from_millis(30));
        assert_eq!(report.workers[1].count, 1);
    }

    #[test]
    fn empty_runs_report_zeroes_instead_of_dividing_by_nothing() {
        let report = RunReport::from(RunAggregate::new());
        assert_eq!(report.total_count, 0);
        assert_eq!(report.mean, Duration::ZERO);
        assert!(report.workers.is_empty());
    }
}
