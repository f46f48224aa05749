//! Collecting per-worker series into a run-wide result.
//!
//! An [`Aggregate`] is a compact, mergeable collector of [`Metric`]s. It
//! should not compute final statistics — averages and percentiles belong in
//! a `Report`, derived from the aggregate after the run. Keep `merge`
//! associative and commutative: worker results arrive in arbitrary order.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::mpsc;

use crate::macros::aggregate;
use crate::metric::{LatencySample, Metric, WorkerSeries};

pub trait Aggregate
where
    Self: Serialize + DeserializeOwned + PartialOrd + PartialEq + Send + Sync + Debug + Clone,
{
    /// The metric type this aggregate summarizes.
    type Metric: Metric;

    /// Create a new, empty instance of the aggregate.
    fn new() -> Self;

    /// Aggregate multiple metrics into the current instance.
    ///
    /// This default implementation calls [`consume`](Self::consume) for
    /// each metric.
    fn aggregate(&mut self, metrics: &[Self::Metric]) {
        metrics.iter().for_each(|m| self.consume(m));
    }

    /// Incorporate a single metric into the aggregate.
    fn consume(&mut self, metric: &Self::Metric);

    /// Combine two different aggregates into one.
    fn merge(&mut self, other: Self);
}

/// Dedicated aggregation task: the single consumer of every worker's
/// reported series.
///
/// Workers hand their finished series over the channel; the pool drops its
/// sender once all workers are spawned, so the task ends exactly when the
/// last worker has reported and the result is only observable after that.
pub async fn aggregator_task<A: Aggregate>(mut rx: mpsc::Receiver<A::Metric>) -> A {
    let mut agg = A::new();
    while let Some(metric) = rx.recv().await {
        agg.consume(&metric);
    }
    agg
}

/// The default run result: every worker's latency series, keyed and
/// iterated in worker-index order. The grouping is preserved rather than
/// flattened so callers can compute per-worker statistics as well as
/// global ones.
#[aggregate]
#[derive(Default)]
pub struct RunAggregate {
    series: BTreeMap<usize, Vec<LatencySample>>,
}

impl RunAggregate {
    /// Ordered view: `(worker index, that worker's samples)`.
    pub fn workers(&self) -> impl Iterator<Item = (usize, &[LatencySample])> {
        self.series.iter().map(|(w, s)| (*w, s.as_slice()))
    }

    /// Number of workers that reported, including empty series.
    pub fn worker_count(&self) -> usize {
        self.series.len()
    }

    pub fn total_samples(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn samples_for(&self, worker: usize) -> Option<&[LatencySample]> {
        self.series.get(&worker).map(Vec::as_slice)
    }
}

impl Aggregate for RunAggregate {
    type Metric = WorkerSeries;

    fn new() -> Self {
        Self::default()
    }

    fn consume(&mut self, metric: &Self::Metric) {
        self.series
            .entry(metric.worker)
            .or_default()
            .extend(metric.samples.iter().cloned());
    }

    fn merge(&mut self, other: Self) {
        for (worker, samples) in other.series {
            self.series.entry(worker).or_default().extend(samples);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn series(worker: usize, count: usize) -> WorkerSeries {
        WorkerSeries {
            worker,
            samples: (0..count)
                .map(|seq| LatencySample {
                    worker,
                    seq,
                    elapsed: Duration::from_millis(10 * (seq as u64 + 1)),
                })
                .collect(),
        }
    }

    #[test]
    fn workers_come_back_in_index_order() {
        let mut agg = RunAggregate::new();
        agg.aggregate(&[series(2, 1), series(0, 3), series(1, 2)]);

        let order: Vec<usize> = agg.workers().map(|(w, _)| w).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(agg.total_samples(), 6);
    }

    #[test]
    fn empty_series_still_registers_the_worker() {
        let mut agg = RunAggregate::new();
        agg.consume(&WorkerSeries::empty(4));

        assert_eq!(agg.worker_count(), 1);
        assert_eq!(agg.samples_for(4), Some(&[][..]));
    }

    #[test]
    fn merge_is_commutative() {
        let mut left = RunAggregate::new();
        left.consume(&series(0, 2));
        let mut right = RunAggregate::new();
        right.consume(&series(1, 1));

        let mut ab = left.clone();
        ab.merge(right.clone());
        let mut ba = right;
        ba.merge(left);

        assert_eq!(ab, ba);
    }

    #[tokio::test]
    async fn aggregator_task_drains_every_worker() {
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(aggregator_task::<RunAggregate>(rx));

        tx.send(series(1, 2)).await.unwrap();
        tx.send(WorkerSeries::empty(0)).await.unwrap();
        drop(tx);

        let agg = handle.await.unwrap();
        assert_eq!(agg.worker_count(), 2);
        assert_eq!(agg.samples_for(1).unwrap().len(), 2);
        assert_eq!(agg.samples_for(0), Some(&[][..]));
    }
}
