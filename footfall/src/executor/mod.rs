//! Executor — how a plan actually gets run against the target.
//!
//! The `Executor` trait is the runtime hook that replays a plan under a
//! [`Scenario`]. Executors own concurrency and scheduling; the shipped
//! [`SliceExecutor`] statically partitions the plan into contiguous
//! chunks, one per concurrent simulated user, with no work stealing and no
//! rebalancing. Alternative strategies (rate-governed, distributed) plug
//! in behind the same trait.
pub mod slice;
pub use slice::SliceExecutor;

use crate::{
    aggregate::Aggregate, error::PoolError, metric::WorkerSeries, plan::ActionPlan,
    scenario::Scenario,
};

pub trait Executor<A>
where
    Self: Send + Sync + Sized,
    A: Aggregate<Metric = WorkerSeries>,
{
    /// Replay `plan` under the scenario's target and action set, returning
    /// the merged result once every worker has reported. No partial result
    /// is observable: a failed run yields only the error.
    fn exec(
        &self,
        scenario: &Scenario<A, Self>,
        plan: &ActionPlan,
    ) -> impl Future<Output = Result<A, PoolError>> + Send;
}
