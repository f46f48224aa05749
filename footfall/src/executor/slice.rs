use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use typed_builder::TypedBuilder;

use super::Executor;
use crate::aggregate::{Aggregate, aggregator_task};
use crate::error::PoolError;
use crate::metric::WorkerSeries;
use crate::plan::ActionPlan;
use crate::scenario::Scenario;
use internals::*;

/// Number of concurrent simulated users when none is configured.
pub const DEFAULT_WORKERS: usize = 5;

/// Executor that splits the plan into contiguous, roughly equal chunks and
/// replays each chunk under its own authenticated session.
///
/// - One task per worker; worker `i` owns slice `i` and the seeded
///   identity at `user_offset + i`. Everything session-scoped (cookies,
///   csrf token, recent items) is exclusively that worker's.
/// - The partition is fixed before any worker starts — no work stealing,
///   no rebalancing — so it cannot depend on scheduling order.
/// - The first worker failure flips a shared shutdown flag; the remaining
///   workers finish their in-flight request and stop at the next check.
///   The failed run reports only the error, never partial latencies.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SliceExecutor {
    #[builder(default = DEFAULT_WORKERS)]
    pub workers: usize,
    /// Optional pause between consecutive actions of one worker.
    #[builder(default)]
    pub delay: Option<Duration>,
}

impl<A> Executor<A> for SliceExecutor
where
    A: Aggregate<Metric = WorkerSeries> + 'static,
{
    async fn exec(&self, scenario: &Scenario<A, Self>, plan: &ActionPlan) -> Result<A, PoolError> {
        if plan.is_empty() {
            return Ok(A::new());
        }
        let workers = self.workers.max(1);

        let (results, rx) = mpsc::channel(workers);
        let collector = tokio::spawn(aggregator_task::<A>(rx));
        let ctx = ExecutionContext {
            target: scenario.target.clone(),
            actions: Arc::clone(&scenario.actions),
            delay: self.delay,
            shutdown: Arc::new(AtomicBool::new(false)),
            results,
        };

        tracing::info!(workers, actions = plan.len(), "spawning workers");
        let handles = spawn_workers(&ctx, plan, workers);
        drop(ctx);

        let mut first_failure = None;
        for (worker, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(source)) => {
                    first_failure.get_or_insert(PoolError::Aborted { worker, source });
                }
                Err(_) => {
                    first_failure.get_or_insert(PoolError::Panicked { worker });
                }
            }
        }
        if let Some(failure) = first_failure {
            // Series from workers that did finish go down with the
            // collector; a failed run has no latencies to offer.
            collector.abort();
            return Err(failure);
        }

        tracing::info!("all workers reported");
        collector.await.map_err(PoolError::Aggregation)
    }
}

#[cfg(feature = "internals")]
pub use internals::*;

mod internals {
    use tokio::task::JoinHandle;
    use tokio::time::Instant;

    use super::*;
    use crate::action::{Action, ActionSet};
    use crate::error::WorkerError;
    use crate::metric::LatencySample;
    use crate::session::{SessionClient, Target};

    /// Everything a worker task needs; cheap to clone per worker.
    #[derive(Clone)]
    pub struct ExecutionContext {
        pub target: Target,
        pub actions: Arc<ActionSet>,
        pub delay: Option<Duration>,
        pub shutdown: Arc<AtomicBool>,
        pub results: mpsc::Sender<WorkerSeries>,
    }

    /// Spawn one task per worker, each owning its contiguous slice.
    pub fn spawn_workers(
        ctx: &ExecutionContext,
        plan: &ActionPlan,
        workers: usize,
    ) -> Vec<JoinHandle<Result<(), WorkerError>>> {
        (0..workers)
            .map(|worker| {
                let ctx = ctx.clone();
                let slice = plan.slice(worker, workers).to_vec();
                tokio::spawn(run_worker(worker, slice, ctx))
            })
            .collect()
    }

    /// One worker: bootstrap a session, replay the slice in order, report
    /// the latency series.
    ///
    /// Latency is measured start-to-start — each sample spans from the
    /// previous action's start (login completion for the first) to this
    /// one's — so a worker's samples tile its measured time exactly.
    pub async fn run_worker(
        worker: usize,
        slice: Vec<Action>,
        ctx: ExecutionContext,
    ) -> Result<(), WorkerError> {
        if slice.is_empty() {
            // More workers than work: nothing to do, no session, no I/O.
            let _ = ctx.results.send(WorkerSeries::empty(worker)).await;
            return Ok(());
        }

        let mut session = match SessionClient::bootstrap(&ctx.target, worker).await {
            Ok(session) => session,
            Err(err) => {
                ctx.shutdown.store(true, Ordering::Relaxed);
                return Err(err.into());
            }
        };
        tracing::info!(worker, username = session.username(), "session ready");

        let mut samples = Vec::with_capacity(slice.len());
        let mut previous = Instant::now();
        for (seq, action) in slice.iter().enumerate() {
            if ctx.shutdown.load(Ordering::Relaxed) {
                // Another worker went down; stop between actions, never
                // mid-request.
                return Ok(());
            }
            if let Err(err) = ctx.actions.dispatch(&mut session, action).await {
                ctx.shutdown.store(true, Ordering::Relaxed);
                return Err(err);
            }
            let now = Instant::now();
            samples.push(LatencySample {
                worker,
                seq,
                elapsed: now - previous,
            });
            previous = now;
            if let Some(delay) = ctx.delay {
                tokio::time::sleep(delay).await;
            }
        }

        let _ = ctx.results.send(WorkerSeries { worker, samples }).await;
        Ok(())
    }
}
