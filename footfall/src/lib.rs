//! Footfall — a concurrent synthetic-user load simulator.
//!
//! Footfall drives a target web service with many simultaneous simulated
//! sessions. Each worker owns one authenticated session (cookies, csrf
//! token, a small cache of recently seen content) and replays its slice of
//! a pre-generated action plan — reading items, posting replies, starting
//! topics — while the wall-clock cost of every action is recorded for later
//! analysis. Provisioning the target (runtimes, database seeding, assets)
//! is someone else's job; footfall assumes a reachable service with seeded
//! users and content.
//!
//! # Architecture
//!
//! The main building blocks are:
//!
//! - [`TextGenerator`]: Markov-chain prose for post bodies, trained once on
//!   a fixed corpus and immutable afterwards.
//! - [`ActionPlan`]: the randomized, seeded interaction sequence, generated
//!   once and statically partitioned across workers.
//! - [`ActionSet`]: registry mapping each [`ActionKind`] to its protocol
//!   handler; the plan draws kinds from here and workers dispatch through
//!   it.
//! - [`SessionClient`]: one simulated user's authenticated HTTP session and
//!   the protocol-level operations it can perform.
//! - [`Executor`]: runs a plan. The shipped [`SliceExecutor`] gives every
//!   worker a contiguous chunk and joins them all before reporting.
//! - [`Aggregate`]: a mergeable collector of worker results;
//!   [`RunAggregate`] keeps every latency sample grouped by worker.
//! - [`Report`]/[`Reporter`]: derived statistics and where to send them.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use footfall::{
//!     ActionPlan, ActionSet, RunAggregate, Scenario, SliceExecutor, Target, TextGenerator,
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! #[tokio::main]
//! async fn main() {
//!     let generator = TextGenerator::learn("A corpus. With a few sentences. To learn from.");
//!     let actions = Arc::new(ActionSet::standard());
//!     let mut rng = StdRng::seed_from_u64(1234567890);
//!     let plan = ActionPlan::generate(100, &actions, &generator, &mut rng).unwrap();
//!
//!     let results = Scenario::<RunAggregate, _>::builder()
//!         .name("forum traffic")
//!         .plan(plan)
//!         .target(Target::localhost(4567))
//!         .actions(actions)
//!         .executor(SliceExecutor::builder().workers(5).build())
//!         .build()
//!         .run()
//!         .await
//!         .unwrap();
//!
//!     println!("{} samples", results.total_samples());
//! }
//! ```
//!
//! # Feature flags
//!
//! - `internals`: expose executor internals (the worker loop, execution
//!   context) for building custom executors on the same plumbing.
//!
//! # Where to start
//!
//! - Read the docs for [`Scenario`], [`Executor`], and [`ActionSet`].
//! - See `examples/simulate.rs` for a runnable end-to-end simulation.

/// Action kinds, the handler registry, and the built-in handlers
pub mod action;
/// Metric aggregators
pub mod aggregate;
/// The options object consumed from the outer provisioning layer
pub mod config;
/// Error taxonomy
pub mod error;
/// Orchestrators that define how things will actually run
pub mod executor;
/// Single metrics
pub mod metric;
/// Plan generation and partitioning
pub mod plan;
/// Reports and Reporters
pub mod report;
/// Main module of the framework that glues everything together
pub mod scenario;
/// One simulated user's authenticated session
pub mod session;
/// Markov-chain text synthesis
pub mod text;

pub use action::{Action, ActionKind, ActionSet};
pub use aggregate::{Aggregate, RunAggregate};
pub use config::SimOptions;
pub use error::{PoolError, SessionError, WorkerError};
pub use executor::{Executor, SliceExecutor};
pub use metric::{LatencySample, Metric, WorkerSeries};
pub use plan::ActionPlan;
pub use report::{Report, Reporter, RunReport};
pub use scenario::Scenario;
pub use session::{SessionClient, Target};
pub use text::TextGenerator;

/// Procedural macros to reduce boilerplate
pub mod macros {
    pub use footfall_macros::*;
}
