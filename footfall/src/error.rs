//! Error taxonomy for the simulator.
//!
//! The layering mirrors the blast radius: [`SessionError`] is anything that
//! kills one session's protocol exchange, [`WorkerError`] is anything fatal
//! to one worker, and [`PoolError`] is what the caller of a run sees once a
//! worker failure has taken the whole pool down. There are no retries at
//! any layer: a failed request is a failed worker, and a failed worker is a
//! failed run.

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::action::ActionKind;

/// The text generator could not reach the requested length within its
/// sentence budget (degenerate or empty corpus).
#[derive(Debug, Error)]
#[error("text generator ran dry after {attempts} sentences ({produced} of {wanted} chars)")]
pub struct GenerationExhausted {
    pub attempts: usize,
    pub produced: usize,
    pub wanted: usize,
}

/// Why a single HTTP exchange failed.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// A failure inside one simulated session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not build http client: {0}")]
    Client(reqwest::Error),
    /// The csrf handshake response could not be understood.
    #[error("csrf handshake failed: {reason}")]
    AuthProtocol { reason: String },
    /// The target answered the login submission with a rejection status.
    #[error("login as {username:?} rejected with status {status}")]
    LoginFailed { username: String, status: StatusCode },
    /// Transport failure or error status on an in-session request.
    #[error("{method} {url} failed: {source}")]
    RequestFailed {
        method: Method,
        url: String,
        source: RequestFailure,
    },
}

impl SessionError {
    pub(crate) fn request(
        method: Method,
        url: impl Into<String>,
        source: impl Into<RequestFailure>,
    ) -> Self {
        Self::RequestFailed {
            method,
            url: url.into(),
            source: source.into(),
        }
    }
}

/// A failure fatal to one worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The plan named a kind the configured action set does not handle.
    #[error("no handler registered for {kind:?}")]
    UnhandledAction { kind: ActionKind },
}

/// A failure fatal to the whole pool run. Partial latency series from
/// workers that finished before the abort are discarded with it.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The first observed worker failure, in worker-index order.
    #[error("worker {worker} failed: {source}")]
    Aborted { worker: usize, source: WorkerError },
    #[error("worker {worker} panicked")]
    Panicked { worker: usize },
    #[error("result aggregation task failed: {0}")]
    Aggregation(tokio::task::JoinError),
}
