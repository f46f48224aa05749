//! The closed set of simulated user interactions and their handlers.
//!
//! Kinds are a plain enum; behavior lives in one [`ActionHandler`] per kind,
//! looked up through an [`ActionSet`] registry. Adding an interaction means
//! one new variant and one `register` call — no branching at call sites.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, WorkerError};
use crate::session::SessionClient;

/// Tag for one kind of simulated interaction with the target service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    ReadItem,
    PostReply,
    PostNew,
    FetchLatest,
}

/// One randomized interaction: the kind, a synthesized body, and a unit of
/// reserved entropy for handler-level sub-choices (e.g. which recent item
/// to read). Not every kind consumes `fraction`. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub text: String,
    /// In `[0, 1)`.
    pub fraction: f64,
}

/// Protocol-level behavior of one [`ActionKind`].
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn perform(
        &self,
        session: &mut SessionClient,
        action: &Action,
    ) -> Result<(), SessionError>;
}

/// Registry mapping kinds to handlers.
///
/// Plan generation draws uniformly from [`kinds`](Self::kinds), which come
/// back in a stable order so a seeded plan is reproducible regardless of
/// registration order.
pub struct ActionSet {
    handlers: BTreeMap<ActionKind, Box<dyn ActionHandler>>,
}

impl ActionSet {
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// The default interaction mix: read a recent item, reply to one, start
    /// a topic, pull the latest listing.
    pub fn standard() -> Self {
        let mut set = Self::empty();
        set.register(ActionKind::ReadItem, ReadItem);
        set.register(ActionKind::PostReply, PostReply);
        set.register(ActionKind::PostNew, PostNew);
        set.register(ActionKind::FetchLatest, FetchLatest);
        set
    }

    pub fn register<H: ActionHandler + 'static>(
        &mut self,
        kind: ActionKind,
        handler: H,
    ) -> &mut Self {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Registered kinds, in a stable order.
    pub fn kinds(&self) -> Vec<ActionKind> {
        self.handlers.keys().copied().collect()
    }

    pub fn handler(&self, kind: ActionKind) -> Option<&dyn ActionHandler> {
        self.handlers.get(&kind).map(Box::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Look up and run the handler for `action`.
    pub async fn dispatch(
        &self,
        session: &mut SessionClient,
        action: &Action,
    ) -> Result<(), WorkerError> {
        match self.handler(action.kind) {
            Some(handler) => Ok(handler.perform(session, action).await?),
            None => Err(WorkerError::UnhandledAction { kind: action.kind }),
        }
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionSet").field(&self.kinds()).finish()
    }
}

/// Read one of the session's known recent items, picked with the action's
/// entropy; with nothing known, read the latest listing instead.
pub struct ReadItem;

#[async_trait]
impl ActionHandler for ReadItem {
    async fn perform(
        &self,
        session: &mut SessionClient,
        action: &Action,
    ) -> Result<(), SessionError> {
        match session.pick_recent(action.fraction) {
            Some(id) => session.read_item(id).await,
            None => session.fetch_latest().await.map(|_| ()),
        }
    }
}

/// Reply to a recent item; with nothing known, fall back to posting a new
/// topic in the default (empty) category.
pub struct PostReply;

#[async_trait]
impl ActionHandler for PostReply {
    async fn perform(
        &self,
        session: &mut SessionClient,
        action: &Action,
    ) -> Result<(), SessionError> {
        match session.pick_recent(action.fraction) {
            Some(id) => session.post_reply(id, &action.text).await,
            None => {
                session
                    .post_topic(&title_of(&action.text), &action.text, "")
                    .await
            }
        }
    }
}

/// Start a new topic in the default category, title derived from the body.
pub struct PostNew;

#[async_trait]
impl ActionHandler for PostNew {
    async fn perform(
        &self,
        session: &mut SessionClient,
        action: &Action,
    ) -> Result<(), SessionError> {
        session
            .post_topic(&title_of(&action.text), &action.text, "")
            .await
    }
}

/// Pull the latest-content listing. Consumes no entropy.
pub struct FetchLatest;

#[async_trait]
impl ActionHandler for FetchLatest {
    async fn perform(
        &self,
        session: &mut SessionClient,
        _action: &Action,
    ) -> Result<(), SessionError> {
        session.fetch_latest().await.map(|_| ())
    }
}

fn title_of(text: &str) -> String {
    let line = text.lines().next().unwrap_or("untitled");
    line.chars().take(60).collect()
}
