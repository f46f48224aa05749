//! One simulated user's authenticated HTTP session.

use reqwest::{Method, Response, StatusCode, redirect};
use serde_json::Value;
use tracing::debug;

use crate::error::{RequestFailure, SessionError};

const CSRF_HEADER: &str = "X-CSRF-Token";

/// How many recent item ids a session remembers.
const RECENT_ITEMS_MAX: usize = 10;

/// Connection coordinates and identity derivation for the target service.
#[derive(Debug, Clone)]
pub struct Target {
    pub base_url: String,
    pub password: String,
    pub user_offset: usize,
}

impl Target {
    /// The password every seeded account in the target database shares.
    pub const DEFAULT_PASSWORD: &'static str = "longpassword";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            password: Self::DEFAULT_PASSWORD.to_owned(),
            user_offset: 0,
        }
    }

    pub fn localhost(port: u16) -> Self {
        Self::new(format!("http://localhost:{port}"))
    }

    pub fn with_user_offset(mut self, offset: usize) -> Self {
        self.user_offset = offset;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// The same offset always maps to the same seeded identity, across runs
    /// and regardless of worker scheduling.
    pub fn username_for(&self, worker: usize) -> String {
        format!("user{}", self.user_offset + worker)
    }
}

/// An authenticated session against the target service.
///
/// Construction runs the whole bootstrap protocol — csrf handshake, the two
/// login submissions, one latest-content query to learn recent item ids —
/// and only hands back a client once all of it succeeded, so a value of
/// this type always represents a logged-in session and a bootstrap error is
/// the session's terminal state.
///
/// Cookies live in this client's own store and the csrf token rides along
/// as a header on every in-session request; neither is shared between
/// workers. Redirects are returned to us rather than followed (the target's
/// 3xx after a post is its way of completing the request) and count as
/// success; cookies are captured from whichever response arrives.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    csrf: String,
    /// Filled once at bootstrap and read-only afterwards: posting new
    /// content does not feed back into it, so "recent" always means
    /// pre-existing seeded content.
    recent_items: Vec<u64>,
}

impl SessionClient {
    /// Establish a session for the identity at `worker` under `target`.
    pub async fn bootstrap(target: &Target, worker: usize) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(SessionError::Client)?;

        let mut session = Self {
            http,
            base_url: target.base_url.clone(),
            username: target.username_for(worker),
            csrf: String::new(),
            recent_items: Vec::new(),
        };
        session.fetch_csrf_token().await?;
        debug!(username = %session.username, "logging in");
        session.login(&target.password).await?;
        session.recent_items = session.fetch_latest().await?;
        Ok(session)
    }

    /// GET the csrf endpoint and remember the token; session cookies land
    /// in the cookie store as a side effect.
    async fn fetch_csrf_token(&mut self) -> Result<(), SessionError> {
        let url = format!("{}/session/csrf.json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SessionError::request(Method::GET, &url, e))?;
        let body: Value = resp.json().await.map_err(|e| SessionError::AuthProtocol {
            reason: format!("csrf response was not json: {e}"),
        })?;

        match body.get("csrf").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                self.csrf = token.to_owned();
                Ok(())
            }
            _ => Err(SessionError::AuthProtocol {
                reason: "csrf field missing from token response".into(),
            }),
        }
    }

    /// The two-step login the target expects: a generic session create,
    /// then the explicit submission with a redirect target. Both are
    /// fire-and-check — transport failures surface as request errors, any
    /// non-2xx/3xx status is a login rejection.
    async fn login(&mut self, password: &str) -> Result<(), SessionError> {
        let login = self.username.clone();
        let resp = self
            .send_form("/session", &[("login", login.as_str()), ("password", password)])
            .await?;
        self.check_login(resp.status())?;

        let redirect_to = format!("{}/", self.base_url);
        let resp = self
            .send_form(
                "/login",
                &[
                    ("login", login.as_str()),
                    ("password", password),
                    ("redirect", redirect_to.as_str()),
                ],
            )
            .await?;
        self.check_login(resp.status())
    }

    fn check_login(&self, status: StatusCode) -> Result<(), SessionError> {
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(SessionError::LoginFailed {
                username: self.username.clone(),
                status,
            })
        }
    }

    /// POST a form, mapping transport failures only; status handling is the
    /// caller's business.
    async fn send_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Response, SessionError> {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .post(&url)
            .header(CSRF_HEADER, &self.csrf)
            .form(form)
            .send()
            .await
            .map_err(|e| SessionError::request(Method::POST, &url, e))
    }

    /// One in-session request carrying the csrf header and cookies.
    ///
    /// 2xx and 3xx both count as success — a redirect response is the
    /// server completing the request its way, and is not re-issued. 4xx/5xx
    /// and transport failures are fatal to the owning worker.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, SessionError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(CSRF_HEADER, &self.csrf);
        if let Some(form) = form {
            req = req.form(form);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| SessionError::request(method.clone(), &url, e))?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(SessionError::RequestFailed {
                method,
                url,
                source: RequestFailure::Status(status),
            });
        }
        Ok(resp)
    }

    /// Read one content item.
    pub async fn read_item(&self, id: u64) -> Result<(), SessionError> {
        self.request(Method::GET, &format!("/t/{id}.json"), None)
            .await
            .map(|_| ())
    }

    /// Reply to an existing topic.
    pub async fn post_reply(&self, topic_id: u64, raw: &str) -> Result<(), SessionError> {
        let topic_id = topic_id.to_string();
        self.request(
            Method::POST,
            "/posts",
            Some(&[("raw", raw), ("topic_id", &topic_id)]),
        )
        .await
        .map(|_| ())
    }

    /// Start a new topic. An empty `category` posts to the default
    /// category.
    pub async fn post_topic(
        &self,
        title: &str,
        raw: &str,
        category: &str,
    ) -> Result<(), SessionError> {
        self.request(
            Method::POST,
            "/posts",
            Some(&[("raw", raw), ("title", title), ("category", category)]),
        )
        .await
        .map(|_| ())
    }

    /// Newest content ids, most recent first, capped at the session's
    /// recent-items limit. A listing without recognizable topics yields an
    /// empty list rather than an error.
    pub async fn fetch_latest(&self) -> Result<Vec<u64>, SessionError> {
        let url = format!("{}/latest.json", self.base_url);
        let resp = self.request(Method::GET, "/latest.json", None).await?;
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SessionError::request(Method::GET, &url, e))?;

        let ids = body
            .pointer("/topic_list/topics")
            .and_then(Value::as_array)
            .map(|topics| {
                topics
                    .iter()
                    .filter_map(|t| t.get("id").and_then(Value::as_u64))
                    .take(RECENT_ITEMS_MAX)
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    /// Spend an action's reserved entropy on picking one known recent item.
    /// `None` when the session knows of none (fresh database) — handlers
    /// fall back to a default instead of erroring.
    pub fn pick_recent(&self, fraction: f64) -> Option<u64> {
        if self.recent_items.is_empty() {
            return None;
        }
        let len = self.recent_items.len();
        let idx = ((fraction * len as f64) as usize).min(len - 1);
        Some(self.recent_items[idx])
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf
    }

    pub fn recent_items(&self) -> &[u64] {
        &self.recent_items
    }
}
