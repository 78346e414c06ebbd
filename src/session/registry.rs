//! Session registry client
//!
//! [`SessionRegistry`] owns the local cache of session records together
//! with the `loading` flag, the fetch error slot and the mutation notice
//! slot. `loading` stays set while any fetch is in flight. The cache only
//! changes after the server has confirmed an operation:
//!
//! - `fetch_all` replaces the whole cache with the server's collection.
//! - `delete_session` removes the matching record.
//! - `update_session` shallow-merges the patch into the matching record.
//!
//! The registry is cheap to clone; clones share state. Operations take
//! `&self` and may overlap. Each one applies its effect under a single
//! write lock, so readers never observe a partially applied change. When
//! two operations race on the same record, whichever completes last wins
//! until the next `fetch_all`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiResult, SessionApi};
use crate::error::MeetlistError;
use crate::session::types::{Session, SessionId, SessionPatch};

/// Severity of a [`Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    /// Returns `true` once the notice is older than `ttl` at `now`
    pub fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        match ttl {
            Some(ttl) => now - self.raised_at >= ttl,
            None => false,
        }
    }
}

/// Point-in-time copy of everything the rendering layer reads
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub sessions: Vec<Session>,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Default)]
struct RegistryState {
    sessions: Vec<Session>,
    fetches_in_flight: usize,
    error: Option<Notice>,
    notice: Option<Notice>,
}

/// Client-side registry of session records
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use meetlist::api::HttpSessionApi;
/// use meetlist::config::Config;
/// use meetlist::session::{SessionRegistry, Window, filter_by_window};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let api = HttpSessionApi::new(&config.api)?;
/// let registry = SessionRegistry::new(Arc::new(api));
///
/// let sessions = registry.fetch_all(Some("my-token")).await?;
/// let upcoming = filter_by_window(&sessions, Window::Upcoming, chrono::Utc::now());
/// println!("{} upcoming sessions", upcoming.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    api: Arc<dyn SessionApi>,
    state: Arc<RwLock<RegistryState>>,
    cancellation: Arc<Mutex<CancellationToken>>,
    banner_ttl: Option<Duration>,
}

impl SessionRegistry {
    /// Create an empty registry backed by `api`
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(RegistryState::default())),
            cancellation: Arc::new(Mutex::new(CancellationToken::new())),
            banner_ttl: None,
        }
    }

    /// Auto-clear the error and notice slots after `seconds`; `0` keeps them
    /// until replaced or cleared
    pub fn with_banner_ttl(mut self, seconds: u64) -> Self {
        self.banner_ttl = match seconds {
            0 => None,
            s => Some(Duration::seconds(s as i64)),
        };
        self
    }

    /// Replace the cache with the server's session collection
    ///
    /// A missing or blank `token` makes this a no-op: nothing is sent and
    /// the current cache is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MeetlistError::FetchFailed`] when the server rejects the
    /// request or cannot be reached, and [`MeetlistError::Cancelled`] when
    /// [`cancel_in_flight`](Self::cancel_in_flight) was called meanwhile.
    pub async fn fetch_all(&self, token: Option<&str>) -> ApiResult<Vec<Session>> {
        let Some(token) = usable_token(token) else {
            tracing::debug!("No auth token; skipping session fetch");
            return Ok(self.sessions());
        };

        let cancellation = self.current_cancellation();
        {
            let mut state = self.write_state();
            state.error = None;
            state.fetches_in_flight += 1;
        }

        let result = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(MeetlistError::Cancelled),
            result = self.api.list_sessions(token) => result,
        };

        let mut state = self.write_state();
        state.fetches_in_flight = state.fetches_in_flight.saturating_sub(1);
        match result {
            Ok(sessions) => {
                let sessions = dedupe_by_id(sessions);
                tracing::info!("Session cache replaced with {} records", sessions.len());
                state.sessions = sessions.clone();
                state.error = None;
                Ok(sessions)
            }
            Err(MeetlistError::Cancelled) => {
                tracing::debug!("Session fetch cancelled");
                Err(MeetlistError::Cancelled)
            }
            Err(e) => {
                tracing::warn!("Session fetch failed: {}", e);
                state.error = Some(Notice::new(NoticeLevel::Error, e.message()));
                Err(e)
            }
        }
    }

    /// Delete a session on the server, then drop it from the cache
    ///
    /// Existence is not checked beforehand. If the id is not cached, the
    /// cache is left as is once the server confirms.
    ///
    /// # Errors
    ///
    /// Returns [`MeetlistError::DeleteFailed`] on server or transport
    /// failure, [`MeetlistError::MissingCredentials`] for a blank token, and
    /// [`MeetlistError::Cancelled`] on cancellation. The cache is untouched
    /// in every error case.
    pub async fn delete_session(&self, id: &SessionId, token: &str) -> ApiResult<()> {
        let token = self.require_token(token)?;
        let cancellation = self.current_cancellation();

        let result = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(MeetlistError::Cancelled),
            result = self.api.delete_session(id, token) => result,
        };

        let mut state = self.write_state();
        match result {
            Ok(()) => {
                let before = state.sessions.len();
                state.sessions.retain(|s| &s.id != id);
                tracing::info!(
                    "Session {} deleted ({} removed from cache)",
                    id,
                    before - state.sessions.len()
                );
                state.notice = Some(Notice::new(NoticeLevel::Success, "Session deleted"));
                Ok(())
            }
            Err(e) => Err(record_mutation_failure(&mut state, e)),
        }
    }

    /// Send a patch to the server, then merge it into the cached record
    ///
    /// Fields absent from the patch keep their cached values. If the id is
    /// not cached, the cache is left as is once the server confirms.
    ///
    /// # Errors
    ///
    /// Returns [`MeetlistError::UpdateFailed`] on server or transport
    /// failure, [`MeetlistError::MissingCredentials`] for a blank token, and
    /// [`MeetlistError::Cancelled`] on cancellation. The cache is untouched
    /// in every error case.
    pub async fn update_session(
        &self,
        id: &SessionId,
        patch: &SessionPatch,
        token: &str,
    ) -> ApiResult<()> {
        let token = self.require_token(token)?;
        let cancellation = self.current_cancellation();

        let result = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(MeetlistError::Cancelled),
            result = self.api.update_session(id, patch, token) => result,
        };

        let mut state = self.write_state();
        match result {
            Ok(()) => {
                match state.sessions.iter_mut().find(|s| &s.id == id) {
                    Some(session) => {
                        session.apply_patch(patch);
                        tracing::info!("Session {} updated in cache", id);
                    }
                    None => tracing::debug!("Updated session {} is not cached", id),
                }
                state.notice = Some(Notice::new(NoticeLevel::Success, "Session updated"));
                Ok(())
            }
            Err(e) => Err(record_mutation_failure(&mut state, e)),
        }
    }

    /// Abort every operation started before this call
    ///
    /// Aborted operations return [`MeetlistError::Cancelled`] without
    /// touching the cache. Later operations run normally.
    pub fn cancel_in_flight(&self) {
        let mut guard = self
            .cancellation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.cancel();
        *guard = CancellationToken::new();
        tracing::debug!("Cancelled in-flight session operations");
    }

    /// Copy of the cached sessions
    pub fn sessions(&self) -> Vec<Session> {
        self.read_state().sessions.clone()
    }

    /// Copy of one cached session
    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.read_state()
            .sessions
            .iter()
            .find(|s| &s.id == id)
            .cloned()
    }

    /// Whether any fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.read_state().fetches_in_flight > 0
    }

    /// The current fetch error message, unless it has expired
    pub fn error(&self) -> Option<String> {
        self.error_at(Utc::now())
    }

    /// The fetch error message as seen at `now`
    pub fn error_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.read_state()
            .error
            .as_ref()
            .filter(|n| !n.is_expired(self.banner_ttl, now))
            .map(|n| n.message.clone())
    }

    /// The latest delete/update outcome, unless it has expired
    pub fn notice(&self) -> Option<Notice> {
        self.notice_at(Utc::now())
    }

    /// The latest delete/update outcome as seen at `now`
    pub fn notice_at(&self, now: DateTime<Utc>) -> Option<Notice> {
        self.read_state()
            .notice
            .clone()
            .filter(|n| !n.is_expired(self.banner_ttl, now))
    }

    /// Forget the current fetch error
    pub fn clear_error(&self) {
        self.write_state().error = None;
    }

    /// Forget the current notice
    pub fn clear_notice(&self) {
        self.write_state().notice = None;
    }

    /// Everything the rendering layer needs, read under one lock
    pub fn snapshot(&self) -> RegistrySnapshot {
        let now = Utc::now();
        let state = self.read_state();
        RegistrySnapshot {
            sessions: state.sessions.clone(),
            loading: state.fetches_in_flight > 0,
            error: state
                .error
                .as_ref()
                .filter(|n| !n.is_expired(self.banner_ttl, now))
                .map(|n| n.message.clone()),
            notice: state
                .notice
                .clone()
                .filter(|n| !n.is_expired(self.banner_ttl, now)),
        }
    }

    fn require_token<'a>(&self, token: &'a str) -> ApiResult<&'a str> {
        usable_token(Some(token)).ok_or_else(|| {
            MeetlistError::MissingCredentials("an auth token is required".to_string())
        })
    }

    fn current_cancellation(&self) -> CancellationToken {
        self.cancellation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn usable_token(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

fn record_mutation_failure(state: &mut RegistryState, error: MeetlistError) -> MeetlistError {
    if !matches!(error, MeetlistError::Cancelled) {
        tracing::warn!("{}", error);
        state.notice = Some(Notice::new(NoticeLevel::Error, error.message()));
    }
    error
}

fn dedupe_by_id(sessions: Vec<Session>) -> Vec<Session> {
    let mut seen = HashSet::with_capacity(sessions.len());
    sessions
        .into_iter()
        .filter(|s| {
            let fresh = seen.insert(s.id.clone());
            if !fresh {
                tracing::warn!("Dropping duplicate session id {} from server response", s.id);
            }
            fresh
        })
        .collect()
}
