//! Remote session service abstraction
//!
//! This module defines the [`SessionApi`] trait the registry talks to.
//! Concrete implementations live in submodules:
//!
//! - [`http::HttpSessionApi`] -- bearer-authenticated REST client over
//!   reqwest (`GET /sessions`, `PUT /sessions/{id}`, `DELETE /sessions/{id}`).
//! - [`fake::FakeSessionApi`] -- in-process fake used in tests (cfg(test)
//!   only).
//!
//! Implementations report failures with the variant matching the
//! operation ([`MeetlistError::FetchFailed`], [`MeetlistError::DeleteFailed`],
//! [`MeetlistError::UpdateFailed`]), carrying the server's message when it
//! sent one.

use crate::error::MeetlistError;
use crate::session::{Session, SessionId, SessionPatch};

#[cfg(test)]
pub mod fake;
pub mod http;

pub use http::HttpSessionApi;

/// Result of a session API call
pub type ApiResult<T> = std::result::Result<T, MeetlistError>;

/// The three calls the registry makes against the remote store
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync + std::fmt::Debug {
    /// Read the whole session collection
    async fn list_sessions(&self, token: &str) -> ApiResult<Vec<Session>>;

    /// Delete one session by id
    async fn delete_session(&self, id: &SessionId, token: &str) -> ApiResult<()>;

    /// Replace the patched fields of one session
    async fn update_session(
        &self,
        id: &SessionId,
        patch: &SessionPatch,
        token: &str,
    ) -> ApiResult<()>;
}

/// Which registry operation a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Delete,
    Update,
}

impl Operation {
    /// Generic message used when the server does not provide one
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch sessions",
            Operation::Delete => "Failed to delete session",
            Operation::Update => "Failed to update session",
        }
    }

    /// Build the error variant for this operation
    pub fn fail(self, message: impl Into<String>) -> MeetlistError {
        let message = message.into();
        match self {
            Operation::Fetch => MeetlistError::FetchFailed(message),
            Operation::Delete => MeetlistError::DeleteFailed(message),
            Operation::Update => MeetlistError::UpdateFailed(message),
        }
    }

    /// Build the error variant carrying the server message, or the fallback
    pub fn fail_with_body(self, body: &str) -> MeetlistError {
        match extract_error_message(body) {
            Some(message) => self.fail(message),
            None => self.fail(self.fallback_message()),
        }
    }
}

/// Pull the `error` string out of a JSON error body
///
/// Returns `None` for non-JSON bodies, bodies without an `error` string, and
/// blank messages.
///
/// # Examples
///
/// ```
/// use meetlist::api::extract_error_message;
///
/// assert_eq!(
///     extract_error_message(r#"{"error":"Session not found"}"#),
///     Some("Session not found".to_string())
/// );
/// assert_eq!(extract_error_message("<html>502</html>"), None);
/// ```
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("error")?.as_str()?.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error":"Unauthorized"}"#),
            Some("Unauthorized".to_string())
        );
    }

    #[test]
    fn test_extract_error_message_rejects_blank_and_non_string() {
        assert_eq!(extract_error_message(r#"{"error":"   "}"#), None);
        assert_eq!(extract_error_message(r#"{"error":404}"#), None);
        assert_eq!(extract_error_message(r#"{"message":"nope"}"#), None);
        assert_eq!(extract_error_message(""), None);
    }

    #[test]
    fn test_fail_with_body_uses_fallback() {
        let err = Operation::Delete.fail_with_body("not json");
        assert_eq!(err.kind(), ErrorKind::DeleteFailed);
        assert_eq!(err.message(), "Failed to delete session");
    }

    #[test]
    fn test_fail_with_body_uses_server_message() {
        let err = Operation::Update.fail_with_body(r#"{"error":"Invalid date"}"#);
        assert_eq!(err.kind(), ErrorKind::UpdateFailed);
        assert_eq!(err.message(), "Invalid date");
    }

    #[test]
    fn test_operation_fallbacks() {
        assert_eq!(
            Operation::Fetch.fallback_message(),
            "Failed to fetch sessions"
        );
        assert_eq!(
            Operation::Fetch.fail("x").kind(),
            ErrorKind::FetchFailed
        );
    }
}
