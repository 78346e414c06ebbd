//! Error types for Meetlist
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Meetlist operations
///
/// Registry operations surface one of the `*Failed` variants, each carrying
/// a human-readable message (the server's when it supplied one). The
/// remaining variants cover configuration, credentials, and I/O.
#[derive(Error, Debug)]
pub enum MeetlistError {
    /// Reading the session collection failed
    #[error("Failed to fetch sessions: {0}")]
    FetchFailed(String),

    /// Deleting a session failed
    #[error("Failed to delete session: {0}")]
    DeleteFailed(String),

    /// Updating a session failed
    #[error("Failed to update session: {0}")]
    UpdateFailed(String),

    /// The operation was cancelled before the server answered
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No bearer token could be resolved
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Coarse classification of a [`MeetlistError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FetchFailed,
    DeleteFailed,
    UpdateFailed,
    Cancelled,
    Config,
    MissingCredentials,
    Io,
    Serialization,
    Http,
    Keyring,
}

impl MeetlistError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FetchFailed(_) => ErrorKind::FetchFailed,
            Self::DeleteFailed(_) => ErrorKind::DeleteFailed,
            Self::UpdateFailed(_) => ErrorKind::UpdateFailed,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config(_) => ErrorKind::Config,
            Self::MissingCredentials(_) => ErrorKind::MissingCredentials,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) | Self::Yaml(_) => ErrorKind::Serialization,
            Self::Http(_) => ErrorKind::Http,
            Self::Keyring(_) => ErrorKind::Keyring,
        }
    }

    /// Returns the bare message without the kind prefix
    ///
    /// This is the text shown in a banner: for registry failures it is the
    /// server-provided message or the generic fallback.
    pub fn message(&self) -> String {
        match self {
            Self::FetchFailed(m) | Self::DeleteFailed(m) | Self::UpdateFailed(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for Meetlist operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
