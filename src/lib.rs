//! Meetlist - virtual-classroom session registry client library
//!
//! This library provides a typed client for a remote session (meeting)
//! registry: it fetches session records over an authenticated REST API,
//! keeps them in a local cache, applies server-confirmed updates and
//! deletions to that cache, and derives time-window views from it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Session records, the caching registry, and window helpers
//! - `api`: Remote service abstraction and its HTTP implementation
//! - `auth`: Bearer token storage in the OS keyring
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use meetlist::{Config, HttpSessionApi, SessionRegistry, Window};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let registry = SessionRegistry::new(Arc::new(HttpSessionApi::new(&config.api)?));
//!     let sessions = registry.fetch_all(Some("token")).await?;
//!     let upcoming = meetlist::filter_by_window(&sessions, Window::Upcoming, chrono::Utc::now());
//!     println!("{} upcoming", upcoming.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use api::{HttpSessionApi, SessionApi};
pub use config::Config;
pub use error::{ErrorKind, MeetlistError, Result};
pub use session::{
    filter_by_window, time_until, Session, SessionId, SessionPatch, SessionRegistry, TimeUntil,
    Window,
};

#[cfg(test)]
pub mod test_utils;
