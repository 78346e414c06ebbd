//! Command-line interface definition for Meetlist
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for listing and editing sessions and for managing
//! the stored API token.

use crate::session::{parse_datetime, Window};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Meetlist - virtual-classroom session registry client
///
/// List, reschedule and delete live sessions stored on a remote
/// session service.
#[derive(Parser, Debug, Clone)]
#[command(name = "meetlist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the API base URL from config
    #[arg(long)]
    pub api_url: Option<String>,

    /// Bearer token for the session API (falls back to the keyring)
    #[arg(long, env = "MEETLIST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Meetlist
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List and edit sessions
    Sessions {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Manage the stored API token
    Auth {
        /// Token subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },
}

/// Session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Fetch and list sessions
    List {
        /// Time window: all, upcoming or past
        #[arg(short, long)]
        window: Option<Window>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Change the editable fields of a session
    Update {
        /// Session id
        id: String,

        /// New subject
        #[arg(long)]
        sujet: Option<String>,

        /// New class name
        #[arg(long)]
        class_nom: Option<String>,

        /// New start time (RFC 3339 or YYYY-MM-DDTHH:MM, UTC)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<DateTime<Utc>>,

        /// New duration
        #[arg(long, value_parser = parse_amount_arg)]
        duration: Option<f64>,

        /// New expected attendee count
        #[arg(long, value_parser = parse_amount_arg)]
        expected_attendees: Option<f64>,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}

/// Token subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Store an API token in the OS keyring
    Login {
        /// The bearer token to store
        token: String,
    },

    /// Remove the stored API token
    Logout,

    /// Show whether a token is available
    Status,
}

fn parse_date_arg(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_datetime(value).ok_or_else(|| {
        format!(
            "invalid date '{}': expected RFC 3339 or YYYY-MM-DDTHH:MM",
            value
        )
    })
}

fn parse_amount_arg(value: &str) -> std::result::Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .ok_or_else(|| format!("invalid amount '{}': expected a non-negative number", value))
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            api_url: None,
            token: None,
            verbose: false,
            json_logs: false,
            command: Commands::Sessions {
                command: SessionCommand::List {
                    window: None,
                    json: false,
                },
            },
        }
    }
}
