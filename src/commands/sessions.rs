//! Session commands for Meetlist
//!
//! `list` fetches the collection, applies a time window and prints a table
//! or JSON. `update` and `delete` load the cache first so the confirmed
//! mutation is reflected in what gets printed afterwards.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use prettytable::{format, row, Table};

use crate::api::HttpSessionApi;
use crate::config::Config;
use crate::error::{MeetlistError, Result};
use crate::session::{
    filter_by_window, sort_by_start, time_until, window_counts, NoticeLevel, Session, SessionId,
    SessionPatch, SessionRegistry, TimeUntil, Window,
};

/// Build a registry backed by the configured HTTP API
pub fn build_registry(config: &Config) -> Result<SessionRegistry> {
    let api = HttpSessionApi::new(&config.api)?;
    Ok(SessionRegistry::new(Arc::new(api)).with_banner_ttl(config.display.banner_ttl_seconds))
}

/// Fetch sessions and print the requested window
///
/// Without a token nothing is fetched and the (empty) cache is printed.
///
/// # Errors
///
/// Returns error if the fetch fails or JSON output cannot be produced
pub async fn list_sessions(
    config: &Config,
    token: Option<&str>,
    window: Option<Window>,
    json: bool,
) -> Result<()> {
    let window = window.unwrap_or(config.display.default_window);
    let registry = build_registry(config)?;

    if token.is_none() {
        tracing::warn!("No API token available; run `meetlist auth login <TOKEN>` or pass --token");
    }

    let sessions = registry.fetch_all(token).await?;
    let now = Utc::now();

    let mut visible = filter_by_window(&sessions, window, now);
    sort_by_start(&mut visible);

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("{}", format!("No {} sessions found.", window).yellow());
    } else {
        render_table(&visible, now, &config.display.time_format).printstd();
    }

    let counts = window_counts(&sessions, now);
    println!(
        "\n{} all, {} upcoming, {} past (showing {})",
        counts.all,
        counts.upcoming,
        counts.past,
        window.to_string().cyan()
    );
    Ok(())
}

/// Apply a patch to one session and print the updated record
///
/// # Errors
///
/// Returns error if no token is available, the patch is empty, or the
/// server rejects the update
pub async fn update_session(
    config: &Config,
    token: Option<&str>,
    id: &str,
    patch: SessionPatch,
) -> Result<()> {
    if patch.is_empty() {
        return Err(MeetlistError::Config(
            "nothing to update: pass at least one of --sujet, --class-nom, --date, \
             --duration, --expected-attendees"
                .to_string(),
        )
        .into());
    }

    let token = require_token(token)?;
    let registry = build_registry(config)?;
    registry.fetch_all(Some(token)).await?;

    let id = SessionId::new(id);
    let outcome = registry.update_session(&id, &patch, token).await;
    print_notice(&registry);
    outcome?;

    if let Some(session) = registry.get(&id) {
        render_table(&[session], Utc::now(), &config.display.time_format).printstd();
    }
    Ok(())
}

/// Delete one session
///
/// # Errors
///
/// Returns error if no token is available or the server rejects the delete
pub async fn delete_session(config: &Config, token: Option<&str>, id: &str) -> Result<()> {
    let token = require_token(token)?;
    let registry = build_registry(config)?;
    registry.fetch_all(Some(token)).await?;

    let outcome = registry.delete_session(&SessionId::new(id), token).await;
    print_notice(&registry);
    outcome?;

    println!("{} sessions remaining", registry.sessions().len());
    Ok(())
}

fn require_token(token: Option<&str>) -> Result<&str> {
    token.ok_or_else(|| {
        MeetlistError::MissingCredentials(
            "run `meetlist auth login <TOKEN>` or pass --token".to_string(),
        )
        .into()
    })
}

fn print_notice(registry: &SessionRegistry) {
    if let Some(notice) = registry.notice() {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message.green()),
            NoticeLevel::Error => eprintln!("{}", notice.message.red()),
        }
    }
}

/// Build the session table shown by `list`, `update`
pub fn render_table(sessions: &[Session], now: DateTime<Utc>, time_format: &str) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(row![
        "ID".bold(),
        "Subject".bold(),
        "Class".bold(),
        "Starts".bold(),
        "Duration".bold(),
        "Attendees".bold(),
        "Starts in".bold(),
        "★".bold()
    ]);

    for session in sessions {
        let starts_in = match time_until(session.date_creation, now) {
            TimeUntil::Started => "Started".dimmed(),
            remaining => remaining.to_string().green(),
        };
        let starred = if session.starred { "★" } else { "" };

        table.add_row(row![
            session.id.as_str().cyan(),
            truncate(&session.sujet, 40),
            session.class_nom,
            format_start(session.date_creation, time_format),
            session.duration,
            session.expected_attendees,
            starts_in,
            starred
        ]);
    }

    table
}

/// Format a start time, falling back to RFC 3339 when `time_format` has
/// specifiers chrono cannot render
fn format_start(date: DateTime<Utc>, time_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(time_format)).is_err() {
        tracing::warn!("Cannot render time format {:?}; using RFC 3339", time_format);
        return date.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
