//! Test utilities for Meetlist
//!
//! This module provides common fixtures: a fixed reference instant and
//! session builders positioned relative to it.

use crate::session::Session;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// A fixed reference instant, 2025-03-01T12:00:00Z
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixed instant")
}

/// Build a session starting `offset_minutes` after `now` (negative for past)
///
/// The subject and class are derived from the id so records stay
/// distinguishable in assertions.
pub fn session_at(id: &str, now: DateTime<Utc>, offset_minutes: i64) -> Session {
    let mut session = Session::new(
        id,
        format!("Subject {}", id),
        format!("Class {}", id),
        now + Duration::minutes(offset_minutes),
    );
    session.duration = 60.0;
    session.expected_attendees = 20.0;
    session.join_url = Some(format!("https://meet.example.com/{}", id));
    session
}
