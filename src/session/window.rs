//! Time-window views over a session collection
//!
//! Everything here is a pure function of its inputs: the caller supplies
//! `now`, nothing reads the clock, and the input slice is never modified.

use crate::session::types::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filter predicate applied to the cache relative to the current instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Every session, unfiltered
    #[default]
    All,
    /// Sessions starting strictly after `now`
    Upcoming,
    /// Sessions that started strictly before `now`
    Past,
}

impl Window {
    /// Returns `true` when a session starting at `date_creation` belongs to
    /// this window at `now`
    ///
    /// A session starting exactly at `now` is neither upcoming nor past.
    pub fn contains(self, date_creation: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Window::All => true,
            Window::Upcoming => date_creation > now,
            Window::Past => date_creation < now,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Window::All => "all",
            Window::Upcoming => "upcoming",
            Window::Past => "past",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Window::All),
            "upcoming" => Ok(Window::Upcoming),
            "past" => Ok(Window::Past),
            other => Err(format!(
                "Invalid window: {}. Must be one of: all, upcoming, past",
                other
            )),
        }
    }
}

/// Return the sessions belonging to `window` at `now`, in input order
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use meetlist::session::{filter_by_window, Session, Window};
///
/// let now = Utc::now();
/// let sessions = vec![
///     Session::new("1", "Algebra", "3B", now + Duration::hours(1)),
///     Session::new("2", "Physics", "TS1", now - Duration::hours(1)),
/// ];
///
/// let upcoming = filter_by_window(&sessions, Window::Upcoming, now);
/// assert_eq!(upcoming.len(), 1);
/// assert_eq!(upcoming[0].id.as_str(), "1");
/// ```
pub fn filter_by_window(sessions: &[Session], window: Window, now: DateTime<Utc>) -> Vec<Session> {
    sessions
        .iter()
        .filter(|s| window.contains(s.date_creation, now))
        .cloned()
        .collect()
}

/// Number of sessions falling into each window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WindowCounts {
    pub all: usize,
    pub upcoming: usize,
    pub past: usize,
}

impl WindowCounts {
    /// Count for a single window
    pub fn get(&self, window: Window) -> usize {
        match window {
            Window::All => self.all,
            Window::Upcoming => self.upcoming,
            Window::Past => self.past,
        }
    }
}

/// Count sessions per window at `now`
pub fn window_counts(sessions: &[Session], now: DateTime<Utc>) -> WindowCounts {
    sessions
        .iter()
        .fold(WindowCounts::default(), |mut counts, session| {
            counts.all += 1;
            if Window::Upcoming.contains(session.date_creation, now) {
                counts.upcoming += 1;
            } else if Window::Past.contains(session.date_creation, now) {
                counts.past += 1;
            }
            counts
        })
}

/// Sort sessions by start instant, earliest first (stable)
pub fn sort_by_start(sessions: &mut [Session]) {
    sessions.sort_by_key(|s| s.date_creation);
}

/// Time remaining before a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUntil {
    /// The start instant is now or in the past
    Started,
    /// Whole hours and remaining whole minutes, floor-truncated
    Remaining { hours: i64, minutes: i64 },
}

impl fmt::Display for TimeUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUntil::Started => f.write_str("Started"),
            TimeUntil::Remaining { hours, minutes } => write!(f, "{}h {}m", hours, minutes),
        }
    }
}

/// Compute the time left until `date_creation`
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use meetlist::session::time_until;
///
/// let now = Utc::now();
/// assert_eq!(time_until(now + Duration::minutes(90), now).to_string(), "1h 30m");
/// assert_eq!(time_until(now - Duration::minutes(1), now).to_string(), "Started");
/// ```
pub fn time_until(date_creation: DateTime<Utc>, now: DateTime<Utc>) -> TimeUntil {
    if date_creation <= now {
        return TimeUntil::Started;
    }

    // num_minutes truncates toward zero, which is floor for a positive delta
    let total_minutes = (date_creation - now).num_minutes();
    TimeUntil::Remaining {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample(now: DateTime<Utc>) -> Vec<Session> {
        vec![
            Session::new("1", "Algebra", "3B", now + Duration::hours(1)),
            Session::new("2", "Physics", "TS1", now - Duration::hours(1)),
            Session::new("3", "History", "2C", now),
            Session::new("4", "Biology", "1A", now + Duration::days(2)),
        ]
    }

    #[test]
    fn test_all_is_identity() {
        let now = t0();
        let sessions = sample(now);
        assert_eq!(filter_by_window(&sessions, Window::All, now), sessions);
    }

    #[test]
    fn test_upcoming_and_past_scenario() {
        let now = t0();
        let cache = vec![
            Session::new("1", "A", "X", now + Duration::hours(1)),
            Session::new("2", "B", "Y", now - Duration::hours(1)),
        ];

        let upcoming = filter_by_window(&cache, Window::Upcoming, now);
        assert_eq!(upcoming, vec![cache[0].clone()]);

        let past = filter_by_window(&cache, Window::Past, now);
        assert_eq!(past, vec![cache[1].clone()]);
    }

    #[test]
    fn test_session_starting_now_is_in_neither_window() {
        let now = t0();
        let sessions = sample(now);

        let upcoming = filter_by_window(&sessions, Window::Upcoming, now);
        let past = filter_by_window(&sessions, Window::Past, now);

        assert!(upcoming.iter().all(|s| s.id.as_str() != "3"));
        assert!(past.iter().all(|s| s.id.as_str() != "3"));
        assert_eq!(upcoming.len() + past.len(), sessions.len() - 1);
    }

    #[test]
    fn test_membership_matches_predicate() {
        let now = t0();
        let sessions = sample(now);
        let upcoming = filter_by_window(&sessions, Window::Upcoming, now);
        let past = filter_by_window(&sessions, Window::Past, now);

        for s in &sessions {
            assert_eq!(upcoming.contains(s), s.date_creation > now);
            assert_eq!(past.contains(s), s.date_creation < now);
        }
    }

    #[test]
    fn test_filter_is_idempotent_and_preserves_order() {
        let now = t0();
        let sessions = sample(now);
        let first = filter_by_window(&sessions, Window::Upcoming, now);
        let second = filter_by_window(&sessions, Window::Upcoming, now);
        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_window_counts() {
        let now = t0();
        let counts = window_counts(&sample(now), now);
        assert_eq!(
            counts,
            WindowCounts {
                all: 4,
                upcoming: 2,
                past: 1
            }
        );
        assert_eq!(counts.get(Window::Past), 1);
    }

    #[test]
    fn test_sort_by_start() {
        let now = t0();
        let mut sessions = sample(now);
        sort_by_start(&mut sessions);
        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1", "4"]);
    }

    #[test]
    fn test_time_until_ninety_minutes() {
        let now = t0();
        assert_eq!(
            time_until(now + Duration::minutes(90), now).to_string(),
            "1h 30m"
        );
    }

    #[test]
    fn test_time_until_started() {
        let now = t0();
        assert_eq!(time_until(now - Duration::minutes(1), now), TimeUntil::Started);
        assert_eq!(time_until(now, now).to_string(), "Started");
    }

    #[test]
    fn test_time_until_truncates_seconds() {
        let now = t0();
        let target = now + Duration::minutes(59) + Duration::seconds(59);
        assert_eq!(time_until(target, now).to_string(), "0h 59m");

        let target = now + Duration::seconds(30);
        assert_eq!(time_until(target, now).to_string(), "0h 0m");
    }

    #[test]
    fn test_time_until_does_not_wrap_days() {
        let now = t0();
        let target = now + Duration::hours(50) + Duration::minutes(5);
        assert_eq!(time_until(target, now).to_string(), "50h 5m");
    }

    #[test]
    fn test_window_parse_and_display() {
        assert_eq!("Upcoming".parse::<Window>().unwrap(), Window::Upcoming);
        assert_eq!(" past ".parse::<Window>().unwrap(), Window::Past);
        assert!("soon".parse::<Window>().is_err());
        assert_eq!(Window::All.to_string(), "all");
        assert_eq!(Window::default(), Window::All);
    }

    #[test]
    fn test_window_yaml_serialization() {
        let yaml = serde_yaml::to_string(&Window::Upcoming).unwrap();
        assert!(yaml.contains("upcoming"));
    }
}
