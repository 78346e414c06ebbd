//! Session record and patch types
//!
//! Field names follow the backend's camelCase JSON (`classNom`,
//! `dateCreation`, ...). Dates are held as UTC instants.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque, stable identifier of a session
///
/// The backend may send ids as JSON strings or integers; both are held as
/// their string form and written back as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Create an id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(Self(s)),
            RawId::Int(n) => Ok(Self(n.to_string())),
        }
    }
}

/// A scheduled live virtual-classroom session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier assigned by the backend
    pub id: SessionId,
    /// Subject / title
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sujet: String,
    /// Associated class or group name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub class_nom: String,
    /// Scheduled start instant
    #[serde(with = "flexible_datetime")]
    pub date_creation: DateTime<Utc>,
    /// Duration, in the backend's unit
    #[serde(default, with = "flexible_number")]
    pub duration: f64,
    /// Expected headcount
    #[serde(default, with = "flexible_number")]
    pub expected_attendees: f64,
    /// External URL for joining the live session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_url: Option<String>,
    /// Display-only flag
    #[serde(default)]
    pub starred: bool,
}

impl Session {
    /// Create a session with the required fields; the rest default
    pub fn new(
        id: impl Into<SessionId>,
        sujet: impl Into<String>,
        class_nom: impl Into<String>,
        date_creation: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sujet: sujet.into(),
            class_nom: class_nom.into(),
            date_creation,
            duration: 0.0,
            expected_attendees: 0.0,
            join_url: None,
            starred: false,
        }
    }

    /// Shallow-merge a patch: present fields overwrite, absent fields stay
    pub fn apply_patch(&mut self, patch: &SessionPatch) {
        if let Some(sujet) = &patch.sujet {
            self.sujet = sujet.clone();
        }
        if let Some(class_nom) = &patch.class_nom {
            self.class_nom = class_nom.clone();
        }
        if let Some(date_creation) = patch.date_creation {
            self.date_creation = date_creation;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(expected_attendees) = patch.expected_attendees {
            self.expected_attendees = expected_attendees;
        }
    }
}

/// The mutable subset of a [`Session`]
///
/// Only fields that are `Some` are sent to the server and merged into the
/// cache. `id`, `join_url` and `starred` cannot be changed through a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sujet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_nom: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "flexible_datetime::option"
    )]
    pub date_creation: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "flexible_number::option"
    )]
    pub duration: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "flexible_number::option"
    )]
    pub expected_attendees: Option<f64>,
}

impl SessionPatch {
    /// Returns `true` when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.sujet.is_none()
            && self.class_nom.is_none()
            && self.date_creation.is_none()
            && self.duration.is_none()
            && self.expected_attendees.is_none()
    }

    pub fn with_sujet(mut self, sujet: impl Into<String>) -> Self {
        self.sujet = Some(sujet.into());
        self
    }

    pub fn with_class_nom(mut self, class_nom: impl Into<String>) -> Self {
        self.class_nom = Some(class_nom.into());
        self
    }

    pub fn with_date_creation(mut self, date_creation: DateTime<Utc>) -> Self {
        self.date_creation = Some(date_creation);
        self
    }

    pub fn with_duration(mut self, duration: impl Into<f64>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_expected_attendees(mut self, expected_attendees: impl Into<f64>) -> Self {
        self.expected_attendees = Some(expected_attendees.into());
        self
    }
}

/// Parse a session timestamp
///
/// Accepts RFC 3339 instants (`2025-03-01T09:30:00Z`, with any offset) and
/// naive local forms as produced by HTML datetime inputs
/// (`2025-03-01T09:30`, `2025-03-01T09:30:00`, `2025-03-01 09:30`), the
/// latter taken as UTC.
///
/// # Examples
///
/// ```
/// use meetlist::session::parse_datetime;
///
/// let a = parse_datetime("2025-03-01T09:30:00Z").unwrap();
/// let b = parse_datetime("2025-03-01T09:30").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `null` text fields read as empty strings
fn null_as_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numeric fields of unspecified unit
///
/// Reads integers, fractions, numeric strings and `null` (as 0). Whole
/// values are written back as JSON integers.
mod flexible_number {
    use serde::{de, Deserialize, Deserializer, Serializer};

    // Integers below this are exact in an f64
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Number(f64),
        Text(String),
    }

    fn from_raw<E: de::Error>(raw: RawNumber) -> std::result::Result<f64, E> {
        match raw {
            RawNumber::Number(n) => Ok(n),
            RawNumber::Text(text) if text.trim().is_empty() => Ok(0.0),
            RawNumber::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| E::custom(format!("invalid number: {}", text))),
        }
    }

    pub fn serialize<S: Serializer>(
        value: &f64,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        if value.fract() == 0.0 && value.abs() < MAX_EXACT {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<f64, D::Error> {
        match Option::<RawNumber>::deserialize(deserializer)? {
            Some(raw) => from_raw(raw),
            None => Ok(0.0),
        }
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match value {
                Some(n) => super::serialize(n, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<f64>, D::Error> {
            Option::<RawNumber>::deserialize(deserializer)?
                .map(from_raw)
                .transpose()
        }
    }
}

mod flexible_datetime {
    use super::parse_datetime;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid session date: {}", raw)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match value {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse_datetime(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid session date: {}", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let value = json!({
            "id": "abc123",
            "sujet": "Algebra review",
            "classNom": "3B",
            "dateCreation": "2025-03-01T09:30:00.000Z",
            "duration": 60,
            "expectedAttendees": 25,
            "joinUrl": "https://meet.example.com/abc",
            "starred": true
        });

        let session: Session = serde_json::from_value(value).unwrap();
        assert_eq!(session.id.as_str(), "abc123");
        assert_eq!(session.class_nom, "3B");
        assert_eq!(session.date_creation, at(9, 30));
        assert_eq!(session.duration, 60.0);
        assert_eq!(session.expected_attendees, 25.0);
        assert_eq!(
            session.join_url.as_deref(),
            Some("https://meet.example.com/abc")
        );
        assert!(session.starred);
    }

    #[test]
    fn test_deserialize_numeric_id_and_defaults() {
        let value = json!({
            "id": 42,
            "sujet": "Physics",
            "classNom": "TS1",
            "dateCreation": "2025-03-01T09:30"
        });

        let session: Session = serde_json::from_value(value).unwrap();
        assert_eq!(session.id, SessionId::from(42u64));
        assert_eq!(session.duration, 0.0);
        assert_eq!(session.expected_attendees, 0.0);
        assert!(session.join_url.is_none());
        assert!(!session.starred);
    }

    #[test]
    fn test_deserialize_fractional_and_string_numbers() {
        let value = json!({
            "id": "1",
            "sujet": "Lab",
            "classNom": "2A",
            "dateCreation": "2025-03-01T09:30:00Z",
            "duration": 1.5,
            "expectedAttendees": "24"
        });

        let session: Session = serde_json::from_value(value).unwrap();
        assert_eq!(session.duration, 1.5);
        assert_eq!(session.expected_attendees, 24.0);
    }

    #[test]
    fn test_deserialize_null_fields() {
        let value = json!({
            "id": "1",
            "sujet": null,
            "classNom": null,
            "dateCreation": "2025-03-01T09:30:00Z",
            "duration": null,
            "expectedAttendees": null
        });

        let session: Session = serde_json::from_value(value).unwrap();
        assert_eq!(session.sujet, "");
        assert_eq!(session.class_nom, "");
        assert_eq!(session.duration, 0.0);
        assert_eq!(session.expected_attendees, 0.0);
    }

    #[test]
    fn test_deserialize_rejects_non_numeric_text() {
        let value = json!({
            "id": "1",
            "dateCreation": "2025-03-01T09:30:00Z",
            "duration": "an hour"
        });
        let result: std::result::Result<Session, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_numbers_serialize_whole_values_as_integers() {
        let mut session = Session::new("1", "Lab", "2A", at(9, 30));
        session.duration = 45.0;
        session.expected_attendees = 2.5;
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["duration"], json!(45));
        assert_eq!(value["expectedAttendees"], json!(2.5));
    }

    #[test]
    fn test_deserialize_rejects_bad_date() {
        let value = json!({"id": "1", "dateCreation": "next tuesday"});
        let result: std::result::Result<Session, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let session = Session::new("7", "Chemistry", "1A", at(14, 0));
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["classNom"], "1A");
        assert_eq!(value["dateCreation"], "2025-03-01T14:00:00Z");
        assert_eq!(value["id"], "7");
        assert!(value.get("joinUrl").is_none());
    }

    #[test]
    fn test_parse_datetime_with_offset() {
        let parsed = parse_datetime("2025-03-01T10:30:00+01:00").unwrap();
        assert_eq!(parsed, at(9, 30));
    }

    #[test]
    fn test_parse_datetime_space_separated() {
        assert_eq!(parse_datetime("2025-03-01 09:30"), Some(at(9, 30)));
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = SessionPatch::default().with_sujet("New Title");
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"sujet": "New Title"}));
    }

    #[test]
    fn test_full_patch_serialization() {
        let patch = SessionPatch::default()
            .with_sujet("Algebra")
            .with_class_nom("3B")
            .with_date_creation(at(8, 0))
            .with_duration(45)
            .with_expected_attendees(30);
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            value,
            json!({
                "sujet": "Algebra",
                "classNom": "3B",
                "dateCreation": "2025-03-01T08:00:00Z",
                "duration": 45,
                "expectedAttendees": 30
            })
        );
    }

    #[test]
    fn test_apply_patch_is_shallow() {
        let mut session = Session::new("1", "Old", "2C", at(9, 0));
        session.duration = 30.0;
        session.join_url = Some("https://meet.example.com/x".to_string());
        session.starred = true;
        let before = session.clone();

        session.apply_patch(&SessionPatch::default().with_sujet("New Title"));

        assert_eq!(session.sujet, "New Title");
        assert_eq!(session.class_nom, before.class_nom);
        assert_eq!(session.date_creation, before.date_creation);
        assert_eq!(session.duration, before.duration);
        assert_eq!(session.join_url, before.join_url);
        assert_eq!(session.starred, before.starred);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(SessionPatch::default().is_empty());
        assert!(!SessionPatch::default().with_duration(10).is_empty());
    }
}
