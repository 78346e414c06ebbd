use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

/// JSON for one session as the backend sends it, starting
/// `offset_minutes` after `now`
#[allow(dead_code)]
pub fn session_json(id: &str, now: DateTime<Utc>, offset_minutes: i64) -> Value {
    let start = now + Duration::minutes(offset_minutes);
    json!({
        "id": id,
        "sujet": format!("Subject {}", id),
        "classNom": format!("Class {}", id),
        "dateCreation": start.to_rfc3339_opts(SecondsFormat::Secs, true),
        "duration": 60,
        "expectedAttendees": 20,
        "joinUrl": format!("https://meet.example.com/{}", id),
        "starred": false
    })
}

/// Write `contents` to a temporary config.yaml
///
/// The returned `TempDir` must be kept alive for the file to exist.
#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, contents).expect("write config");
    (dir, path)
}
