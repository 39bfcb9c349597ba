use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle action carried by every [`EventRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Create,
    StartOrResume,
    Pause,
    Stop,
    Complete,
}

impl SessionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionAction::Create => "create",
            SessionAction::StartOrResume => "start_or_resume",
            SessionAction::Pause => "pause",
            SessionAction::Stop => "stop",
            SessionAction::Complete => "complete",
        }
    }
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot sent to the event endpoint on each transition.
///
/// Built fresh per transition and never stored or retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: Uuid,
    pub action: SessionAction,
    /// Configured session length; only set on `create`.
    pub duration_sec: Option<u64>,
    pub remaining_sec: Option<u64>,
    #[serde(with = "iso8601_seconds")]
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
}

impl EventRecord {
    /// The record announcing a freshly created session.
    pub fn create(
        session_id: Uuid,
        duration_sec: u64,
        remaining_sec: u64,
        user_id: Option<String>,
    ) -> Self {
        Self {
            session_id,
            action: SessionAction::Create,
            duration_sec: Some(duration_sec),
            remaining_sec: Some(remaining_sec),
            timestamp: Utc::now(),
            user_id,
        }
    }

    /// A record for any non-create transition of an existing session.
    pub fn transition(
        session_id: Uuid,
        action: SessionAction,
        remaining_sec: u64,
        user_id: Option<String>,
    ) -> Self {
        Self {
            session_id,
            action,
            duration_sec: None,
            remaining_sec: Some(remaining_sec),
            timestamp: Utc::now(),
            user_id,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Serialize to the JSON wire payload.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// ISO-8601 UTC timestamps with whole seconds, e.g. `2025-09-22T10:00:00Z`.
mod iso8601_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 22, 10, 0, 0).unwrap()
    }

    #[test]
    fn create_payload_matches_wire_format() {
        let id = Uuid::nil();
        let record = EventRecord::create(id, 1500, 1500, None).with_timestamp(fixed_time());
        let json: serde_json::Value = serde_json::from_slice(&record.to_json().unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "session_id": "00000000-0000-0000-0000-000000000000",
                "action": "create",
                "duration_sec": 1500,
                "remaining_sec": 1500,
                "timestamp": "2025-09-22T10:00:00Z",
                "user_id": null,
            })
        );
    }

    #[test]
    fn transition_payload_has_null_duration() {
        let record = EventRecord::transition(Uuid::new_v4(), SessionAction::Pause, 842, None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["duration_sec"].is_null());
        assert_eq!(json["remaining_sec"], 842);
        assert_eq!(json["action"], "pause");
    }

    #[test]
    fn user_id_is_carried() {
        let record = EventRecord::transition(
            Uuid::new_v4(),
            SessionAction::Stop,
            0,
            Some("user-42".into()),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["user_id"], "user-42");
    }

    #[test]
    fn timestamp_parses_back() {
        let record = EventRecord::transition(Uuid::new_v4(), SessionAction::Complete, 0, None)
            .with_timestamp(fixed_time());
        let parsed: EventRecord = serde_json::from_slice(&record.to_json().unwrap()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn action_names() {
        assert_eq!(SessionAction::StartOrResume.to_string(), "start_or_resume");
        assert_eq!(
            serde_json::to_string(&SessionAction::StartOrResume).unwrap(),
            "\"start_or_resume\""
        );
    }
}
