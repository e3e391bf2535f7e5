use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display label carried by every break session.
pub const BREAK_TASK_LABEL: &str = "Break";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Work,
    Break,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Break => "break",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Completed,
    Incomplete,
    NotApplicable,
}

/// One scheduled work or break interval within a day's schedule.
///
/// Sessions are only created by the partitioner; after that, `status`,
/// `distraction_count` and `task` change through whole-sequence replacement
/// in the store, addressed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub task: String,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub distraction_count: u32,
}

impl Session {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "session.id")?;
        validate_non_empty(&self.task, "session.task")?;
        if self.end_at <= self.start_at {
            return Err("session.end_at must be after session.start_at".to_string());
        }
        if self.kind == SessionKind::Break && self.distraction_count != 0 {
            return Err("session.distraction_count must be 0 for break sessions".to_string());
        }
        Ok(())
    }
}

/// Stable identity for a session: kind, ordinal position in the sequence
/// and start instant. Regenerating the same inputs reproduces the same ids.
pub fn session_id(kind: SessionKind, ordinal: usize, start_at: DateTime<Utc>) -> String {
    format!("{}-{}-{}", kind.as_str(), ordinal, start_at.timestamp())
}

/// One archived day's schedule. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: String,
    pub schedule: Vec<Session>,
}

impl HistoryEntry {
    pub fn validate(&self) -> Result<(), String> {
        validate_date(&self.date, "history.date")?;
        for session in &self.schedule {
            session.validate()?;
        }
        Ok(())
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field_name} must be YYYY-MM-DD"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_session() -> Session {
        Session {
            id: session_id(SessionKind::Work, 1, fixed_time("2026-03-02T09:00:00Z")),
            start_at: fixed_time("2026-03-02T09:00:00Z"),
            end_at: fixed_time("2026-03-02T09:25:00Z"),
            task: "Write tests".to_string(),
            kind: SessionKind::Work,
            status: SessionStatus::Incomplete,
            distraction_count: 0,
        }
    }

    fn sample_history_entry() -> HistoryEntry {
        HistoryEntry {
            date: "2026-03-02".to_string(),
            schedule: vec![sample_session()],
        }
    }

    #[test]
    fn session_validate_accepts_valid_session() {
        assert!(sample_session().validate().is_ok());
    }

    #[test]
    fn session_validate_rejects_reverse_range() {
        let mut session = sample_session();
        session.end_at = session.start_at;
        assert!(session.validate().is_err());
    }

    #[test]
    fn session_validate_rejects_blank_task() {
        let mut session = sample_session();
        session.task = "   ".to_string();
        assert!(session.validate().is_err());
    }

    #[test]
    fn session_validate_rejects_distractions_on_break() {
        let mut session = sample_session();
        session.kind = SessionKind::Break;
        session.task = BREAK_TASK_LABEL.to_string();
        session.distraction_count = 1;
        assert!(session.validate().is_err());
    }

    #[test]
    fn history_entry_validate_rejects_bad_date() {
        let mut entry = sample_history_entry();
        entry.date = "March 2nd".to_string();
        assert!(entry.validate().is_err());
    }

    #[test]
    fn session_id_is_deterministic_and_kind_tagged() {
        let start = fixed_time("2026-03-02T09:00:00Z");
        let first = session_id(SessionKind::Work, 1, start);
        let second = session_id(SessionKind::Work, 1, start);
        assert_eq!(first, second);
        assert!(first.starts_with("work-1-"));
        assert_ne!(first, session_id(SessionKind::Break, 2, start));
    }

    #[test]
    fn domain_models_support_serde_roundtrip() {
        let session = sample_session();
        let entry = sample_history_entry();

        let session_roundtrip: Session =
            serde_json::from_str(&serde_json::to_string(&session).expect("serialize session"))
                .expect("deserialize session");
        let entry_roundtrip: HistoryEntry =
            serde_json::from_str(&serde_json::to_string(&entry).expect("serialize entry"))
                .expect("deserialize entry");

        assert_eq!(session_roundtrip, session);
        assert_eq!(entry_roundtrip, entry);
    }

    #[test]
    fn session_kind_serializes_snake_case() {
        let serialized = serde_json::to_string(&sample_session()).expect("serialize session");
        assert!(serialized.contains("\"kind\":\"work\""));
        assert!(serialized.contains("\"status\":\"incomplete\""));
    }
}
