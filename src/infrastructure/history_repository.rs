use crate::domain::models::HistoryEntry;
use crate::infrastructure::error::InfraError;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistence collaborator for the schedule history. The whole bounded
/// list is stored as one JSON payload under a fixed row; callers treat a
/// load failure as an empty history.
pub trait HistoryRepository: Send + Sync {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>, InfraError>;
    fn save(&self, history: &[HistoryEntry], saved_at: DateTime<Utc>) -> Result<(), InfraError>;
    fn clear(&self) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct SqliteHistoryRepository {
    db_path: PathBuf,
}

impl SqliteHistoryRepository {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, InfraError> {
        Connection::open(&self.db_path).map_err(InfraError::from)
    }
}

impl HistoryRepository for SqliteHistoryRepository {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>, InfraError> {
        let connection = self.connect()?;
        let payload: Option<String> = connection
            .query_row(
                "SELECT payload FROM schedule_history WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let history: Vec<HistoryEntry> = serde_json::from_str(&payload)?;
        Ok(Some(history))
    }

    fn save(&self, history: &[HistoryEntry], saved_at: DateTime<Utc>) -> Result<(), InfraError> {
        let payload = serde_json::to_string(history)?;
        let connection = self.connect()?;
        connection.execute(
            "INSERT INTO schedule_history (id, payload, saved_at)
             VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
               payload = excluded.payload,
               saved_at = excluded.saved_at",
            params![payload, saved_at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<(), InfraError> {
        let connection = self.connect()?;
        connection.execute("DELETE FROM schedule_history WHERE id = 1", [])?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    history: Mutex<Option<Vec<HistoryEntry>>>,
}

impl HistoryRepository for InMemoryHistoryRepository {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>, InfraError> {
        let history = self
            .history
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("history lock poisoned: {error}")))?;
        Ok(history.clone())
    }

    fn save(&self, history: &[HistoryEntry], _saved_at: DateTime<Utc>) -> Result<(), InfraError> {
        let mut stored = self
            .history
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("history lock poisoned: {error}")))?;
        *stored = Some(history.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), InfraError> {
        let mut stored = self
            .history
            .lock()
            .map_err(|error| InfraError::InvalidConfig(format!("history lock poisoned: {error}")))?;
        *stored = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::initialize_database;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_DB: AtomicUsize = AtomicUsize::new(0);

    struct TempDatabase {
        dir: PathBuf,
        path: PathBuf,
    }

    impl TempDatabase {
        fn new() -> Self {
            let sequence = NEXT_TEMP_DB.fetch_add(1, Ordering::Relaxed);
            let dir = std::env::temp_dir().join(format!(
                "pomoday-history-tests-{}-{}",
                std::process::id(),
                sequence
            ));
            fs::create_dir_all(&dir).expect("create temp dir");
            let path = dir.join("pomoday.sqlite");
            initialize_database(&path).expect("initialize database");
            Self { dir, path }
        }
    }

    impl Drop for TempDatabase {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_history() -> Vec<HistoryEntry> {
        vec![HistoryEntry {
            date: "2026-03-02".to_string(),
            schedule: Vec::new(),
        }]
    }

    #[test]
    fn sqlite_repository_roundtrips_history() {
        let database = TempDatabase::new();
        let repository = SqliteHistoryRepository::new(&database.path);

        assert_eq!(repository.load().expect("load empty"), None);

        let history = sample_history();
        repository
            .save(&history, fixed_time("2026-03-02T18:00:00Z"))
            .expect("save history");
        assert_eq!(repository.load().expect("load saved"), Some(history.clone()));

        repository
            .save(&history, fixed_time("2026-03-03T18:00:00Z"))
            .expect("overwrite fixed row");
        assert_eq!(repository.load().expect("load overwritten"), Some(history));

        repository.clear().expect("clear history");
        assert_eq!(repository.load().expect("load cleared"), None);
    }

    #[test]
    fn sqlite_repository_surfaces_corrupt_payloads_as_errors() {
        let database = TempDatabase::new();
        let connection = Connection::open(&database.path).expect("open database");
        connection
            .execute(
                "INSERT INTO schedule_history (id, payload, saved_at) VALUES (1, ?1, ?2)",
                params!["{ not json", "2026-03-02T18:00:00+00:00"],
            )
            .expect("insert corrupt payload");

        let repository = SqliteHistoryRepository::new(&database.path);
        assert!(matches!(repository.load(), Err(InfraError::Json(_))));
    }

    #[test]
    fn in_memory_repository_roundtrips_history() {
        let repository = InMemoryHistoryRepository::default();
        assert_eq!(repository.load().expect("load empty"), None);

        let history = sample_history();
        repository
            .save(&history, fixed_time("2026-03-02T18:00:00Z"))
            .expect("save history");
        assert_eq!(repository.load().expect("load saved"), Some(history));

        repository.clear().expect("clear history");
        assert_eq!(repository.load().expect("load cleared"), None);
    }
}
