use crate::application::bootstrap::bootstrap_workspace;
use crate::domain::activity::{active_session, due_session_starts, remaining};
use crate::domain::history::archive;
use crate::domain::models::{HistoryEntry, Session, SessionKind};
use crate::domain::partitioner::{build_sessions, parse_task_names, resolve_window};
use crate::domain::store::{
    decrement_distraction, increment_distraction, rename_task, toggle_status,
};
use crate::infrastructure::config::{
    ensure_default_configs, load_runtime_settings, read_sounds_enabled, save_sounds_enabled,
};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::history_repository::{HistoryRepository, SqliteHistoryRepository};
use crate::infrastructure::storage::initialize_database;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Margin after a session start within which its cue is still due; one
/// cue-poll tick, so a start missed for longer stays silent.
pub const CUE_TOLERANCE_MS: i64 = 1_000;

pub struct AppState {
    config_dir: PathBuf,
    database_path: PathBuf,
    logs_dir: PathBuf,
    runtime: Mutex<RuntimeState>,
    log_guard: Mutex<()>,
}

impl AppState {
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let config_dir = workspace_root.join("config");
        let logs_dir = workspace_root.join("logs");

        ensure_default_configs(&config_dir)?;
        initialize_database(&bootstrap.database_path)?;

        let state = Self {
            config_dir,
            database_path: bootstrap.database_path,
            logs_dir,
            runtime: Mutex::new(RuntimeState::default()),
            log_guard: Mutex::new(()),
        };

        let repository = SqliteHistoryRepository::new(&state.database_path);
        let history = match repository.load() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(error) => {
                state.log_error(
                    "load_history",
                    &format!("treating stored history as empty: {error}"),
                );
                Vec::new()
            }
        };
        if let Ok(mut runtime) = state.runtime.lock() {
            runtime.history = history;
        }

        Ok(state)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        self.log_error(command, &error.to_string());
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }

    fn history_repository(&self) -> SqliteHistoryRepository {
        SqliteHistoryRepository::new(&self.database_path)
    }
}

#[derive(Debug, Default)]
struct RuntimeState {
    schedule: Vec<Session>,
    history: Vec<HistoryEntry>,
    notified: HashSet<String>,
    generation: u64,
}

/// ActivityClock output for one countdown tick: what the rendering
/// collaborator needs to draw or clear the timer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TickResponse {
    pub generation: u64,
    pub active: Option<Session>,
    pub remaining_seconds: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotificationCue {
    pub session_id: String,
    pub kind: SessionKind,
}

/// NotificationGate output for one cue tick, handed to the audio-cue
/// collaborator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotificationResponse {
    pub generation: u64,
    pub sounds_enabled: bool,
    pub cues: Vec<NotificationCue>,
}

pub fn generate_schedule_impl(
    state: &AppState,
    start_clock: String,
    end_clock: String,
    work_minutes: Option<u32>,
    break_minutes: Option<u32>,
    task_names_raw: String,
    sounds_enabled: Option<bool>,
) -> Result<Vec<Session>, InfraError> {
    let start = parse_clock_input(&start_clock, "start_clock")?;
    let end = parse_clock_input(&end_clock, "end_clock")?;

    let settings = load_runtime_settings(state.config_dir());
    let work_minutes = work_minutes.unwrap_or(settings.work_minutes);
    let break_minutes = break_minutes.unwrap_or(settings.break_minutes);
    if work_minutes == 0 {
        return Err(InfraError::InvalidConfig(
            "work_minutes must be > 0".to_string(),
        ));
    }

    if let Some(enabled) = sounds_enabled {
        save_sounds_enabled(state.config_dir(), enabled)?;
    }

    let task_names = parse_task_names(&task_names_raw);
    let today = Utc::now().date_naive();
    let (window_start, window_end) = resolve_window(today, start, end);
    let schedule = build_sessions(
        window_start,
        window_end,
        work_minutes,
        break_minutes,
        &task_names,
    );

    let archived_history = {
        let mut runtime = lock_runtime(state)?;
        if !runtime.schedule.is_empty() {
            runtime.history = archive(
                &runtime.schedule,
                &today.format("%Y-%m-%d").to_string(),
                &runtime.history,
            );
        }
        runtime.schedule = schedule.clone();
        runtime.notified.clear();
        runtime.generation += 1;
        runtime.history.clone()
    };

    if let Err(error) = state
        .history_repository()
        .save(&archived_history, Utc::now())
    {
        state.log_error(
            "generate_schedule",
            &format!("history kept in memory only: {error}"),
        );
    }

    state.log_info(
        "generate_schedule",
        &format!(
            "generated {} sessions for window {} to {}",
            schedule.len(),
            window_start.to_rfc3339(),
            window_end.to_rfc3339()
        ),
    );
    Ok(schedule)
}

pub fn list_schedule_impl(state: &AppState) -> Result<Vec<Session>, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(runtime.schedule.clone())
}

pub fn toggle_status_impl(state: &AppState, session_id: String) -> Result<Vec<Session>, InfraError> {
    apply_store_mutation(state, "toggle_status", &session_id, |schedule, id| {
        toggle_status(schedule, id)
    })
}

pub fn increment_distraction_impl(
    state: &AppState,
    session_id: String,
) -> Result<Vec<Session>, InfraError> {
    apply_store_mutation(state, "increment_distraction", &session_id, |schedule, id| {
        increment_distraction(schedule, id)
    })
}

pub fn decrement_distraction_impl(
    state: &AppState,
    session_id: String,
) -> Result<Vec<Session>, InfraError> {
    apply_store_mutation(state, "decrement_distraction", &session_id, |schedule, id| {
        decrement_distraction(schedule, id)
    })
}

pub fn rename_task_impl(
    state: &AppState,
    session_id: String,
    new_name: String,
) -> Result<Vec<Session>, InfraError> {
    apply_store_mutation(state, "rename_task", &session_id, |schedule, id| {
        rename_task(schedule, id, &new_name)
    })
}

pub fn poll_tick_impl(state: &AppState, now: Option<String>) -> Result<TickResponse, InfraError> {
    let now = resolve_now(now)?;
    let runtime = lock_runtime(state)?;

    let active = active_session(&runtime.schedule, now).cloned();
    let remaining_seconds = active
        .as_ref()
        .map(|session| remaining(session, now).num_seconds())
        .unwrap_or(0);

    Ok(TickResponse {
        generation: runtime.generation,
        active,
        remaining_seconds,
    })
}

pub fn due_notifications_impl(
    state: &AppState,
    now: Option<String>,
) -> Result<NotificationResponse, InfraError> {
    let now = resolve_now(now)?;
    let sounds_enabled = read_sounds_enabled(state.config_dir()).unwrap_or(true);

    let mut runtime = lock_runtime(state)?;
    let due = due_session_starts(
        &runtime.schedule,
        now,
        Duration::milliseconds(CUE_TOLERANCE_MS),
        &runtime.notified,
    );
    let cues = due
        .iter()
        .filter_map(|id| {
            runtime
                .schedule
                .iter()
                .find(|session| &session.id == id)
                .map(|session| NotificationCue {
                    session_id: session.id.clone(),
                    kind: session.kind,
                })
        })
        .collect::<Vec<_>>();
    runtime.notified.extend(due);

    if !cues.is_empty() {
        state.log_info("due_notifications", &format!("{} cue(s) due", cues.len()));
    }

    Ok(NotificationResponse {
        generation: runtime.generation,
        sounds_enabled,
        cues,
    })
}

pub fn list_history_impl(state: &AppState) -> Result<Vec<HistoryEntry>, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(runtime.history.clone())
}

pub fn clear_history_impl(state: &AppState) -> Result<(), InfraError> {
    {
        let mut runtime = lock_runtime(state)?;
        runtime.history = Vec::new();
    }

    if let Err(error) = state.history_repository().clear() {
        state.log_error(
            "clear_history",
            &format!("stored history left behind: {error}"),
        );
    }

    state.log_info("clear_history", "cleared schedule history");
    Ok(())
}

pub fn set_sounds_enabled_impl(state: &AppState, enabled: bool) -> Result<(), InfraError> {
    save_sounds_enabled(state.config_dir(), enabled)?;
    state.log_info("set_sounds_enabled", &format!("sounds_enabled={enabled}"));
    Ok(())
}

fn apply_store_mutation(
    state: &AppState,
    command: &str,
    session_id: &str,
    mutation: impl Fn(&[Session], &str) -> Vec<Session>,
) -> Result<Vec<Session>, InfraError> {
    let session_id = session_id.trim();

    let updated = {
        let mut runtime = lock_runtime(state)?;
        let updated = mutation(&runtime.schedule, session_id);
        runtime.schedule = updated.clone();
        updated
    };

    state.log_info(command, &format!("applied to session_id={session_id}"));
    Ok(updated)
}

fn lock_runtime(state: &AppState) -> Result<MutexGuard<'_, RuntimeState>, InfraError> {
    state
        .runtime
        .lock()
        .map_err(|error| InfraError::InvalidConfig(format!("runtime lock poisoned: {error}")))
}

fn parse_clock_input(value: &str, field_name: &str) -> Result<NaiveTime, InfraError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|error| {
        InfraError::InvalidConfig(format!("{field_name} must be HH:MM: {error}"))
    })
}

fn resolve_now(now: Option<String>) -> Result<DateTime<Utc>, InfraError> {
    match now {
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|value| value.with_timezone(&Utc))
            .map_err(|error| {
                InfraError::InvalidConfig(format!("now must be RFC3339 date-time: {error}"))
            }),
        None => Ok(Utc::now()),
    }
}
