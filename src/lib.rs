pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::commands::{
    AppState, CUE_TOLERANCE_MS, NotificationCue, NotificationResponse, TickResponse,
    clear_history_impl, decrement_distraction_impl, due_notifications_impl,
    generate_schedule_impl, increment_distraction_impl, list_history_impl, list_schedule_impl,
    poll_tick_impl, rename_task_impl, set_sounds_enabled_impl, toggle_status_impl,
};
pub use application::poller::{PollHandle, spawn_countdown_poll, spawn_cue_poll};
pub use domain::models::{HistoryEntry, Session, SessionKind, SessionStatus};
pub use infrastructure::error::InfraError;
