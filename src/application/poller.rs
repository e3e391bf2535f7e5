use crate::application::commands::{
    AppState, NotificationResponse, TickResponse, due_notifications_impl, poll_tick_impl,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Handle to a running poll driver; dropping it leaves the task running,
/// `stop` aborts it.
#[derive(Debug)]
pub struct PollHandle {
    join: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.join.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Drives the countdown display: every `period`, the active session and its
/// remaining time are forwarded to the rendering collaborator. Missed ticks
/// are skipped, never replayed. The loop ends when the receiver is dropped.
pub fn spawn_countdown_poll(
    state: Arc<AppState>,
    period: Duration,
    updates: mpsc::Sender<TickResponse>,
) -> PollHandle {
    let join = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let Ok(tick) = poll_tick_impl(&state, None) else {
                continue;
            };
            if updates.send(tick).await.is_err() {
                break;
            }
        }
    });
    PollHandle { join }
}

/// Drives the audio cues: every `period`, newly-due session starts are
/// forwarded to the audio-cue collaborator. Quiet ticks are not sent.
pub fn spawn_cue_poll(
    state: Arc<AppState>,
    period: Duration,
    cues: mpsc::Sender<NotificationResponse>,
) -> PollHandle {
    let join = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let Ok(response) = due_notifications_impl(&state, None) else {
                continue;
            };
            if response.cues.is_empty() {
                continue;
            }
            if cues.send(response).await.is_err() {
                break;
            }
        }
    });
    PollHandle { join }
}
