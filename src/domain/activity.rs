use crate::domain::models::Session;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// The session whose half-open window `[start_at, end_at)` contains `now`.
/// Sequences never overlap, so at most one session matches.
pub fn active_session(schedule: &[Session], now: DateTime<Utc>) -> Option<&Session> {
    schedule
        .iter()
        .find(|session| session.start_at <= now && now < session.end_at)
}

/// Time left in the session, floored at zero once the window has passed.
pub fn remaining(session: &Session, now: DateTime<Utc>) -> Duration {
    (session.end_at - now).max(Duration::zero())
}

/// Ids of sessions whose start lies within `[now - tolerance, now]` and that
/// have not been notified yet. Starts older than the tolerance window are
/// skipped rather than fired late; the caller records the returned ids in
/// `already_notified` so each session cues at most once.
pub fn due_session_starts(
    schedule: &[Session],
    now: DateTime<Utc>,
    tolerance: Duration,
    already_notified: &HashSet<String>,
) -> Vec<String> {
    schedule
        .iter()
        .filter(|session| {
            let since_start = now - session.start_at;
            since_start >= Duration::zero()
                && since_start < tolerance
                && !already_notified.contains(&session.id)
        })
        .map(|session| session.id.clone())
        .collect()
}
