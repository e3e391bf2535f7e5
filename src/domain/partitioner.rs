use crate::domain::models::{BREAK_TASK_LABEL, Session, SessionKind, SessionStatus, session_id};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Splits the raw task input into an ordered list of non-blank names.
/// One name per line; surrounding whitespace is dropped, order is kept.
pub fn parse_task_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Combines the start/end clocks with a calendar date. An end clock at or
/// before the start clock rolls forward to the next day, so overnight
/// schedules (22:00 to 06:00) resolve to a single continuous window.
pub fn resolve_window(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let window_start = Utc.from_utc_datetime(&date.and_time(start));
    let mut window_end = Utc.from_utc_datetime(&date.and_time(end));
    if window_end <= window_start {
        window_end += Duration::days(1);
    }
    (window_start, window_end)
}

/// Walks the window from start to end, emitting alternating work and break
/// sessions.
///
/// The final work session is clipped to the window end and may be shorter
/// than `work_minutes`. A break is only emitted when the full break length
/// fits before the window end; one ending exactly at the end instant still
/// fits. Zero-length sessions are never emitted, so `break_minutes == 0`
/// produces back-to-back work sessions. Task names cycle through
/// `task_names`, falling back to a numbered label when the list is empty.
///
/// Degenerate input (`window_end <= window_start` or `work_minutes == 0`)
/// yields an empty sequence.
pub fn build_sessions(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    work_minutes: u32,
    break_minutes: u32,
    task_names: &[String],
) -> Vec<Session> {
    if window_end <= window_start || work_minutes == 0 {
        return Vec::new();
    }

    let work_length = Duration::minutes(work_minutes as i64);
    let break_length = Duration::minutes(break_minutes as i64);
    let mut sessions = Vec::new();
    let mut cursor = window_start;
    let mut work_index: usize = 0;

    while cursor < window_end {
        let work_end = (cursor + work_length).min(window_end);
        let task = if task_names.is_empty() {
            format!("Work session #{}", work_index + 1)
        } else {
            task_names[work_index % task_names.len()].clone()
        };
        sessions.push(Session {
            id: session_id(SessionKind::Work, sessions.len() + 1, cursor),
            start_at: cursor,
            end_at: work_end,
            task,
            kind: SessionKind::Work,
            status: SessionStatus::Incomplete,
            distraction_count: 0,
        });
        work_index += 1;
        cursor = work_end;

        if cursor >= window_end {
            break;
        }
        if break_minutes == 0 {
            continue;
        }
        if cursor + break_length > window_end {
            break;
        }
        sessions.push(Session {
            id: session_id(SessionKind::Break, sessions.len() + 1, cursor),
            start_at: cursor,
            end_at: cursor + break_length,
            task: BREAK_TASK_LABEL.to_string(),
            kind: SessionKind::Break,
            status: SessionStatus::Incomplete,
            distraction_count: 0,
        });
        cursor += break_length;
    }

    sessions
}
