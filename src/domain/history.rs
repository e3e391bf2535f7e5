use crate::domain::models::{HistoryEntry, Session};

/// Most-recent-first archive bound; insertion beyond it evicts the oldest.
pub const HISTORY_CAPACITY: usize = 30;

/// Snapshots a replaced schedule under its date label. An empty previous
/// schedule archives nothing and the history is returned as-is.
pub fn archive(
    previous: &[Session],
    date_label: &str,
    history: &[HistoryEntry],
) -> Vec<HistoryEntry> {
    if previous.is_empty() {
        return history.to_vec();
    }

    let mut updated = Vec::with_capacity((history.len() + 1).min(HISTORY_CAPACITY));
    updated.push(HistoryEntry {
        date: date_label.to_string(),
        schedule: previous.to_vec(),
    });
    updated.extend(history.iter().cloned());
    updated.truncate(HISTORY_CAPACITY);
    updated
}
