use crate::domain::models::{Session, SessionKind, SessionStatus};

/// Store mutations never edit a sequence in place: each returns a new
/// sequence in which exactly the targeted session differs, preserving order
/// and every other session untouched. Unknown ids return an identical copy,
/// since ids may race with a just-completed regeneration.

/// Flips the session between completed and incomplete. Not-applicable
/// sessions have no active state to flip and are left as they are.
pub fn toggle_status(schedule: &[Session], session_id: &str) -> Vec<Session> {
    replace_session(schedule, session_id, |session| {
        session.status = match session.status {
            SessionStatus::Completed => SessionStatus::Incomplete,
            SessionStatus::Incomplete => SessionStatus::Completed,
            SessionStatus::NotApplicable => SessionStatus::NotApplicable,
        };
    })
}

/// Counts one more distraction on a work session.
pub fn increment_distraction(schedule: &[Session], session_id: &str) -> Vec<Session> {
    replace_session(schedule, session_id, |session| {
        if session.kind == SessionKind::Work {
            session.distraction_count = session.distraction_count.saturating_add(1);
        }
    })
}

/// Removes one distraction from a work session, flooring at zero.
pub fn decrement_distraction(schedule: &[Session], session_id: &str) -> Vec<Session> {
    replace_session(schedule, session_id, |session| {
        if session.kind == SessionKind::Work {
            session.distraction_count = session.distraction_count.saturating_sub(1);
        }
    })
}

/// Renames the session's task label. A blank name after trimming leaves the
/// sequence unchanged.
pub fn rename_task(schedule: &[Session], session_id: &str, new_name: &str) -> Vec<Session> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return schedule.to_vec();
    }
    replace_session(schedule, session_id, |session| {
        session.task = new_name.to_string();
    })
}

fn replace_session(
    schedule: &[Session],
    session_id: &str,
    apply: impl Fn(&mut Session),
) -> Vec<Session> {
    schedule
        .iter()
        .map(|session| {
            if session.id == session_id {
                let mut updated = session.clone();
                apply(&mut updated);
                updated
            } else {
                session.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::partitioner::{build_sessions, resolve_window};
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;

    fn sample_schedule() -> Vec<Session> {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
        let start = NaiveTime::from_hms_opt(9, 0, 0).expect("valid time");
        let end = NaiveTime::from_hms_opt(10, 30, 0).expect("valid time");
        let (window_start, window_end) = resolve_window(date, start, end);
        build_sessions(
            window_start,
            window_end,
            25,
            5,
            &["Write".to_string(), "Review".to_string()],
        )
    }

    #[test]
    fn toggle_flips_between_completed_and_incomplete() {
        let schedule = sample_schedule();
        let target = schedule[0].id.clone();

        let toggled = toggle_status(&schedule, &target);
        assert_eq!(toggled[0].status, SessionStatus::Completed);

        let toggled_back = toggle_status(&toggled, &target);
        assert_eq!(toggled_back, schedule);
    }

    #[test]
    fn toggle_leaves_not_applicable_sessions_alone() {
        let mut schedule = sample_schedule();
        schedule[1].status = SessionStatus::NotApplicable;
        let target = schedule[1].id.clone();

        let toggled = toggle_status(&schedule, &target);
        assert_eq!(toggled, schedule);
    }

    #[test]
    fn unknown_id_is_a_no_op_for_every_mutation() {
        let schedule = sample_schedule();
        assert_eq!(toggle_status(&schedule, "missing"), schedule);
        assert_eq!(increment_distraction(&schedule, "missing"), schedule);
        assert_eq!(decrement_distraction(&schedule, "missing"), schedule);
        assert_eq!(rename_task(&schedule, "missing", "New name"), schedule);
    }

    #[test]
    fn mutations_only_touch_the_targeted_session() {
        let schedule = sample_schedule();
        let target = schedule[2].id.clone();

        let updated = increment_distraction(&schedule, &target);
        assert_eq!(updated.len(), schedule.len());
        for (index, (before, after)) in schedule.iter().zip(&updated).enumerate() {
            assert_eq!(before.id, after.id);
            if index == 2 {
                assert_eq!(after.distraction_count, 1);
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn distraction_counter_ignores_break_sessions() {
        let schedule = sample_schedule();
        let break_id = schedule[1].id.clone();
        assert_eq!(schedule[1].kind, SessionKind::Break);

        let updated = increment_distraction(&schedule, &break_id);
        assert_eq!(updated, schedule);
    }

    #[test]
    fn decrement_floors_at_zero() {
        let schedule = sample_schedule();
        let target = schedule[0].id.clone();

        let decremented = decrement_distraction(&schedule, &target);
        assert_eq!(decremented[0].distraction_count, 0);

        let decremented_again = decrement_distraction(&decremented, &target);
        assert_eq!(decremented_again[0].distraction_count, 0);
    }

    #[test]
    fn rename_trims_and_rejects_blank_names() {
        let schedule = sample_schedule();
        let target = schedule[0].id.clone();

        let renamed = rename_task(&schedule, &target, "  Deep focus  ");
        assert_eq!(renamed[0].task, "Deep focus");

        let unchanged = rename_task(&schedule, &target, "   ");
        assert_eq!(unchanged, schedule);
    }

    proptest! {
        #[test]
        fn toggling_twice_restores_any_session(index in 0usize..6, toggles in 0usize..4) {
            let mut schedule = sample_schedule();
            let target = schedule[index].id.clone();
            for _ in 0..toggles {
                schedule = toggle_status(&schedule, &target);
            }

            let round_tripped = toggle_status(&toggle_status(&schedule, &target), &target);
            prop_assert_eq!(round_tripped, schedule);
        }

        #[test]
        fn distraction_count_never_goes_negative(operations in proptest::collection::vec(any::<bool>(), 0..24)) {
            let mut schedule = sample_schedule();
            let target = schedule[0].id.clone();
            let mut expected: u32 = 0;
            for increment in operations {
                if increment {
                    schedule = increment_distraction(&schedule, &target);
                    expected = expected.saturating_add(1);
                } else {
                    schedule = decrement_distraction(&schedule, &target);
                    expected = expected.saturating_sub(1);
                }
            }
            prop_assert_eq!(schedule[0].distraction_count, expected);
        }
    }
}
