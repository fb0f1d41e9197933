//! Task / preferred-hours conflict detection.
//!
//! Preferred hours recur daily, so a task's absolute window is projected
//! onto the 24-hour cycle before it is compared with the window. Tasks that
//! cross midnight are not special-cased: after projection their finish can
//! land before their start, and the plain half-open overlap test is applied
//! to whatever that yields.

use std::collections::HashMap;

use crate::datetime::seconds_of_day;
use crate::model::{Task, TaskRow, TimeWindow, User};

/// Whether `start..finish` (unix seconds) overlaps `window` on the day axis.
///
/// Half-open: windows that only touch at an edge do not overlap.
pub fn overlaps_window(start: i64, finish: i64, window: &TimeWindow) -> bool {
    let s = seconds_of_day(start);
    let f = seconds_of_day(finish);
    s < i64::from(window.finish) && f > i64::from(window.start)
}

/// Whether `task` conflicts with a user's preferred hours.
///
/// No preferred hours means no conflict.
///
/// # Examples
///
/// ```
/// use manageme::conflict::has_conflict;
/// use manageme::model::{Task, TimeWindow};
///
/// let task = Task {
///     id: None,
///     title: "Standup".into(),
///     description: String::new(),
///     user_id: "u1".into(),
///     start: 9 * 3600,
///     finish: 10 * 3600,
/// };
/// let office = TimeWindow { start: 8 * 3600, finish: 17 * 3600 };
///
/// assert!(has_conflict(&task, Some(&office)));
/// assert!(!has_conflict(&task, None));
/// ```
pub fn has_conflict(task: &Task, window: Option<&TimeWindow>) -> bool {
    window.is_some_and(|w| overlaps_window(task.start, task.finish, w))
}

/// Annotate tasks that all belong to `owner`.
pub fn annotate_own(tasks: Vec<Task>, owner: &User) -> Vec<TaskRow> {
    tasks
        .into_iter()
        .map(|task| {
            let conflict = has_conflict(&task, owner.preferred_hours.as_ref());
            TaskRow {
                task,
                owner: Some(owner.username.clone()),
                conflict,
            }
        })
        .collect()
}

/// Annotate tasks of any owner, looking each owner up in `users`.
///
/// A task whose owner is unknown gets no owner name and no conflict.
pub fn annotate_all(tasks: Vec<Task>, users: &HashMap<String, User>) -> Vec<TaskRow> {
    tasks
        .into_iter()
        .map(|task| {
            let owner = users.get(&task.user_id);
            let conflict = has_conflict(&task, owner.and_then(|u| u.preferred_hours.as_ref()));
            TaskRow {
                owner: owner.map(|u| u.username.clone()),
                task,
                conflict,
            }
        })
        .collect()
}
