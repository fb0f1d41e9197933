//! Task model.

use serde::{Deserialize, Serialize};

use crate::auth::validation::ValidationError;

/// A task as returned by the API.
///
/// `start` and `finish` are absolute unix timestamps, not times of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task ID; absent until the server has created the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title.
    pub title: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: String,
    /// Owning user's ID.
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Start, unix seconds.
    pub start: i64,
    /// Finish, unix seconds.
    pub finish: i64,
}

impl Task {
    /// Whether the task exists on the server.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Duration in seconds (zero if the window is reversed).
    pub fn duration_secs(&self) -> i64 {
        (self.finish - self.start).max(0)
    }
}

/// Body for creating or updating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    /// Title.
    pub title: String,
    /// Free-form notes.
    pub description: String,
    /// Owning user's ID.
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Start, unix seconds.
    pub start: i64,
    /// Finish, unix seconds.
    pub finish: i64,
}

impl TaskDraft {
    /// Validate the draft before sending it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::TitleEmpty);
        }
        if self.user_id.is_empty() {
            return Err(ValidationError::OwnerMissing);
        }
        if self.start > self.finish {
            return Err(ValidationError::TaskWindowOrder);
        }
        Ok(())
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            user_id: task.user_id.clone(),
            start: task.start,
            finish: task.finish,
        }
    }
}

/// Filter for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Only tasks owned by this user; `None` lists every visible task.
    pub owner: Option<String>,
    /// Lower bound, unix seconds.
    pub from: Option<i64>,
    /// Upper bound, unix seconds.
    pub to: Option<i64>,
}

impl TaskQuery {
    /// Query for one user's tasks.
    pub fn owned_by(user_id: impl Into<String>) -> Self {
        Self {
            owner: Some(user_id.into()),
            ..Default::default()
        }
    }

    /// Query for every visible task.
    pub fn everyone() -> Self {
        Self::default()
    }

    /// Restrict the query to a time range.
    pub fn between(mut self, from: i64, to: i64) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

/// A task annotated for display in the tasks list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    /// The task.
    pub task: Task,
    /// Owner's username, when known.
    pub owner: Option<String>,
    /// Whether the task overlaps the owner's preferred hours.
    pub conflict: bool,
}

/// Response body of delete requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    /// ID of the deleted resource.
    pub id: String,
}

/// One line of an exported report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNote {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
}

/// Time report for a range, handed to the view to materialize as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Range start, unix seconds.
    pub from: i64,
    /// Range end, unix seconds.
    pub to: i64,
    /// Length of the range in seconds.
    pub total_secs: i64,
    /// One note per task in the range.
    pub notes: Vec<ReportNote>,
}

impl Report {
    /// Build a report for the tasks found in `from..to`.
    pub fn new(from: i64, to: i64, tasks: &[Task]) -> Self {
        Self {
            from,
            to,
            total_secs: to.saturating_sub(from),
            notes: tasks
                .iter()
                .map(|t| ReportNote {
                    title: t.title.clone(),
                    description: t.description.clone(),
                })
                .collect(),
        }
    }

    /// Total time split into whole hours and remaining minutes.
    pub fn hours_minutes(&self) -> (i64, i64) {
        (self.total_secs / 3600, (self.total_secs % 3600) / 60)
    }
}
