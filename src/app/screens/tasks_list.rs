//! Task list, filtering and report export.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::common::ScreenContext;
use super::ScreenResult;
use crate::app::navigation::Screen;
use crate::app::ticket::RequestSequence;
use crate::auth::validation::ValidationError;
use crate::conflict::{annotate_all, annotate_own};
use crate::model::{Report, TaskQuery, User};
use crate::Result;

/// Whose tasks the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskScope {
    /// The signed-in user's tasks.
    #[default]
    Own,
    /// Every visible task.
    All,
}

impl TaskScope {
    /// Base query for this scope as seen by `user`.
    pub fn query(self, user: &User) -> TaskQuery {
        match self {
            TaskScope::Own => TaskQuery::owned_by(&user.id),
            TaskScope::All => TaskQuery::everyone(),
        }
    }
}

fn check_range(from: i64, to: i64) -> Result<()> {
    if from > to {
        return Err(ValidationError::FilterRangeOrder.into());
    }
    Ok(())
}

/// Task list screen controller.
#[derive(Default)]
pub struct TasksListScreen {
    scope: Mutex<TaskScope>,
    tickets: RequestSequence,
}

impl TasksListScreen {
    /// Create a task list controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope of the last load.
    pub fn scope(&self) -> TaskScope {
        *self.scope.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch and show tasks in `scope`.
    pub async fn load(&self, ctx: &ScreenContext, scope: TaskScope) -> Result<ScreenResult> {
        *self.scope.lock().unwrap_or_else(PoisonError::into_inner) = scope;
        self.refresh(ctx, None).await
    }

    /// Fetch and show tasks again in the current scope.
    pub async fn reload(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        self.refresh(ctx, None).await
    }

    /// Show only tasks within `from..to` (unix seconds).
    pub async fn filter(&self, ctx: &ScreenContext, from: i64, to: i64) -> Result<ScreenResult> {
        check_range(from, to)?;
        self.refresh(ctx, Some((from, to))).await
    }

    /// Build a report of the tasks within `from..to` and hand it to the view.
    pub async fn export(&self, ctx: &ScreenContext, from: i64, to: i64) -> Result<ScreenResult> {
        check_range(from, to)?;
        let user = ctx.signed_in_user()?;
        let query = self.scope().query(&user).between(from, to);

        let tasks = ctx.api.list_tasks(&query).await?;
        let report = Report::new(from, to, &tasks);
        debug!(tasks = report.notes.len(), from, to, "Exporting report");
        ctx.views.tasks.export(&report);
        Ok(ScreenResult::Continue)
    }

    /// Open the task with `id`.
    pub async fn select(ctx: &ScreenContext, id: &str) -> Result<ScreenResult> {
        let task = ctx.api.get_task(id).await?;
        Ok(ScreenResult::OpenTask(task))
    }

    /// Show the list as last rendered.
    pub fn show(ctx: &ScreenContext) {
        ctx.navigator.show(Screen::TasksList);
    }

    async fn refresh(&self, ctx: &ScreenContext, range: Option<(i64, i64)>) -> Result<ScreenResult> {
        let user = ctx.signed_in_user()?;
        let scope = self.scope();
        let mut query = scope.query(&user);
        if let Some((from, to)) = range {
            query = query.between(from, to);
        }

        let ticket = self.tickets.issue(ctx.session.generation());
        let tasks = ctx.api.list_tasks(&query).await?;
        let rows = match scope {
            TaskScope::Own => annotate_own(tasks, &user),
            TaskScope::All => {
                let users = ctx.api.list_users_by_id().await?;
                annotate_all(tasks, &users)
            }
        };
        if !self.tickets.is_current(ticket, ctx.session.generation()) {
            debug!(?scope, "Dropping superseded task list");
            return Ok(ScreenResult::Continue);
        }

        ctx.views.tasks.init(&rows, scope);
        ctx.navigator.show(Screen::TasksList);
        Ok(ScreenResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_queries() {
        let user = User {
            id: "u1".to_string(),
            username: "jane".to_string(),
            email: String::new(),
            role: 2,
            preferred_hours: None,
        };
        assert_eq!(TaskScope::Own.query(&user), TaskQuery::owned_by("u1"));
        assert_eq!(TaskScope::All.query(&user), TaskQuery::everyone());
    }

    #[test]
    fn test_check_range() {
        assert!(check_range(0, 0).is_ok());
        assert!(check_range(0, 10).is_ok());
        assert_eq!(
            check_range(10, 0).unwrap_err().to_string(),
            "Filter start must not be after its end"
        );
    }
}
