//! Task editor.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use super::common::{check_view, ScreenContext};
use super::profile::UPDATE_MESSAGE;
use super::ScreenResult;
use crate::app::navigation::Screen;
use crate::auth::validation::ValidationError;
use crate::auth::Permission;
use crate::model::Task;
use crate::Result;

/// Shown after deleting a task.
pub const DELETED_MESSAGE: &str = "Task successfully deleted";

/// Asked before deleting a task.
pub const DELETE_TASK_PROMPT: &str =
    "If you are sure you wish to permanently delete this task, type in the current title of this task";

/// Task editor controller.
#[derive(Default)]
pub struct TaskScreen {
    editing: Mutex<Option<Task>>,
}

impl TaskScreen {
    /// Create a task editor controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Task currently being edited.
    pub fn editing(&self) -> Option<Task> {
        self.editing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Open the editor on a new draft owned by the signed-in user.
    ///
    /// The draft ends at the local wall-clock time and lasts the configured
    /// draft duration.
    pub fn create_draft(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        let user = ctx.signed_in_user()?;
        let finish = ctx.clock.wall_clock_as_utc();
        let draft = Task {
            id: None,
            title: String::new(),
            description: String::new(),
            user_id: user.id,
            start: finish - ctx.client.draft_duration_secs,
            finish,
        };
        self.open(ctx, draft)
    }

    /// Open the editor on `task`.
    pub fn open(&self, ctx: &ScreenContext, task: Task) -> Result<ScreenResult> {
        ctx.views.task.init(
            &task,
            ctx.can(Permission::ModifyAllTasks),
            task.is_persisted(),
        );
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        ctx.navigator.show(Screen::TaskView);
        Ok(ScreenResult::Continue)
    }

    /// Create or update the task from the form.
    pub async fn submit(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        let Some(task) = self.editing() else {
            warn!("Task submit without a task open");
            return Ok(ScreenResult::Continue);
        };

        check_view(ctx.views.task.validate())?;
        let mut draft = ctx.views.task.read();
        if !ctx.can(Permission::ModifyAllTasks) {
            draft.user_id = task.user_id.clone();
        }
        draft.validate()?;

        let saved = match &task.id {
            None => ctx.api.create_task(&draft).await?,
            Some(id) => ctx.api.patch_task(id, &draft).await?,
        };
        info!(task_id = ?saved.id, created = task.id.is_none(), "Task saved");
        ctx.dialog.alert(UPDATE_MESSAGE);
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = Some(saved);
        Ok(ScreenResult::ReloadTasks)
    }

    /// Delete the open task once the operator retypes its exact title.
    pub async fn delete(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        let Some(task) = self.editing() else {
            warn!("Task delete without a task open");
            return Ok(ScreenResult::Continue);
        };
        let Some(id) = task.id.as_deref() else {
            warn!("Task delete on an unsaved draft");
            return Ok(ScreenResult::Continue);
        };

        let typed = ctx.dialog.prompt(DELETE_TASK_PROMPT);
        if typed.as_deref() != Some(task.title.as_str()) {
            return Err(ValidationError::TitleMismatch.into());
        }

        let deleted = ctx.api.delete_task(id).await?;
        info!(task_id = %deleted.id, "Task deleted");
        ctx.dialog.alert(DELETED_MESSAGE);
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(ScreenResult::ReloadTasks)
    }

    /// Leave the editor without saving.
    pub fn back(&self, ctx: &ScreenContext) -> ScreenResult {
        ctx.views.task.clear();
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = None;
        ScreenResult::ShowTasksList
    }
}
