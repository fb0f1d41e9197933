//! Screen controllers for ManageMe.
//!
//! Each controller drives one workflow and returns a [`ScreenResult`]
//! naming what should happen next; [`crate::app::Application`] routes it.

mod auth;
mod common;
mod menu;
mod profile;
mod task;
mod tasks_list;
mod users;

pub use auth::{AuthScreen, WELCOME_MESSAGE};
pub use common::ScreenContext;
pub use menu::{MenuItem, MenuScreen};
pub use profile::{ProfileScreen, DELETE_ACCOUNT_PROMPT, FAREWELL_MESSAGE, UPDATE_MESSAGE};
pub use task::{TaskScreen, DELETED_MESSAGE, DELETE_TASK_PROMPT};
pub use tasks_list::{TaskScope, TasksListScreen};
pub use users::UsersScreen;

use crate::model::{Task, User};

/// Result of a screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenResult {
    /// Stay on the current screen.
    Continue,
    /// Re-fetch the signed-in user and show the menu.
    LoadMenu,
    /// Show the menu as last rendered.
    ShowMenu,
    /// Fetch and show the user list.
    LoadUsersList,
    /// Fetch and show tasks in the given scope.
    LoadTasks(TaskScope),
    /// Fetch and show tasks in the scope last used.
    ReloadTasks,
    /// Show the task list as last rendered.
    ShowTasksList,
    /// Open the profile editor on a user.
    OpenProfile(User),
    /// Open the task editor on a task.
    OpenTask(Task),
    /// End the session.
    Logout,
}
