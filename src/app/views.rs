//! View collaborators.
//!
//! Views render one domain object each and read the user's input back.
//! They never talk to the network. The screen controllers own all
//! decisions; a view only reports what was typed and shows what it is told.

use std::sync::Arc;

use super::screens::{MenuItem, TaskScope};
use crate::auth::validation::{LoginForm, ProfileForm, RegisterForm};
use crate::model::{Report, Task, TaskDraft, TaskRow, User};

/// Modal messages.
pub trait Dialog: Send + Sync {
    /// Show a message.
    fn alert(&self, message: &str);
    /// Ask for a line of text. `None` if the user cancelled.
    fn prompt(&self, message: &str) -> Option<String>;
    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> bool;
}

/// Onboarding banner.
pub trait IntroView: Send + Sync {
    /// Show the banner.
    fn show(&self);
    /// Hide the banner.
    fn hide(&self);
}

/// Sign-in form.
pub trait LoginView: Send + Sync {
    /// Field-level check done by the view itself.
    fn validate(&self) -> Option<String> {
        None
    }
    /// Current input.
    fn read(&self) -> LoginForm;
    /// Reset the form.
    fn clear(&self);
}

/// Registration form.
pub trait RegisterView: Send + Sync {
    /// Field-level check done by the view itself.
    fn validate(&self) -> Option<String> {
        None
    }
    /// Current input.
    fn read(&self) -> RegisterForm;
    /// Reset the form.
    fn clear(&self);
}

/// Main menu.
pub trait MenuView: Send + Sync {
    /// Render the menu for `user`, offering only `items`.
    fn init(&self, user: &User, items: &[MenuItem]);
}

/// Profile editor.
pub trait ProfileView: Send + Sync {
    /// Fill the form with `user`. The role field is shown only when
    /// `role_editable` is set.
    fn init(&self, user: &User, role_editable: bool);
    /// Field-level check done by the view itself.
    fn validate(&self) -> Option<String> {
        None
    }
    /// Current input.
    fn read(&self) -> ProfileForm;
    /// Reset the form.
    fn clear(&self);
}

/// User list.
pub trait UsersListView: Send + Sync {
    /// Render `users`.
    fn init(&self, users: &[User]);
}

/// Task editor.
pub trait TaskView: Send + Sync {
    /// Fill the form with `task`.
    ///
    /// The owner field is editable only when `owner_editable` is set and
    /// the delete button is offered only when `deletable` is set.
    fn init(&self, task: &Task, owner_editable: bool, deletable: bool);
    /// Field-level check done by the view itself (e.g. unparsable dates).
    fn validate(&self) -> Option<String> {
        None
    }
    /// Current input.
    fn read(&self) -> TaskDraft;
    /// Reset the form.
    fn clear(&self);
}

/// Task list with filter and export controls.
pub trait TasksListView: Send + Sync {
    /// Render annotated tasks.
    fn init(&self, rows: &[TaskRow], scope: TaskScope);
    /// Materialize `report` as a download.
    fn export(&self, report: &Report);
}

/// Every view the client renders.
#[derive(Clone)]
pub struct Views {
    /// Onboarding banner.
    pub intro: Arc<dyn IntroView>,
    /// Sign-in form.
    pub login: Arc<dyn LoginView>,
    /// Registration form.
    pub register: Arc<dyn RegisterView>,
    /// Main menu.
    pub menu: Arc<dyn MenuView>,
    /// Profile editor.
    pub profile: Arc<dyn ProfileView>,
    /// User list.
    pub users: Arc<dyn UsersListView>,
    /// Task editor.
    pub task: Arc<dyn TaskView>,
    /// Task list.
    pub tasks: Arc<dyn TasksListView>,
}
