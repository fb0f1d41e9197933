//! Application module.
//!
//! [`Application`] owns the screen controllers and exposes one entry point
//! per user action. Each entry point runs the controller, follows the
//! returned [`ScreenResult`] chain, and applies the failure policy:
//!
//! - validation and request failures are shown and navigation is left alone;
//! - a rejected or malformed credential ends the session and returns to
//!   the sign-in screen.

pub mod navigation;
pub mod screens;
pub mod ticket;
pub mod views;

pub use navigation::{Navigator, Screen, ScreenHost};
pub use screens::{MenuItem, ScreenContext, ScreenResult, TaskScope};
pub use ticket::RequestSequence;
pub use views::{Dialog, Views};

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, HttpApiClient};
use crate::auth::{SessionStorage, SessionStore};
use crate::config::Config;
use crate::datetime::{Clock, SystemClock};
use crate::{ManageMeError, Result};
use screens::{AuthScreen, MenuScreen, ProfileScreen, TaskScreen, TasksListScreen, UsersScreen};

/// Shown when the session is rejected by the server.
pub const SESSION_ENDED_MESSAGE: &str = "Bad authentication for session, logging out";

/// Asked when the introduction banner is dismissed.
pub const HIDE_INTRO_PROMPT: &str = "Would you like to hide this message permanently?";

/// The ManageMe client.
pub struct Application {
    ctx: ScreenContext,
    menu: MenuScreen,
    profile: ProfileScreen,
    users: UsersScreen,
    tasks: TasksListScreen,
    task: TaskScreen,
}

impl Application {
    /// Create an application over an existing context.
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            menu: MenuScreen::new(),
            profile: ProfileScreen::new(),
            users: UsersScreen::new(),
            tasks: TasksListScreen::new(),
            task: TaskScreen::new(),
        }
    }

    /// Build an application talking HTTP to the configured server.
    pub fn from_config(
        config: &Config,
        storage: Arc<dyn SessionStorage>,
        host: Arc<dyn ScreenHost>,
        views: Views,
        dialog: Arc<dyn Dialog>,
    ) -> Result<Self> {
        config.validate()?;
        let session = Arc::new(SessionStore::new(storage));
        let api: Arc<dyn ApiClient> =
            Arc::new(HttpApiClient::new(&config.api, Arc::clone(&session))?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(&config.client.timezone)?);
        let navigator = Arc::new(Navigator::new(host));

        Ok(Self::new(ScreenContext::new(
            session,
            navigator,
            api,
            views,
            dialog,
            clock,
            config.client.clone(),
        )))
    }

    /// Shared screen context.
    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    /// Session store.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.ctx.session
    }

    /// Navigator.
    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.ctx.navigator
    }

    /// Active screen.
    pub fn current_screen(&self) -> Screen {
        self.ctx.navigator.current()
    }

    /// Apply the banner preference and resume a persisted session.
    pub async fn start(&self) -> Result<()> {
        if self.ctx.session.hide_intro() {
            self.ctx.views.intro.hide();
        } else {
            self.ctx.views.intro.show();
        }

        if self.ctx.session.restore().is_none() {
            return Ok(());
        }
        info!("Resuming persisted session");
        let step = self.menu.load(&self.ctx).await;
        self.run(step).await
    }

    /// Hide the introduction banner, permanently if the user agrees.
    pub fn dismiss_intro(&self) {
        let permanent = self.ctx.dialog.confirm(HIDE_INTRO_PROMPT);
        self.ctx.session.set_hide_intro(permanent);
        self.ctx.views.intro.hide();
    }

    /// Sign in with the login form.
    pub async fn login(&self) -> Result<()> {
        let step = AuthScreen::login(&self.ctx).await;
        self.run(step).await
    }

    /// Register with the registration form, then sign in.
    pub async fn register(&self) -> Result<()> {
        let step = AuthScreen::register(&self.ctx).await;
        self.run(step).await
    }

    /// Sign out. Never fails.
    pub fn logout(&self) {
        AuthScreen::logout(&self.ctx);
    }

    /// Re-fetch the signed-in user and show the menu.
    pub async fn load_menu(&self) -> Result<()> {
        let step = self.menu.load(&self.ctx).await;
        self.run(step).await
    }

    /// Act on a menu entry.
    pub async fn select_menu(&self, item: MenuItem) -> Result<()> {
        let step = MenuScreen::select(&self.ctx, item);
        self.run(step).await
    }

    /// Save the profile form.
    pub async fn update_profile(&self) -> Result<()> {
        let step = self.profile.update(&self.ctx).await;
        self.run(step).await
    }

    /// Delete the account open in the profile editor.
    pub async fn delete_account(&self) -> Result<()> {
        let step = self.profile.delete(&self.ctx).await;
        self.run(step).await
    }

    /// Leave the profile editor.
    pub async fn cancel_profile(&self) -> Result<()> {
        let step = self.profile.cancel(&self.ctx);
        self.run(Ok(step)).await
    }

    /// Fetch and show the user list.
    pub async fn load_users(&self) -> Result<()> {
        let step = self.users.load(&self.ctx).await;
        self.run(step).await
    }

    /// Open a user's profile from the list.
    pub async fn select_user(&self, id: &str) -> Result<()> {
        let step = UsersScreen::select(&self.ctx, id).await;
        self.run(step).await
    }

    /// Leave the user list.
    pub async fn users_back(&self) -> Result<()> {
        self.run(Ok(ScreenResult::ShowMenu)).await
    }

    /// Fetch and show tasks in `scope`.
    pub async fn load_tasks(&self, scope: TaskScope) -> Result<()> {
        let step = self.tasks.load(&self.ctx, scope).await;
        self.run(step).await
    }

    /// Restrict the task list to `from..to`.
    pub async fn filter_tasks(&self, from: i64, to: i64) -> Result<()> {
        let step = self.tasks.filter(&self.ctx, from, to).await;
        self.run(step).await
    }

    /// Export a report of the tasks within `from..to`.
    pub async fn export_tasks(&self, from: i64, to: i64) -> Result<()> {
        let step = self.tasks.export(&self.ctx, from, to).await;
        self.run(step).await
    }

    /// Open a task from the list.
    pub async fn select_task(&self, id: &str) -> Result<()> {
        let step = TasksListScreen::select(&self.ctx, id).await;
        self.run(step).await
    }

    /// Open the editor on a new draft.
    pub async fn create_task(&self) -> Result<()> {
        let step = self.task.create_draft(&self.ctx);
        self.run(step).await
    }

    /// Leave the task list.
    pub async fn tasks_back(&self) -> Result<()> {
        self.run(Ok(ScreenResult::ShowMenu)).await
    }

    /// Save the task form.
    pub async fn submit_task(&self) -> Result<()> {
        let step = self.task.submit(&self.ctx).await;
        self.run(step).await
    }

    /// Delete the task open in the editor.
    pub async fn delete_task(&self) -> Result<()> {
        let step = self.task.delete(&self.ctx).await;
        self.run(step).await
    }

    /// Leave the task editor.
    pub async fn task_back(&self) -> Result<()> {
        let step = self.task.back(&self.ctx);
        self.run(Ok(step)).await
    }

    /// Scope of the task list.
    pub fn task_scope(&self) -> TaskScope {
        self.tasks.scope()
    }

    /// Follow `step` until a controller settles on a screen.
    ///
    /// Failures are reported to the user before being returned.
    async fn run(&self, mut step: Result<ScreenResult>) -> Result<()> {
        loop {
            match step {
                Ok(ScreenResult::Continue) => return Ok(()),
                Ok(next) => step = self.dispatch(next).await,
                Err(e) => {
                    self.report(&e);
                    return Err(e);
                }
            }
        }
    }

    async fn dispatch(&self, result: ScreenResult) -> Result<ScreenResult> {
        match result {
            ScreenResult::Continue => Ok(ScreenResult::Continue),
            ScreenResult::LoadMenu => self.menu.load(&self.ctx).await,
            ScreenResult::ShowMenu => {
                MenuScreen::show(&self.ctx);
                Ok(ScreenResult::Continue)
            }
            ScreenResult::LoadUsersList => self.users.load(&self.ctx).await,
            ScreenResult::LoadTasks(scope) => self.tasks.load(&self.ctx, scope).await,
            ScreenResult::ReloadTasks => self.tasks.reload(&self.ctx).await,
            ScreenResult::ShowTasksList => {
                TasksListScreen::show(&self.ctx);
                Ok(ScreenResult::Continue)
            }
            ScreenResult::OpenProfile(user) => self.profile.open(&self.ctx, user),
            ScreenResult::OpenTask(task) => self.task.open(&self.ctx, task),
            ScreenResult::Logout => {
                AuthScreen::logout(&self.ctx);
                Ok(ScreenResult::Continue)
            }
        }
    }

    fn report(&self, err: &ManageMeError) {
        if err.ends_session() {
            warn!(error = %err, "Session rejected");
            self.ctx.dialog.alert(SESSION_ENDED_MESSAGE);
            AuthScreen::logout(&self.ctx);
        } else {
            warn!(error = %err, screen = %self.current_screen(), "Action failed");
            self.ctx.dialog.alert(&err.to_string());
        }
    }
}
