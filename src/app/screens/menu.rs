//! Main menu.
//!
//! Loading the menu also re-hydrates the session: the signed-in user is
//! fetched again by the credential's subject so the menu always reflects
//! the server's current view of the account.

use tracing::{debug, warn};

use super::common::ScreenContext;
use super::tasks_list::TaskScope;
use super::ScreenResult;
use crate::app::navigation::Screen;
use crate::app::ticket::RequestSequence;
use crate::auth::{has_permission, Permission};
use crate::model::User;
use crate::{ManageMeError, Result};

/// Menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    /// Edit own profile.
    Profile,
    /// Own tasks.
    OwnTasks,
    /// Every user's tasks.
    AllTasks,
    /// User administration.
    Users,
    /// Sign out.
    Logout,
}

impl MenuItem {
    /// Label shown in the menu.
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Profile => "Profile",
            MenuItem::OwnTasks => "My Tasks",
            MenuItem::AllTasks => "All Tasks",
            MenuItem::Users => "Users",
            MenuItem::Logout => "Logout",
        }
    }

    /// Entries offered to `user`, in display order.
    pub fn items_for(user: &User) -> Vec<MenuItem> {
        let mut items = vec![MenuItem::Profile];
        if has_permission(user, Permission::ModifyOwnTasks) {
            items.push(MenuItem::OwnTasks);
        }
        if has_permission(user, Permission::ViewAllTasks) {
            items.push(MenuItem::AllTasks);
        }
        if has_permission(user, Permission::ModifyAllUsersRestricted) {
            items.push(MenuItem::Users);
        }
        items.push(MenuItem::Logout);
        items
    }
}

/// Menu screen controller.
#[derive(Default)]
pub struct MenuScreen {
    tickets: RequestSequence,
}

impl MenuScreen {
    /// Create a menu controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-fetch the signed-in user and show the menu.
    ///
    /// Does nothing without a session. An expired credential ends the
    /// session without a request.
    pub async fn load(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        let generation = ctx.session.generation();
        let Some(session) = ctx.session.get() else {
            debug!("No session, menu not loaded");
            return Ok(ScreenResult::Continue);
        };
        if session.claims.is_expired(ctx.clock.now().timestamp()) {
            return Err(ManageMeError::AuthorizationDenied(
                "credential expired".to_string(),
            ));
        }

        let ticket = self.tickets.issue(generation);
        let user = ctx.api.get_user(&session.claims.subject).await?;
        if !self.tickets.is_current(ticket, ctx.session.generation()) {
            debug!(user_id = %user.id, "Dropping superseded menu load");
            return Ok(ScreenResult::Continue);
        }

        if !ctx.session.update_user(user.clone()) {
            // Snapshot belongs to someone other than the credential's subject.
            if ctx.session.credential().as_deref() != Some(session.credential.as_str()) {
                debug!(user_id = %user.id, "Session changed during menu load");
                return Ok(ScreenResult::Continue);
            }
            ctx.session.set(session.credential, user.clone())?;
        }
        ctx.views.menu.init(&user, &MenuItem::items_for(&user));
        ctx.navigator.show(Screen::Menu);
        Ok(ScreenResult::Continue)
    }

    /// Show the menu as last rendered.
    pub fn show(ctx: &ScreenContext) {
        ctx.navigator.show(Screen::Menu);
    }

    /// Act on a menu entry. Entries not offered to the user are ignored.
    pub fn select(ctx: &ScreenContext, item: MenuItem) -> Result<ScreenResult> {
        let user = ctx.signed_in_user()?;
        if !MenuItem::items_for(&user).contains(&item) {
            warn!(user_id = %user.id, item = item.label(), "Menu item not offered");
            return Ok(ScreenResult::Continue);
        }

        Ok(match item {
            MenuItem::Profile => ScreenResult::OpenProfile(user),
            MenuItem::OwnTasks => ScreenResult::LoadTasks(TaskScope::Own),
            MenuItem::AllTasks => ScreenResult::LoadTasks(TaskScope::All),
            MenuItem::Users => ScreenResult::LoadUsersList,
            MenuItem::Logout => ScreenResult::Logout,
        })
    }
}
