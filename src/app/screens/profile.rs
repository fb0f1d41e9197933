//! Profile editing and account deletion.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use super::common::{check_view, login_error, ScreenContext};
use super::ScreenResult;
use crate::app::navigation::Screen;
use crate::auth::validation::validate_password;
use crate::auth::Permission;
use crate::model::User;
use crate::Result;

/// Shown after a successful profile or task update.
pub const UPDATE_MESSAGE: &str = "Update successful!";

/// Shown after deleting one's own account.
pub const FAREWELL_MESSAGE: &str = "Thank you for using ManageMe";

/// Asked before deleting an account.
pub const DELETE_ACCOUNT_PROMPT: &str = "If you are sure you wish to permanently delete your account and all associated tasks, type in your password to confirm";

/// Profile screen controller.
#[derive(Default)]
pub struct ProfileScreen {
    editing: Mutex<Option<User>>,
}

impl ProfileScreen {
    /// Create a profile controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// User currently being edited.
    pub fn editing(&self) -> Option<User> {
        self.editing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Open the editor on `user`.
    pub fn open(&self, ctx: &ScreenContext, user: User) -> Result<ScreenResult> {
        let role_editable = ctx.can(Permission::ModifyAllUsers);
        ctx.views.profile.init(&user, role_editable);
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = Some(user);
        ctx.navigator.show(Screen::Profile);
        Ok(ScreenResult::Continue)
    }

    /// Send the edited profile.
    ///
    /// Editing oneself refreshes the cached user and returns to the menu;
    /// editing someone else returns to the user list.
    pub async fn update(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        let Some(target) = self.editing() else {
            warn!("Profile update without a profile open");
            return Ok(ScreenResult::Continue);
        };
        let me = ctx.signed_in_user()?;

        check_view(ctx.views.profile.validate())?;
        let patch = ctx
            .views
            .profile
            .read()
            .into_patch(ctx.can(Permission::ModifyAllUsers))?;

        let updated = ctx.api.patch_user(&target.id, &patch).await?;
        info!(user_id = %updated.id, "Profile updated");
        ctx.dialog.alert(UPDATE_MESSAGE);

        if updated.id == me.id {
            ctx.session.update_user(updated);
            Ok(ScreenResult::LoadMenu)
        } else {
            Ok(ScreenResult::LoadUsersList)
        }
    }

    /// Delete the account being edited, after the operator proves they
    /// know their own password.
    ///
    /// Deleting one's own account signs out; deleting someone else's
    /// returns to the menu.
    pub async fn delete(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        let Some(target) = self.editing() else {
            warn!("Account delete without a profile open");
            return Ok(ScreenResult::Continue);
        };
        let me = ctx.signed_in_user()?;

        let Some(password) = ctx.dialog.prompt(DELETE_ACCOUNT_PROMPT) else {
            return Ok(ScreenResult::Continue);
        };
        validate_password(&password)?;

        ctx.api
            .login(&me.username, &password)
            .await
            .map_err(login_error)?;
        let deleted = ctx.api.delete_user(&target.id).await?;
        info!(user_id = %deleted.id, by = %me.id, "Account deleted");
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = None;

        if deleted.id == me.id {
            ctx.dialog.alert(FAREWELL_MESSAGE);
            Ok(ScreenResult::Logout)
        } else {
            Ok(ScreenResult::ShowMenu)
        }
    }

    /// Leave the editor without saving.
    pub fn cancel(&self, ctx: &ScreenContext) -> ScreenResult {
        ctx.views.profile.clear();
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = None;
        ScreenResult::LoadMenu
    }
}
