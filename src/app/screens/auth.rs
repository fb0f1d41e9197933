//! Sign-in, registration and sign-out.

use tracing::info;

use super::common::{check_view, login_error, ScreenContext};
use super::ScreenResult;
use crate::app::navigation::Screen;
use crate::Result;

/// Shown after a successful registration.
pub const WELCOME_MESSAGE: &str = "Welcome to ManageMe!";

/// Sign-in screen controller.
pub struct AuthScreen;

impl AuthScreen {
    /// Sign in with the credentials typed into the login form.
    pub async fn login(ctx: &ScreenContext) -> Result<ScreenResult> {
        check_view(ctx.views.login.validate())?;
        let form = ctx.views.login.read();
        form.validate()?;

        Self::sign_in(ctx, &form.username, &form.password).await
    }

    /// Create an account from the registration form and sign in with it.
    pub async fn register(ctx: &ScreenContext) -> Result<ScreenResult> {
        check_view(ctx.views.register.validate())?;
        let new_user = ctx.views.register.read().into_new_user()?;

        let user = ctx.api.register_user(&new_user).await?;
        info!(user_id = %user.id, username = %user.username, "Account registered");
        ctx.dialog.alert(WELCOME_MESSAGE);

        Self::sign_in(ctx, &new_user.username, &new_user.password).await
    }

    /// Drop the session and return to the sign-in screen. Never fails.
    pub fn logout(ctx: &ScreenContext) {
        ctx.session.clear();
        ctx.navigator.show(Screen::Auth);
        info!("Signed out");
    }

    async fn sign_in(ctx: &ScreenContext, username: &str, password: &str) -> Result<ScreenResult> {
        let response = ctx
            .api
            .login(username, password)
            .await
            .map_err(login_error)?;
        ctx.session.set(response.credential, response.user)?;
        info!(username, "Signed in");

        ctx.views.login.clear();
        ctx.views.register.clear();
        Ok(ScreenResult::LoadMenu)
    }
}
