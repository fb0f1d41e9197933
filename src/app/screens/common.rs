//! Shared state for screen controllers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::app::navigation::Navigator;
use crate::app::views::{Dialog, Views};
use crate::auth::validation::ValidationError;
use crate::auth::{has_permission, Permission, SessionStore};
use crate::config::ClientConfig;
use crate::datetime::Clock;
use crate::model::User;
use crate::{ManageMeError, Result};

/// Shared context for screen controllers.
pub struct ScreenContext {
    /// Current session.
    pub session: Arc<SessionStore>,
    /// Active-screen state.
    pub navigator: Arc<Navigator>,
    /// Remote API.
    pub api: Arc<dyn ApiClient>,
    /// Views.
    pub views: Views,
    /// Modal messages.
    pub dialog: Arc<dyn Dialog>,
    /// Time source for drafts and expiry checks.
    pub clock: Arc<dyn Clock>,
    /// Client settings.
    pub client: ClientConfig,
}

impl ScreenContext {
    /// Create a new screen context.
    pub fn new(
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
        api: Arc<dyn ApiClient>,
        views: Views,
        dialog: Arc<dyn Dialog>,
        clock: Arc<dyn Clock>,
        client: ClientConfig,
    ) -> Self {
        Self {
            session,
            navigator,
            api,
            views,
            dialog,
            clock,
            client,
        }
    }

    /// The signed-in user, or `AuthorizationDenied` when signed out.
    pub fn signed_in_user(&self) -> Result<User> {
        self.session
            .current_user()
            .ok_or_else(|| ManageMeError::AuthorizationDenied("not signed in".to_string()))
    }

    /// Whether the signed-in user holds `flag`. False when signed out.
    pub fn can(&self, flag: Permission) -> bool {
        self.session
            .current_user()
            .is_some_and(|user| has_permission(&user, flag))
    }
}

/// Turn a view's own validation message into an error.
pub(super) fn check_view(message: Option<String>) -> Result<()> {
    match message {
        Some(message) if !message.is_empty() => Err(ValidationError::View(message).into()),
        _ => Ok(()),
    }
}

/// Map a failed `login` call.
///
/// A 401 here means the username/password pair was wrong, not that the
/// session expired, so it must not end the session.
pub(super) fn login_error(err: ApiError) -> ManageMeError {
    match err {
        ApiError::Unauthorized(message) => ManageMeError::RequestFailed(message),
        other => other.into(),
    }
}
