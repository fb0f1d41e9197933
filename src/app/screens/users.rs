//! User list.

use tracing::debug;

use super::common::ScreenContext;
use super::ScreenResult;
use crate::app::navigation::Screen;
use crate::app::ticket::RequestSequence;
use crate::Result;

/// User list screen controller.
#[derive(Default)]
pub struct UsersScreen {
    tickets: RequestSequence,
}

impl UsersScreen {
    /// Create a user list controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and show every user.
    pub async fn load(&self, ctx: &ScreenContext) -> Result<ScreenResult> {
        let ticket = self.tickets.issue(ctx.session.generation());
        let users = ctx.api.list_users().await?;
        if !self.tickets.is_current(ticket, ctx.session.generation()) {
            debug!(count = users.len(), "Dropping superseded user list");
            return Ok(ScreenResult::Continue);
        }

        ctx.views.users.init(&users);
        ctx.navigator.show(Screen::UsersList);
        Ok(ScreenResult::Continue)
    }

    /// Open the profile of the user with `id`.
    pub async fn select(ctx: &ScreenContext, id: &str) -> Result<ScreenResult> {
        let user = ctx.api.get_user(id).await?;
        Ok(ScreenResult::OpenProfile(user))
    }
}
