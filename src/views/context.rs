//! Shared collaborators for view models.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::policy::{ADMIN_REQUIRED_MESSAGE, Failure, Reaction, reaction, toast_for};
use crate::error::ApiError;
use crate::net::api::PortalApi;
use crate::session::SessionManager;
use crate::toast::{Notifier, Toast};

/// Everything a screen needs to talk to the outside world.
#[derive(Clone)]
pub struct ViewContext {
    pub api: Arc<dyn PortalApi>,
    pub session: Arc<SessionManager>,
    pub notifier: Arc<dyn Notifier>,
    /// Pause between a "you will be logged out" notice and the logout.
    pub logout_delay: Duration,
}

impl ViewContext {
    #[must_use]
    pub fn new(
        api: Arc<dyn PortalApi>,
        session: Arc<SessionManager>,
        notifier: Arc<dyn Notifier>,
        logout_delay: Duration,
    ) -> Self {
        Self { api, session, notifier, logout_delay }
    }

    pub fn notify(&self, toast: Toast) {
        self.notifier.notify(toast);
    }

    /// Surface a remote failure. A 401 also schedules the forced logout and
    /// returns its handle.
    pub fn report(&self, failure: &Failure, err: &ApiError) -> Option<JoinHandle<()>> {
        tracing::warn!(title = %failure.title, error = %err, "view action failed");
        self.notifier.notify(toast_for(failure, err));
        match reaction(err) {
            Reaction::ExpireSession => Some(self.session.logout_after(self.logout_delay)),
            Reaction::Notify => None,
        }
    }

    /// Admin gate for privileged actions. Refuses locally, with the same
    /// notice a 403 would produce, so no request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] when the session user is not an admin.
    pub fn require_admin(&self, failure: &Failure) -> Result<(), ApiError> {
        if self.session.is_admin() {
            return Ok(());
        }
        let err = ApiError::Forbidden { body: ADMIN_REQUIRED_MESSAGE.to_owned() };
        self.notifier.notify(toast_for(failure, &err));
        Err(err)
    }
}
