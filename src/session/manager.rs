//! Session manager: the single owner of the [`Session`] value.
//!
//! DESIGN
//! ======
//! The session lives in a `watch` channel. The manager holds the only
//! sender, so it is the only writer; views call [`SessionManager::subscribe`]
//! to observe changes and invoke manager operations to request them.
//!
//! Identity refreshes (`mount`, `fetch_user`, `login`, `register`) and
//! `logout` run under one async lock, so each settles before the next one
//! starts and a late "who am I" response can never resurrect a session that
//! a logout already cleared.
//!
//! Each sign-in, registration and sign-out bumps a session epoch. A delayed
//! logout remembers the epoch it was scheduled in and stands down if the
//! session has moved on since.
//!
//! ERROR HANDLING
//! ==============
//! Remote failures are terminal for the call that triggered them. A failed
//! identity check always lands in `Unauthenticated` with a redirect to the
//! login route; login/register failures are handed back to the caller
//! untouched so the form can show them.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::state::{Gate, Phase, Session};
use crate::error::ApiError;
use crate::nav::{Navigator, Route};
use crate::net::api::PortalApi;
use crate::net::types::{Credentials, Registration, User};

pub struct SessionManager {
    api: Arc<dyn PortalApi>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Session>,
    transitions: Mutex<()>,
    epoch: AtomicU64,
}

impl SessionManager {
    #[must_use]
    pub fn new(api: Arc<dyn PortalApi>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { api, navigator, state, transitions: Mutex::new(()), epoch: AtomicU64::new(0) }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// True only while an admin user is signed in.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Loading-gate decision for protected screens.
    #[must_use]
    pub fn gate(&self) -> Gate {
        self.state.borrow().gate()
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Run the first identity check. Later calls return the current session
    /// without touching the server.
    pub async fn mount(&self) -> Session {
        let _guard = self.transitions.lock().await;
        if self.state.borrow().phase == Phase::Unchecked {
            // A failed check already redirected; the session carries the outcome.
            self.check_identity().await.ok();
        }
        self.session()
    }

    /// Ask the server who we are and publish the answer.
    ///
    /// # Errors
    ///
    /// Returns the remote failure after the session has been cleared and the
    /// login redirect issued.
    pub async fn fetch_user(&self) -> Result<User, ApiError> {
        let _guard = self.transitions.lock().await;
        self.check_identity().await
    }

    /// Submit credentials, then refresh the identity.
    ///
    /// # Errors
    ///
    /// A rejected login (typically 401) is returned as-is and leaves the
    /// session untouched. A failed identity refresh after an accepted login
    /// is returned after the session has been cleared.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let _guard = self.transitions.lock().await;
        if let Err(err) = self.api.login(credentials).await {
            tracing::warn!(username = %credentials.username, error = %err, "login rejected");
            return Err(err);
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let user = self.check_identity().await?;
        self.navigator.navigate(Route::Dashboard);
        Ok(user)
    }

    /// Create an account, then refresh the identity.
    ///
    /// # Errors
    ///
    /// A rejected registration (409 conflict, validation) is returned as-is
    /// and leaves the session untouched.
    pub async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        let _guard = self.transitions.lock().await;
        if let Err(err) = self.api.register(registration).await {
            tracing::warn!(user_name = %registration.user_name, error = %err, "registration rejected");
            return Err(err);
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let user = self.check_identity().await?;
        self.navigator.navigate(Route::Dashboard);
        Ok(user)
    }

    /// Invalidate the remote session if possible and always clear the local one.
    pub async fn logout(&self) {
        let _guard = self.transitions.lock().await;
        self.sign_out().await;
    }

    /// Force a logout once `delay` has passed, leaving time for a notice.
    ///
    /// The logout is skipped if the user signed in, registered or signed out
    /// in the meantime.
    pub fn logout_after(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let scheduled = self.epoch.load(Ordering::SeqCst);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _guard = manager.transitions.lock().await;
            if manager.epoch.load(Ordering::SeqCst) != scheduled {
                tracing::debug!(scheduled, "session changed since logout was scheduled; skipping");
                return;
            }
            manager.sign_out().await;
        })
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    async fn sign_out(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = self.api.logout().await {
            tracing::warn!(error = %err, "remote logout failed; clearing local session anyway");
        }
        self.publish(Session { user: None, ready: true, phase: Phase::Unauthenticated });
        tracing::info!("session cleared");
        self.navigator.navigate(Route::Login);
    }

    async fn check_identity(&self) -> Result<User, ApiError> {
        self.state.send_modify(|session| session.phase = Phase::Checking);

        match self.api.who_am_i().await {
            Ok(record) => {
                let user = User::from(record);
                tracing::info!(username = %user.username, admin = user.admin, "session authenticated");
                self.publish(Session { user: Some(user.clone()), ready: true, phase: Phase::Authenticated });
                Ok(user)
            }
            Err(err) => {
                tracing::info!(error = %err, "identity check failed; session unauthenticated");
                self.publish(Session { user: None, ready: true, phase: Phase::Unauthenticated });
                self.navigator.navigate(Route::Login);
                Err(err)
            }
        }
    }

    /// Replace the session, notifying subscribers only when it changed.
    fn publish(&self, next: Session) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
