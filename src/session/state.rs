//! Session value published by the session manager.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use crate::nav::Route;
use crate::net::types::User;

/// Where the identity check stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has asked the server yet.
    #[default]
    Unchecked,
    /// A "who am I" call is in flight.
    Checking,
    Authenticated,
    Unauthenticated,
}

/// Current identity plus the readiness flag.
///
/// `ready` flips to true once the first identity check settles and never
/// flips back. `user` is only ever `Some` while `ready` is true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub ready: bool,
    pub phase: Phase,
}

/// What a protected screen should do with the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// First identity check still pending; show the loading screen.
    Loading,
    Authenticated(User),
    Redirect(Route),
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.admin)
    }

    /// Checked and nobody is signed in.
    #[must_use]
    pub fn should_redirect(&self) -> bool {
        self.ready && self.user.is_none()
    }

    #[must_use]
    pub fn gate(&self) -> Gate {
        match (&self.user, self.ready) {
            (Some(user), _) => Gate::Authenticated(user.clone()),
            (None, true) => Gate::Redirect(Route::Login),
            (None, false) => Gate::Loading,
        }
    }
}
