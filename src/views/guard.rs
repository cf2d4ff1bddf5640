//! Protected-view guard.
//!
//! Every protected screen goes through [`protect`], so an unauthenticated
//! visit behaves the same everywhere: redirect to login, render nothing.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::nav::Navigator;
use crate::net::types::User;
use crate::session::{Gate, Session};

/// Shown while the first identity check is pending.
pub const LOADING_MESSAGE: &str = "Loading Project Assignment Portal";

#[derive(Debug, Clone, PartialEq)]
pub enum Guarded<T> {
    Loading,
    Redirected,
    Rendered(T),
}

impl<T> Guarded<T> {
    pub fn rendered(self) -> Option<T> {
        match self {
            Self::Rendered(view) => Some(view),
            Self::Loading | Self::Redirected => None,
        }
    }
}

/// Render `view` for the session user, or hold/redirect when there is none.
pub fn protect<T, F>(session: &Session, navigator: &dyn Navigator, view: F) -> Guarded<T>
where
    F: FnOnce(&User) -> T,
{
    match session.gate() {
        Gate::Loading => Guarded::Loading,
        Gate::Redirect(route) => {
            navigator.navigate(route);
            Guarded::Redirected
        }
        Gate::Authenticated(user) => Guarded::Rendered(view(&user)),
    }
}

/// Admin gate for privileged controls: `None` unless an admin is signed in.
pub fn admin_only<T, F>(session: &Session, view: F) -> Option<T>
where
    F: FnOnce(&User) -> T,
{
    session.user.as_ref().filter(|u| u.admin).map(view)
}
