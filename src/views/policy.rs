//! Failure policy: how each error kind is surfaced.
//!
//! 401 expires the session (notice, then forced logout after a delay).
//! Everything else is a notice only; no state changes, no retries.

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;

use crate::error::{ApiError, ErrorKind};
use crate::toast::Toast;

pub const SESSION_EXPIRED_TITLE: &str = "Session Expired";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your credentials have expired, you must log in again";
pub const ADMIN_REQUIRED_MESSAGE: &str = "You must have admin rights to perform this action";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Clear the session and return to login after the notice.
    ExpireSession,
    Notify,
}

/// Wording for a failed action: the toast title and the record it concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub title: String,
    pub subject: &'static str,
}

impl Failure {
    #[must_use]
    pub fn new(title: impl Into<String>, subject: &'static str) -> Self {
        Self { title: title.into(), subject }
    }
}

#[must_use]
pub fn reaction(err: &ApiError) -> Reaction {
    match err.kind() {
        ErrorKind::Unauthorized => Reaction::ExpireSession,
        ErrorKind::Forbidden | ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::Unknown => Reaction::Notify,
    }
}

#[must_use]
pub fn toast_for(failure: &Failure, err: &ApiError) -> Toast {
    match err.kind() {
        ErrorKind::Unauthorized => Toast::error(SESSION_EXPIRED_TITLE, SESSION_EXPIRED_MESSAGE),
        ErrorKind::Forbidden => Toast::error(&failure.title, ADMIN_REQUIRED_MESSAGE),
        ErrorKind::NotFound => Toast::error(&failure.title, format!("{} not found!", failure.subject)),
        ErrorKind::Conflict => Toast::error(
            &failure.title,
            err.detail()
                .unwrap_or_else(|| format!("{} conflicts with existing records", failure.subject)),
        ),
        ErrorKind::Unknown => Toast::error(&failure.title, err.to_string()),
    }
}
