//! Route targets and the navigation seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session manager and views request redirects through [`Navigator`]
//! instead of touching a router, so the same logic drives a browser shell,
//! the CLI, or a test recorder.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

/// Screens the portal can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Customers,
    Projects,
    Users,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
            Self::Dashboard => "/dashboard",
            Self::Customers => "/dashboard/customers",
            Self::Projects => "/dashboard/projects",
            Self::Users => "/dashboard/users",
        }
    }

    /// Whether the screen needs a confirmed session user before rendering.
    #[must_use]
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator for headless shells: records the redirect in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(path = route.path(), "navigate");
    }
}
