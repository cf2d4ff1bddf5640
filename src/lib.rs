//! Client core for the Project Assignment Portal.
//!
//! This crate owns everything between the portal's REST API and a screen:
//! the typed API client, the session manager, and the view models for the
//! dashboard, resource lists and admin actions. It is shell agnostic; a
//! browser front end or the bundled CLI plug in through the [`nav::Navigator`]
//! and [`toast::Notifier`] seams.

pub mod config;
pub mod error;
pub mod nav;
pub mod net;
pub mod session;
pub mod toast;
pub mod views;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::PortalConfig;
pub use error::{ApiError, ConfigError, ErrorKind};
pub use net::api::{HttpApi, PortalApi};
pub use session::{Gate, Phase, Session, SessionManager};
pub use views::{ViewContext, ViewScope};
