//! View models: the logic behind each portal screen, minus the markup.
//!
//! SYSTEM CONTEXT
//! ==============
//! Screens read the session, call manager operations, and render one of
//! loading / authenticated / redirect. Everything here reaches the outside
//! world only through the [`ViewContext`] seams (API, session, notifier).

pub mod actions;
pub mod context;
pub mod dashboard;
pub mod guard;
pub mod policy;
pub mod resource;
pub mod scope;

pub use context::ViewContext;
pub use scope::ViewScope;
