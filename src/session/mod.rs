//! Client-side session: who is signed in, and whether we know yet.
//!
//! SYSTEM CONTEXT
//! ==============
//! `state` holds the plain session value and the loading-gate decision;
//! `manager` owns that value and is its only writer.

pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::{Gate, Phase, Session};
