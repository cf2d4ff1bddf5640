//! Networking: the portal REST client and its wire schema.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the [`api::PortalApi`] seam and its reqwest implementation,
//! and `types` defines the shared wire schema.

pub mod api;
pub mod types;
