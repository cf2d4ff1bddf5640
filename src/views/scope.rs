//! Lifetime of one screen's view model.
//!
//! A [`ViewScope`] tracks whether the screen is still mounted and which load
//! is the latest. Results from a load that is no longer current are dropped
//! without touching state, toasts or the session.

#[cfg(test)]
#[path = "scope_test.rs"]
mod scope_test;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug)]
pub struct ViewScope {
    generation: AtomicU64,
    mounted: AtomicBool,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self { generation: AtomicU64::new(0), mounted: AtomicBool::new(true) }
    }
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding any load still in flight.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while the screen is mounted and `generation` is the latest load.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_mounted() && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Detach from the screen. Loads still in flight are discarded.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}
