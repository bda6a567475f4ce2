//! Store Configuration
//!
//! The store has a single tunable: an optional cap on how many queued
//! reactions one drain cycle may execute. Without it a reaction that writes a
//! key it depends on re-enqueues itself forever, exactly as callers of the
//! store have always been warned about. With it the cycle is cut short and
//! reported as [`StoreError::DrainLimitExceeded`](crate::StoreError).

use serde::{Deserialize, Serialize};

/// Configuration for a [`ReactiveStore`](crate::ReactiveStore).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of queued reactions executed by one drain cycle.
    ///
    /// `None` means unbounded.
    pub drain_limit: Option<usize>,
}

impl StoreConfig {
    /// Create the default (unbounded) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of reactions a single drain cycle may execute.
    pub fn with_drain_limit(mut self, limit: usize) -> Self {
        self.drain_limit = Some(limit);
        self
    }

    /// Remove any drain cap.
    pub fn unbounded(mut self) -> Self {
        self.drain_limit = None;
        self
    }
}
