//! Error types for the reactive store.
//!
//! The core contract has no failure modes: unknown keys read as absent and
//! any key/value pair can be written. The only reported condition is the
//! opt-in drain cap from [`StoreConfig`](crate::StoreConfig).

use thiserror::Error;

/// Errors surfaced by the fallible store operations (`try_set`, `try_autorun`).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A single drain cycle tried to execute more queued reactions than the
    /// configured limit allows. This almost always means a reaction writes a
    /// key it (transitively) depends on.
    #[error("drain limit of {limit} reactions exceeded ({pending} still pending); likely a dependency cycle")]
    DrainLimitExceeded {
        /// The configured limit.
        limit: usize,
        /// Reactions that were still queued when the drain was aborted.
        pending: usize,
    },
}
