//! Reactive Context
//!
//! The reactive context records which reaction is currently running. This is
//! what makes dependency tracking automatic: when a key is read, the store
//! asks its context for the active reaction and subscribes it to the key.
//!
//! # Implementation
//!
//! The context is a single slot owned by each store, not a thread-local, so
//! independent stores never see each other's reactions. Entering a reaction
//! hands back whatever was active before, and exiting puts it back. In the
//! common case that is `None`; a reaction registered from inside another
//! reaction nests one level deep and restores the outer one when it returns.

use super::ReactionId;

#[derive(Debug, Default)]
pub(crate) struct ReactiveContext {
    active: Option<ReactionId>,
}

impl ReactiveContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Mark `reaction` as active, returning the reaction it displaces.
    pub(crate) fn enter(&mut self, reaction: ReactionId) -> Option<ReactionId> {
        self.active.replace(reaction)
    }

    /// Leave `reaction`, reinstating the reaction returned by [`enter`](Self::enter).
    pub(crate) fn exit(&mut self, reaction: ReactionId, previous: Option<ReactionId>) {
        debug_assert_eq!(
            self.active,
            Some(reaction),
            "ReactiveContext mismatch: expected {:?}, got {:?}",
            Some(reaction),
            self.active
        );
        self.active = previous;
    }

    /// The reaction currently running, if any.
    pub(crate) fn current(&self) -> Option<ReactionId> {
        self.active
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
