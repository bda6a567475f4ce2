//! Store Entries
//!
//! One entry exists per key. It is both the key's value cell and the key's
//! node in the dependency graph: the edges out of a key are its dependents.

use indexmap::IndexSet;

use crate::reactive::ReactionId;

/// The per-key record: current value plus subscribed reactions.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    /// `None` until the key is first written.
    pub(crate) value: Option<V>,

    /// Reactions that read this key while active, in first-subscribed order.
    /// Only ever grows.
    dependents: IndexSet<ReactionId>,
}

impl<V> Entry<V> {
    /// Subscribe a reaction. Returns `false` if it was already subscribed.
    pub(crate) fn subscribe(&mut self, reaction: ReactionId) -> bool {
        self.dependents.insert(reaction)
    }

    pub(crate) fn dependents(&self) -> impl Iterator<Item = ReactionId> + '_ {
        self.dependents.iter().copied()
    }

    pub(crate) fn dependent_count(&self) -> usize {
        self.dependents.len()
    }
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            value: None,
            dependents: IndexSet::new(),
        }
    }
}
