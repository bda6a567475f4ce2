//! Reaction handles and the per-store reaction registry.
//!
//! A reaction is any side-effecting computation registered with
//! [`ReactiveStore::autorun`](super::ReactiveStore::autorun). Closures have no
//! usable identity of their own, so every registration is assigned a
//! [`ReactionId`]: two identical closures registered separately are two
//! distinct reactions.

use std::fmt;

use super::ReactiveStore;

/// Unique identifier for a reaction within one store.
///
/// Ids are handed out by incrementing index, so they are stable for the
/// lifetime of the store and order reactions by registration time. They are
/// not meaningful across different stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReactionId(usize);

impl ReactionId {
    /// Get the raw index value.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reaction#{}", self.0)
    }
}

/// The boxed form every reaction is stored as.
///
/// Reactions get the store passed in rather than capturing it, which is what
/// lets them call `get`/`set` while the store drives them.
pub(crate) type BoxedReaction<K, V> = Box<dyn FnMut(&mut ReactiveStore<K, V>) + Send>;

struct ReactionSlot<K, V> {
    /// `None` while the reaction is executing.
    reaction: Option<BoxedReaction<K, V>>,
    runs: usize,
}

/// Owns every registered reaction, indexed by [`ReactionId`].
///
/// Reactions are never removed: a subscription lives as long as the store.
pub(crate) struct ReactionRegistry<K, V> {
    slots: Vec<ReactionSlot<K, V>>,
}

impl<K, V> ReactionRegistry<K, V> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a reaction and allocate its id.
    pub(crate) fn insert(&mut self, reaction: BoxedReaction<K, V>) -> ReactionId {
        let id = ReactionId(self.slots.len());
        self.slots.push(ReactionSlot {
            reaction: Some(reaction),
            runs: 0,
        });
        id
    }

    /// Check a reaction out for execution and count the run.
    ///
    /// Returns `None` if the id is unknown or the reaction is already
    /// checked out.
    pub(crate) fn take(&mut self, id: ReactionId) -> Option<BoxedReaction<K, V>> {
        let slot = self.slots.get_mut(id.0)?;
        let reaction = slot.reaction.take()?;
        slot.runs += 1;
        Some(reaction)
    }

    /// Return a reaction checked out with [`take`](Self::take).
    pub(crate) fn restore(&mut self, id: ReactionId, reaction: BoxedReaction<K, V>) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            debug_assert!(slot.reaction.is_none(), "{id} restored twice");
            slot.reaction = Some(reaction);
        }
    }

    /// Number of times the reaction has been executed.
    pub(crate) fn run_count(&self, id: ReactionId) -> Option<usize> {
        self.slots.get(id.0).map(|slot| slot.runs)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> BoxedReaction<String, i32> {
        Box::new(|_store: &mut ReactiveStore<String, i32>| {})
    }

    #[test]
    fn reaction_ids_are_sequential_and_unique() {
        let mut registry = ReactionRegistry::new();
        let id1 = registry.insert(noop());
        let id2 = registry.insert(noop());
        let id3 = registry.insert(noop());

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert!(id1 < id2 && id2 < id3);
        assert_eq!(id3.raw(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn take_counts_runs_and_blocks_reentry() {
        let mut registry = ReactionRegistry::new();
        let id = registry.insert(noop());
        assert_eq!(registry.run_count(id), Some(0));

        let reaction = registry.take(id).unwrap();
        assert_eq!(registry.run_count(id), Some(1));

        // Checked out: cannot be taken again until restored
        assert!(registry.take(id).is_none());

        registry.restore(id, reaction);
        assert!(registry.take(id).is_some());
        assert_eq!(registry.run_count(id), Some(2));
    }

    #[test]
    fn unknown_id_has_no_run_count() {
        let registry = ReactionRegistry::<String, i32>::new();
        assert_eq!(registry.run_count(ReactionId(7)), None);
    }

    #[test]
    fn display_names_the_index() {
        assert_eq!(ReactionId(4).to_string(), "reaction#4");
    }
}
