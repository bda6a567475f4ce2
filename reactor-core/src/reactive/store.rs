//! Reactive Store
//!
//! The store is the central coordinator. It owns the key/value map, the
//! dependency edges hanging off each key, the pending-reaction queue and the
//! active-reaction slot.
//!
//! # How It Works
//!
//! 1. [`autorun`](ReactiveStore::autorun) registers a reaction and runs it
//!    once with the reaction marked active.
//!
//! 2. Every [`get`](ReactiveStore::get) made while a reaction is active
//!    subscribes that reaction to the key read.
//!
//! 3. Every [`set`](ReactiveStore::set) stores the value and appends the key's
//!    dependents to the pending queue.
//!
//! 4. When the outermost call returns to user code (no reaction active), the
//!    queue is drained: each queued reaction runs, again marked active, and
//!    whatever it writes is appended to the same queue.
//!
//! # Cycles
//!
//! A reaction that writes a key it depends on re-enqueues itself and the
//! drain never ends. Avoiding that is the caller's job. A drain limit in
//! [`StoreConfig`] turns the endless loop into a [`StoreError`].

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::context::ReactiveContext;
use super::reaction::{ReactionId, ReactionRegistry};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::graph::{EngineState, Entry, UpdateScheduler};

/// A key/value store that re-runs reactions when the keys they read change.
///
/// # Type Parameters
///
/// - `K`: the key type. `String` keys can be read with `&str`.
/// - `V`: the value type. Reads hand out clones, like a signal would.
///
/// # Example
///
/// ```rust
/// use reactor_core::ReactiveStore;
///
/// let mut store = ReactiveStore::<String, i32>::new();
/// store.set("x", 2);
///
/// store.autorun(|s| {
///     let x = s.get("x").unwrap_or(0);
///     s.set("y", x + 1);
/// });
/// assert_eq!(store.get("y"), Some(3));
///
/// store.set("x", 5);
/// assert_eq!(store.get("y"), Some(6));
/// ```
pub struct ReactiveStore<K, V> {
    /// Every key ever read while tracking or written, in first-touch order.
    entries: IndexMap<K, Entry<V>>,

    reactions: ReactionRegistry<K, V>,

    /// The currently running reaction.
    context: ReactiveContext,

    /// Pending queue and drain bookkeeping.
    scheduler: UpdateScheduler,

    config: StoreConfig,
}

impl<K, V> ReactiveStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entries: IndexMap::new(),
            reactions: ReactionRegistry::new(),
            context: ReactiveContext::new(),
            scheduler: UpdateScheduler::new(config.drain_limit),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect from the next drain cycle.
    pub fn set_config(&mut self, config: StoreConfig) {
        self.scheduler.set_limit(config.drain_limit);
        self.config = config;
    }

    /// Get the current value of `key`, or `None` if it was never written.
    ///
    /// If called while a reaction is running, that reaction is subscribed to
    /// `key` and will re-run whenever `key` is written.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let Some(reaction) = self.context.current() else {
            return self.get_untracked(key);
        };

        let index = match self.entries.get_index_of(key) {
            Some(index) => index,
            None => self.entries.insert_full(key.to_owned(), Entry::default()).0,
        };
        let entry = &mut self.entries[index];
        if entry.subscribe(reaction) {
            trace!(reaction = %reaction, key_index = index, "subscribed to key");
        }
        entry.value.clone()
    }

    /// Get the current value of `key` without subscribing anything to it.
    pub fn get_untracked<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).and_then(|entry| entry.value.clone())
    }

    /// Store `value` under `key` and schedule every reaction that read it.
    ///
    /// Called from user code, this also drains the queue, so all affected
    /// reactions (and everything they trigger in turn) have run by the time it
    /// returns. Called from inside a reaction, the dependents only run once
    /// that reaction has finished.
    ///
    /// # Panics
    ///
    /// Panics if a drain limit is configured and this write sets off more
    /// reactions than it allows. Use [`try_set`](Self::try_set) to get the
    /// error instead.
    pub fn set(&mut self, key: impl Into<K>, value: V) -> &mut Self {
        if let Err(err) = self.try_set(key, value) {
            panic!("{err}");
        }
        self
    }

    /// Like [`set`](Self::set), but reports an exceeded drain limit.
    ///
    /// The value is written either way. On error the pending queue has been
    /// discarded and the store is idle again.
    pub fn try_set(&mut self, key: impl Into<K>, value: V) -> Result<&mut Self, StoreError> {
        let entry = self.entries.entry(key.into()).or_default();
        entry.value = Some(value);
        self.scheduler.enqueue_all(entry.dependents());

        if !self.context.is_active() {
            self.drain()?;
        }
        Ok(self)
    }

    /// Write `key` with a value computed from its current one.
    ///
    /// The current value is read untracked.
    ///
    /// # Panics
    ///
    /// Same as [`set`](Self::set).
    pub fn update<F>(&mut self, key: impl Into<K>, f: F) -> &mut Self
    where
        F: FnOnce(Option<&V>) -> V,
    {
        let key = key.into();
        let value = f(self.entries.get(&key).and_then(|entry| entry.value.as_ref()));
        self.set(key, value)
    }

    /// Register `reaction`, run it now, and re-run it whenever a key it read
    /// is written.
    ///
    /// Dependencies are only ever added. Each run may subscribe the reaction
    /// to more keys; no run ever unsubscribes it.
    ///
    /// Registering from inside another reaction runs the new reaction
    /// immediately and then hands the active slot back to the outer one.
    ///
    /// # Panics
    ///
    /// Panics if a drain limit is configured and is exceeded. Use
    /// [`try_autorun`](Self::try_autorun) to get the error instead.
    pub fn autorun<F>(&mut self, reaction: F) -> ReactionId
    where
        F: FnMut(&mut Self) + Send + 'static,
    {
        match self.try_autorun(reaction) {
            Ok(id) => id,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`autorun`](Self::autorun), but reports an exceeded drain limit.
    ///
    /// The reaction stays registered even when an error is returned.
    pub fn try_autorun<F>(&mut self, reaction: F) -> Result<ReactionId, StoreError>
    where
        F: FnMut(&mut Self) + Send + 'static,
    {
        let id = self.reactions.insert(Box::new(reaction));
        debug!(reaction = %id, nested = self.context.is_active(), "registered reaction");

        self.run_reaction(id);

        if !self.context.is_active() {
            self.drain()?;
        }
        Ok(id)
    }

    /// Run a single reaction with it marked active.
    fn run_reaction(&mut self, id: ReactionId) {
        let Some(mut reaction) = self.reactions.take(id) else {
            warn!(reaction = %id, "reaction is already running, skipping");
            return;
        };

        let previous = self.context.enter(id);
        trace!(reaction = %id, "running reaction");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| reaction(self)));

        self.context.exit(id, previous);
        self.reactions.restore(id, reaction);

        if let Err(payload) = outcome {
            // Leave the store idle and usable before unwinding further
            self.scheduler.clear();
            panic::resume_unwind(payload);
        }
    }

    /// Execute queued reactions until the queue is empty.
    fn drain(&mut self) -> Result<(), StoreError> {
        if self.scheduler.is_empty() {
            return Ok(());
        }

        debug!(pending = self.scheduler.pending_len(), "drain started");
        self.scheduler.start_drain();

        loop {
            match self.scheduler.next_reaction() {
                Ok(Some(id)) => self.run_reaction(id),
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "drain aborted");
                    return Err(err);
                }
            }
        }

        debug!(executed = self.scheduler.executed(), "drain finished");
        Ok(())
    }

    /// Check whether `key` has an entry, i.e. was written or read by a
    /// reaction.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of keys with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys with an entry, in the order they were first touched.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Reactions subscribed to `key`, in the order they subscribed. This is
    /// also the order they are enqueued in when `key` is written.
    pub fn dependents<Q>(&self, key: &Q) -> Vec<ReactionId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .map(|entry| entry.dependents().collect())
            .unwrap_or_default()
    }

    pub fn dependent_count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .map_or(0, |entry| entry.dependent_count())
    }

    /// Number of reactions waiting in the pending queue.
    pub fn pending_len(&self) -> usize {
        self.scheduler.pending_len()
    }

    pub fn state(&self) -> EngineState {
        if self.context.is_active() {
            EngineState::Running
        } else if self.scheduler.is_draining() {
            EngineState::Draining
        } else {
            EngineState::Idle
        }
    }

    /// The reaction currently running, if any.
    pub fn active_reaction(&self) -> Option<ReactionId> {
        self.context.current()
    }

    /// Number of reactions ever registered.
    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Number of times a reaction has run, including its first run.
    pub fn run_count(&self, id: ReactionId) -> Option<usize> {
        self.reactions.run_count(id)
    }
}

impl<K, V> Default for ReactiveStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ReactiveStore<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("entries", &self.entries)
            .field("reaction_count", &self.reaction_count())
            .field("pending", &self.pending_len())
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    type Store = ReactiveStore<String, i32>;

    #[test]
    fn unknown_key_reads_absent() {
        let mut store = Store::new();
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.get_untracked("missing"), None);
        // Untracked reads never create entries
        assert!(!store.contains_key("missing"));
        assert!(store.is_empty());
    }

    #[test]
    fn set_then_get_and_chain() {
        let mut store = Store::new();
        store.set("a", 1).set("b", 2).set("a", 3);
        assert_eq!(store.get("a"), Some(3));
        assert_eq!(store.get("b"), Some(2));
        assert_eq!(store.keys().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn autorun_runs_once_immediately() {
        let runs = Arc::new(AtomicI32::new(0));
        let runs_clone = runs.clone();

        let mut store = Store::new();
        let id = store.autorun(move |_| {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(store.run_count(id), Some(1));
        assert_eq!(store.reaction_count(), 1);
    }

    #[test]
    fn tracked_read_creates_entry_and_subscribes() {
        let mut store = Store::new();
        let id = store.autorun(|s| {
            s.get("later");
        });

        assert!(store.contains_key("later"));
        assert_eq!(store.get_untracked("later"), None);
        assert_eq!(store.dependents("later"), vec![id]);
    }

    #[test]
    fn reading_twice_subscribes_once() {
        let mut store = Store::new();
        let id = store.autorun(|s| {
            s.get("x");
            s.get("x");
        });
        store.set("x", 1);
        assert_eq!(store.dependent_count("x"), 1);
        // Initial run plus exactly one re-run
        assert_eq!(store.run_count(id), Some(2));
    }

    #[test]
    fn dependents_enqueue_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = Store::new();

        for name in ["first", "second", "third"] {
            let log = log.clone();
            store.autorun(move |s| {
                s.get("x");
                log.lock().push(name);
            });
        }
        log.lock().clear();

        store.set("x", 1);
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn writes_inside_reaction_are_deferred() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = Store::new();

        let log_b = log.clone();
        store.autorun(move |s| {
            let b = s.get("b");
            log_b.lock().push(format!("watch b={b:?}"));
        });

        let log_writer = log.clone();
        store.autorun(move |s| {
            let a = s.get("a").unwrap_or(0);
            s.set("b", a * 10);
            // The watcher of "b" has not run yet
            assert_eq!(s.pending_len(), 1);
            log_writer.lock().push(format!("writer a={a}"));
        });

        assert_eq!(
            *log.lock(),
            vec!["watch b=None", "writer a=0", "watch b=Some(0)"]
        );
    }

    #[test]
    fn state_reflects_running_reaction() {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();

        let mut store = Store::new();
        assert_eq!(store.state(), EngineState::Idle);

        let id = store.autorun(move |s| {
            *seen_clone.lock() = Some((s.state(), s.active_reaction()));
        });

        assert_eq!(*seen.lock(), Some((EngineState::Running, Some(id))));
        assert_eq!(store.state(), EngineState::Idle);
        assert_eq!(store.active_reaction(), None);
    }

    #[test]
    fn nested_autorun_restores_outer_reaction() {
        let mut store = Store::new();
        let inner_id = Arc::new(Mutex::new(None));
        let inner_clone = inner_id.clone();

        let outer = store.autorun(move |s| {
            if inner_clone.lock().is_none() {
                let id = s.autorun(|s| {
                    s.get("inner");
                });
                *inner_clone.lock() = Some(id);
            }
            // Still tracked as the outer reaction
            s.get("outer");
        });

        let inner = inner_id.lock().unwrap();
        assert_eq!(store.dependents("outer"), vec![outer]);
        assert_eq!(store.dependents("inner"), vec![inner]);
    }

    #[test]
    fn update_reads_current_value() {
        let mut store = Store::new();
        store.update("n", |v| v.copied().unwrap_or(0) + 1);
        store.update("n", |v| v.copied().unwrap_or(0) + 1);
        assert_eq!(store.get("n"), Some(2));
    }

    #[test]
    fn drain_limit_reports_cycle() {
        let mut store = Store::with_config(StoreConfig::new().with_drain_limit(10));
        let result = store.try_autorun(|s| {
            let n = s.get("n").unwrap_or(0);
            s.set("n", n + 1);
        });

        assert_eq!(
            result.unwrap_err(),
            StoreError::DrainLimitExceeded { limit: 10, pending: 1 }
        );
        // Initial run plus ten drained runs
        assert_eq!(store.get("n"), Some(11));
        assert_eq!(store.pending_len(), 0);
        assert_eq!(store.state(), EngineState::Idle);
    }

    #[test]
    #[should_panic(expected = "drain limit of 3 reactions exceeded")]
    fn set_panics_when_limit_exceeded() {
        let mut store = Store::with_config(StoreConfig::new().with_drain_limit(3));
        let _ = store.try_autorun(|s| {
            let n = s.get("n").unwrap_or(0);
            s.set("n", n + 1);
        });
        store.set("n", 0);
    }

    #[test]
    fn panicking_reaction_leaves_store_usable() {
        let mut store = Store::new();
        store.autorun(|s| {
            if s.get("boom") == Some(1) {
                panic!("boom");
            }
        });

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            store.set("boom", 1);
        }));
        assert!(result.is_err());

        assert_eq!(store.state(), EngineState::Idle);
        assert_eq!(store.pending_len(), 0);
        store.set("boom", 2);
        assert_eq!(store.get("boom"), Some(2));
    }
}
