//! Shared Store
//!
//! [`ReactiveStore`] is single-threaded by construction: every operation takes
//! `&mut self`. `SharedStore` lets several threads use one store by
//! serializing every top-level call behind one exclusive lock.
//!
//! # Thread Safety
//!
//! The lock is held for the whole call, including the drain it triggers, so
//! there is never more than one active reaction. Reactions receive the
//! already-locked `&mut ReactiveStore` and must use that. Calling back into
//! the `SharedStore` handle from inside a reaction deadlocks.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::reactive::{ReactionId, ReactiveStore};

/// A cloneable, thread-safe handle to a [`ReactiveStore`].
///
/// Clones share the same store.
pub struct SharedStore<K, V> {
    inner: Arc<Mutex<ReactiveStore<K, V>>>,
}

impl<K, V> SharedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::from_store(ReactiveStore::new())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::from_store(ReactiveStore::with_config(config))
    }

    /// Wrap an existing store.
    pub fn from_store(store: ReactiveStore<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Read a value. Outside a reaction this never subscribes anything.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.inner.lock().get(key)
    }

    pub fn get_untracked<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get_untracked(key)
    }

    /// Write a value and drain, see [`ReactiveStore::set`].
    ///
    /// # Panics
    ///
    /// Panics if a configured drain limit is exceeded.
    pub fn set(&self, key: impl Into<K>, value: V) -> &Self {
        self.inner.lock().set(key, value);
        self
    }

    pub fn try_set(&self, key: impl Into<K>, value: V) -> Result<&Self, StoreError> {
        self.inner.lock().try_set(key, value)?;
        Ok(self)
    }

    /// Register a reaction, see [`ReactiveStore::autorun`].
    ///
    /// # Panics
    ///
    /// Panics if a configured drain limit is exceeded.
    pub fn autorun<F>(&self, reaction: F) -> ReactionId
    where
        F: FnMut(&mut ReactiveStore<K, V>) + Send + 'static,
    {
        self.inner.lock().autorun(reaction)
    }

    pub fn try_autorun<F>(&self, reaction: F) -> Result<ReactionId, StoreError>
    where
        F: FnMut(&mut ReactiveStore<K, V>) + Send + 'static,
    {
        self.inner.lock().try_autorun(reaction)
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// Use this to make a read-modify-write atomic with respect to other
    /// threads.
    pub fn with<R>(&self, f: impl FnOnce(&mut ReactiveStore<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> Clone for SharedStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for SharedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<ReactiveStore<K, V>> for SharedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn from(store: ReactiveStore<K, V>) -> Self {
        Self::from_store(store)
    }
}

impl<K, V> fmt::Debug for SharedStore<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(store) => f.debug_tuple("SharedStore").field(&*store).finish(),
            None => f.write_str("SharedStore(<locked>)"),
        }
    }
}
