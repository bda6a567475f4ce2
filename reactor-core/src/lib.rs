//! Reactor Core
//!
//! This crate provides a minimal reactive key/value store. Reactions that
//! read keys are re-run automatically whenever those keys are written.
//! It implements:
//!
//! - A key/value store with per-key subscriber sets
//! - Automatic dependency tracking through an active-reaction slot
//! - FIFO propagation that drains every affected reaction before returning
//! - An optional drain limit for guarding against dependency cycles
//!
//! It targets small in-process state synchronization problems (derived
//! fields, live rendering) where a full reactive framework is overkill.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: the store itself, reaction handles and the tracking context
//! - `graph`: per-key entries (the dependency edges) and the update scheduler
//! - `shared`: a thread-safe handle that serializes access to one store
//! - `config` / `error`: the drain limit and the error it produces
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use reactor_core::ReactiveStore;
//!
//! let rendered = Arc::new(Mutex::new(Vec::new()));
//! let mut store = ReactiveStore::<String, String>::new();
//! store.set("location", "texas".to_string());
//!
//! // Runs once now, and again whenever "location" changes
//! let sink = rendered.clone();
//! store.autorun(move |s| {
//!     let location = s.get("location").unwrap_or_default();
//!     sink.lock().push(format!("location is set to {location}"));
//! });
//!
//! store.set("location", "california".to_string());
//! assert_eq!(
//!     *rendered.lock(),
//!     vec!["location is set to texas", "location is set to california"]
//! );
//! ```
//!
//! # Dependency cycles
//!
//! A reaction that writes a key it reads re-triggers itself indefinitely.
//! Nothing breaks such cycles by default. Configure
//! [`StoreConfig::with_drain_limit`] and use the `try_*` operations to turn
//! one into a [`StoreError`].

pub mod config;
pub mod error;
pub mod graph;
pub mod reactive;
pub mod shared;

pub use config::StoreConfig;
pub use error::StoreError;
pub use graph::EngineState;
pub use reactive::{ReactionId, ReactiveStore};
pub use shared::SharedStore;
