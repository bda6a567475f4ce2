//! Reactive Primitives
//!
//! This module implements the reactive store and the pieces it is built
//! from: reaction handles and the active-reaction context.
//!
//! # Concepts
//!
//! ## Keys
//!
//! A key holds a value. Reading a key while a reaction is running subscribes
//! that reaction to the key. Writing a key schedules every subscriber.
//!
//! ## Reactions
//!
//! A reaction is a side-effecting closure registered with `autorun`. It runs
//! once immediately and again each time a key it has read is written.
//! Reactions may write keys themselves, which is how derived values are kept
//! in sync.
//!
//! # Implementation Notes
//!
//! Dependencies are discovered while reactions run rather than declared up
//! front. The store keeps a single "active reaction" slot; every read checks
//! it and records an edge from the key to the reaction found there.
//!
//! This is the same transparent tracking used by observable and signal
//! libraries, reduced to one flat key space with no memoization.

mod context;
pub(crate) mod reaction;
mod store;

pub use reaction::ReactionId;
pub use store::ReactiveStore;
