//! Dependency Graph
//!
//! This module holds the implicit dependency graph and the machinery that
//! walks it when a key changes.
//!
//! # Overview
//!
//! The graph is bipartite and never built explicitly:
//!
//! - Keys are nodes. Each key's [`Entry`] carries its outgoing edges, the set
//!   of reactions that read it while active.
//! - Reactions are the other side. They have no stored inputs; a reaction is
//!   reachable from a key only through that key's dependent set.
//!
//! Edges are only ever added. A reaction that stops reading a key keeps its
//! subscription, so a later write still re-runs it.
//!
//! Cycles are allowed to exist. Nothing here detects them; the scheduler can
//! optionally cap how much work one drain cycle may do.

mod entry;
mod scheduler;

pub(crate) use entry::Entry;
pub use scheduler::EngineState;
pub(crate) use scheduler::UpdateScheduler;
