//! Update Scheduler
//!
//! The scheduler holds the pending-reaction queue and decides what runs next.
//!
//! # Algorithm
//!
//! There is no topological sort: propagation order is simply the order in
//! which writes happen.
//!
//! 1. A write appends every dependent of the written key to the back of the
//!    queue, in subscription order. Duplicates are kept; a reaction enqueued
//!    by two writes runs twice.
//! 2. When a top-level call finishes its own work, the store drains the queue:
//!    pop the front, run it, repeat until empty.
//! 3. Writes made by a running reaction land at the back of the same queue, so
//!    they are picked up by the same drain cycle.
//!
//! The drain is a loop, not recursion, so a long dependency chain costs queue
//! slots rather than stack frames. A reaction that re-triggers itself keeps
//! the loop going forever unless a drain limit is configured.

use std::collections::VecDeque;

use crate::error::StoreError;
use crate::reactive::ReactionId;

/// What the engine is doing at the moment it is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No reaction is active and no drain is in progress.
    Idle,

    /// A reaction is executing.
    Running,

    /// Between two queued reactions of a drain cycle.
    Draining,
}

/// The pending queue plus per-cycle bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct UpdateScheduler {
    queue: VecDeque<ReactionId>,
    draining: bool,
    /// Reactions executed by the current (or last) drain cycle.
    executed: usize,
    limit: Option<usize>,
}

impl UpdateScheduler {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Append reactions to the back of the queue.
    pub(crate) fn enqueue_all(&mut self, reactions: impl IntoIterator<Item = ReactionId>) {
        self.queue.extend(reactions);
    }

    /// Begin a drain cycle.
    pub(crate) fn start_drain(&mut self) {
        self.draining = true;
        self.executed = 0;
    }

    /// Pop the next reaction to execute.
    ///
    /// Returns `Ok(None)` and ends the cycle once the queue is empty. If the
    /// drain limit would be exceeded, the queue is discarded and the cycle
    /// ends with an error.
    pub(crate) fn next_reaction(&mut self) -> Result<Option<ReactionId>, StoreError> {
        if self.queue.is_empty() {
            self.draining = false;
            return Ok(None);
        }

        if let Some(limit) = self.limit {
            if self.executed >= limit {
                let pending = self.queue.len();
                self.clear();
                return Err(StoreError::DrainLimitExceeded { limit, pending });
            }
        }

        self.executed += 1;
        Ok(self.queue.pop_front())
    }

    /// Drop everything pending and end any drain cycle.
    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.draining = false;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_draining(&self) -> bool {
        self.draining
    }

    pub(crate) fn executed(&self) -> usize {
        self.executed
    }

    pub(crate) fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }
}
