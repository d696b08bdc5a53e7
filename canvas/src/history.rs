//! Snapshot-based undo/redo ledger.
//!
//! The ledger holds at most [`HISTORY_CAPACITY`] snapshots and a cursor that
//! marks the displayed one. Recording after an undo discards the redo branch.
//!
//! Every state-producing call answers with a [`Transition`] tagged by its
//! [`Origin`]. Hosts feed transitions back through [`HistoryLedger::observe`],
//! which records edits and ignores replays, so an undo can never be
//! re-recorded as if it were a fresh edit.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;
use std::sync::Arc;

use crate::consts::HISTORY_CAPACITY;
use crate::doc::GraphSnapshot;

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Produced by a mutation; must be recorded.
    Edit,
    /// Produced by undo or redo; already in the ledger.
    Replay,
}

/// A new displayed state plus its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub snapshot: Arc<GraphSnapshot>,
    pub origin: Origin,
}

impl Transition {
    #[must_use]
    pub fn edit(snapshot: GraphSnapshot) -> Self {
        Self { snapshot: Arc::new(snapshot), origin: Origin::Edit }
    }

    #[must_use]
    pub fn replay(snapshot: Arc<GraphSnapshot>) -> Self {
        Self { snapshot, origin: Origin::Replay }
    }
}

/// Bounded history of snapshots with a cursor.
///
/// Invariant: the ledger is never empty and `cursor < len`.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    snapshots: VecDeque<Arc<GraphSnapshot>>,
    cursor: usize,
    capacity: usize,
}

impl HistoryLedger {
    /// Ledger seeded with a single snapshot.
    #[must_use]
    pub fn new(seed: GraphSnapshot) -> Self {
        Self::with_capacity(seed, HISTORY_CAPACITY)
    }

    /// Ledger with a custom bound. A capacity of zero is treated as one.
    #[must_use]
    pub fn with_capacity(seed: GraphSnapshot, capacity: usize) -> Self {
        let mut snapshots = VecDeque::with_capacity(capacity.max(1));
        snapshots.push_back(Arc::new(seed));
        Self { snapshots, cursor: 0, capacity: capacity.max(1) }
    }

    /// Replace the whole ledger with one seed snapshot.
    pub fn reset(&mut self, seed: GraphSnapshot) {
        self.snapshots.clear();
        self.snapshots.push_back(Arc::new(seed));
        self.cursor = 0;
    }

    /// Record an edit transition; replays are ignored.
    ///
    /// Returns `true` when the snapshot was recorded.
    pub fn observe(&mut self, transition: &Transition) -> bool {
        match transition.origin {
            Origin::Edit => {
                self.push(Arc::clone(&transition.snapshot));
                true
            }
            Origin::Replay => false,
        }
    }

    /// Record a snapshot as the new displayed state.
    pub fn record(&mut self, snapshot: GraphSnapshot) {
        self.push(Arc::new(snapshot));
    }

    fn push(&mut self, snapshot: Arc<GraphSnapshot>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Transition> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(Transition::replay(self.current_arc()))
    }

    /// Step forward one snapshot. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Transition> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(Transition::replay(self.current_arc()))
    }

    /// The displayed snapshot.
    #[must_use]
    pub fn current(&self) -> &GraphSnapshot {
        &self.snapshots[self.cursor]
    }

    /// Shared handle to the displayed snapshot.
    #[must_use]
    pub fn current_arc(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&self.snapshots[self.cursor])
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of retained snapshots (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
