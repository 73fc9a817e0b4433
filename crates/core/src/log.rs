// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::operation::PendingOperation;
use crewsync_domain::{Identifier, RealId, TempId};
use std::collections::VecDeque;

/// Ordered queue of operations awaiting a flush.
///
/// Operations are appended in causal order. Later edits may prune earlier
/// entries; a failed flush puts its unattempted entries back at the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationLog {
    entries: VecDeque<PendingOperation>,
}

impl OperationLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Appends an operation.
    pub fn enqueue(&mut self, op: PendingOperation) {
        self.entries.push_back(op);
    }

    /// Removes every operation matching `predicate` and returns them in order.
    pub fn prune<F>(&mut self, mut predicate: F) -> Vec<PendingOperation>
    where
        F: FnMut(&PendingOperation) -> bool,
    {
        let mut removed: Vec<PendingOperation> = Vec::new();
        let mut kept: VecDeque<PendingOperation> = VecDeque::with_capacity(self.entries.len());
        for op in self.entries.drain(..) {
            if predicate(&op) {
                removed.push(op);
            } else {
                kept.push_back(op);
            }
        }
        self.entries = kept;
        removed
    }

    /// Empties the log and returns its prior contents.
    pub fn drain(&mut self) -> Vec<PendingOperation> {
        self.entries.drain(..).collect()
    }

    /// Puts operations back at the front of the log, ahead of anything
    /// enqueued since they were drained, preserving their order.
    pub fn requeue_front(&mut self, ops: Vec<PendingOperation>) {
        for op in ops.into_iter().rev() {
            self.entries.push_front(op);
        }
    }

    /// Returns true if the log still holds the operation creating `temp`.
    #[must_use]
    pub fn has_create(&self, temp: TempId) -> bool {
        self.entries.iter().any(|op| op.creates() == Some(temp))
    }

    /// Returns true if any queued operation mentions `id`.
    #[must_use]
    pub fn references(&self, id: &Identifier) -> bool {
        self.entries.iter().any(|op| op.references(id))
    }

    /// Rewrites `temp` to `real` in every queued operation.
    ///
    /// Returns the number of identifiers rewritten.
    pub fn reconcile(&mut self, temp: TempId, real: RealId) -> usize {
        self.entries
            .iter_mut()
            .map(|op| op.reconcile(temp, real))
            .sum()
    }

    /// Returns the queued operations in order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingOperation> {
        self.entries.iter()
    }

    /// Returns the number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
