// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Temp identifier minting and reconciliation.

use crate::error::CoreError;
use crate::log::OperationLog;
use crate::state::MirrorStore;
use crewsync_domain::{Identifier, RealId, TempId};
use std::collections::HashMap;

/// What a reconciliation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Identifiers rewritten in the mirror.
    pub store_rewrites: usize,
    /// Identifiers rewritten in queued operations.
    pub log_rewrites: usize,
    /// Queued operations dropped because their entity no longer exists locally.
    pub dropped: usize,
}

/// Mints temp identifiers and remaps them once the remote store assigns
/// real ones.
///
/// Temp identifiers come from a per-session counter, so two mints in one
/// session never collide.
///
/// Every reconciled pair is kept for the life of the session, one entry per
/// entity created. The map is what makes a repeated `reconcile` a no-op and
/// lets [`TempIdResolver::current`] translate a stale temp identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempIdResolver {
    next: u64,
    /// Grows by one per reconciled entity; never pruned.
    resolved: HashMap<TempId, RealId>,
}

impl TempIdResolver {
    /// Creates a resolver whose first temp identifier is `tmp:1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh temp identifier.
    pub const fn mint(&mut self) -> TempId {
        self.next += 1;
        TempId::from_sequence(self.next)
    }

    /// Returns the real identifier `temp` was reconciled to, if any.
    #[must_use]
    pub fn resolve(&self, temp: TempId) -> Option<RealId> {
        self.resolved.get(&temp).copied()
    }

    /// Returns `id` with a reconciled temp replaced by its real identifier.
    #[must_use]
    pub fn current(&self, id: Identifier) -> Identifier {
        match id {
            Identifier::Temp(temp) => self.resolve(temp).map_or(id, Identifier::Real),
            Identifier::Real(_) => id,
        }
    }

    /// Replaces every occurrence of `temp` with `real` in the mirror and the log.
    ///
    /// If the entity `temp` named has already been removed from the mirror,
    /// queued operations that still mention it are dropped, except deletes:
    /// those are rewritten so the now-persisted entity is removed remotely.
    ///
    /// Calling this again with the same pair changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConflictingReconciliation` if `temp` was already
    /// reconciled to a different real identifier.
    pub fn reconcile(
        &mut self,
        store: &mut MirrorStore,
        log: &mut OperationLog,
        temp: TempId,
        real: RealId,
    ) -> Result<Reconciled, CoreError> {
        if let Some(existing) = self.resolve(temp) {
            if existing != real {
                return Err(CoreError::ConflictingReconciliation {
                    temp,
                    existing,
                    requested: real,
                });
            }
            return Ok(Reconciled::default());
        }
        self.resolved.insert(temp, real);

        let id: Identifier = Identifier::Temp(temp);
        let dropped: usize = if store.contains(&id) {
            0
        } else {
            log.prune(|op| op.references(&id) && !op.is_delete()).len()
        };

        Ok(Reconciled {
            store_rewrites: store.reconcile(temp, real),
            log_rewrites: log.reconcile(temp, real),
            dropped,
        })
    }
}
