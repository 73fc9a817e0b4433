// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewsync_domain::{
    ActorId, BindingId, BindingStatus, Identifier, RealId, RoleType, SlotId, SubjectId, TempId,
};

/// A queued mutation that has not been sent to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOperation {
    /// Create a slot that currently exists only under a temp identifier.
    CreateSlot {
        /// The owning subject.
        subject: SubjectId,
        /// The slot's temp identifier, reconciled once the create succeeds.
        slot: TempId,
        /// The slot's display label.
        role_label: String,
        /// The slot's role category.
        role_type: RoleType,
    },
    /// Delete one or more slots.
    ///
    /// Temp identifiers left in the list when the operation is flushed are
    /// skipped; nothing exists server-side for them.
    DeleteSlot {
        /// The slots to delete.
        slots: Vec<SlotId>,
    },
    /// Create a binding that currently exists only under a temp identifier.
    CreateBinding {
        /// The binding's temp identifier.
        binding: TempId,
        /// The parent slot; may still be temp when queued.
        slot: SlotId,
        /// The bound technician.
        actor: ActorId,
    },
    /// Delete a binding.
    DeleteBinding {
        /// The binding to delete.
        binding: BindingId,
    },
    /// Patch a binding's status.
    UpdateBindingStatus {
        /// The binding to patch.
        binding: BindingId,
        /// The new status.
        status: BindingStatus,
    },
}

impl PendingOperation {
    /// Returns the operation name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateSlot { .. } => "CreateSlot",
            Self::DeleteSlot { .. } => "DeleteSlot",
            Self::CreateBinding { .. } => "CreateBinding",
            Self::DeleteBinding { .. } => "DeleteBinding",
            Self::UpdateBindingStatus { .. } => "UpdateBindingStatus",
        }
    }

    /// Returns the temp identifier this operation creates, if any.
    #[must_use]
    pub const fn creates(&self) -> Option<TempId> {
        match self {
            Self::CreateSlot { slot, .. } => Some(*slot),
            Self::CreateBinding { binding, .. } => Some(*binding),
            Self::DeleteSlot { .. }
            | Self::DeleteBinding { .. }
            | Self::UpdateBindingStatus { .. } => None,
        }
    }

    /// Returns true for operations that delete remote entities.
    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self, Self::DeleteSlot { .. } | Self::DeleteBinding { .. })
    }

    /// Returns true if the operation mentions `id` anywhere, including as the
    /// entity it creates.
    #[must_use]
    pub fn references(&self, id: &Identifier) -> bool {
        if let Some(temp) = self.creates()
            && *id == Identifier::Temp(temp)
        {
            return true;
        }
        match self {
            Self::CreateSlot { .. } => false,
            Self::DeleteSlot { slots } => slots.contains(id),
            Self::CreateBinding { slot, .. } => slot == id,
            Self::DeleteBinding { binding } | Self::UpdateBindingStatus { binding, .. } => {
                binding == id
            }
        }
    }

    /// Returns the temp identifiers this operation depends on, excluding
    /// the one it creates.
    #[must_use]
    pub fn temp_dependencies(&self) -> Vec<TempId> {
        match self {
            Self::CreateSlot { .. } => Vec::new(),
            Self::DeleteSlot { slots } => slots.iter().filter_map(Identifier::as_temp).collect(),
            Self::CreateBinding { slot, .. } => slot.as_temp().into_iter().collect(),
            Self::DeleteBinding { binding } | Self::UpdateBindingStatus { binding, .. } => {
                binding.as_temp().into_iter().collect()
            }
        }
    }

    /// Rewrites `temp` to `real` in the operation's references.
    ///
    /// The identifier an operation creates is never rewritten: a create whose
    /// entity already has a real identifier would be sent twice.
    ///
    /// Returns the number of identifiers rewritten.
    pub fn reconcile(&mut self, temp: TempId, real: RealId) -> usize {
        match self {
            Self::CreateSlot { .. } => 0,
            Self::DeleteSlot { slots } => slots
                .iter_mut()
                .map(|id| usize::from(id.reconcile(temp, real)))
                .sum(),
            Self::CreateBinding { slot, .. } => usize::from(slot.reconcile(temp, real)),
            Self::DeleteBinding { binding } | Self::UpdateBindingStatus { binding, .. } => {
                usize::from(binding.reconcile(temp, real))
            }
        }
    }
}
