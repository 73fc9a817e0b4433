// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewsync_domain::{ActorId, BindingId, BindingStatus, RoleType, SlotId, SubjectId};

/// A local edit represents user intent as data only.
///
/// Edits are the only way to change the buffered mirror in batched mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Add a slot to a subject.
    AddSlot {
        /// The owning subject.
        subject: SubjectId,
        /// The slot's display label.
        role_label: String,
        /// The slot's role category.
        role_type: RoleType,
    },
    /// Remove one slot and every binding in it.
    RemoveSlot {
        /// The slot to remove.
        slot: SlotId,
    },
    /// Remove every slot of a role type from a subject (unchecking a role).
    RemoveRole {
        /// The subject.
        subject: SubjectId,
        /// The role category to clear.
        role_type: RoleType,
    },
    /// Bind a technician to a slot.
    AddBinding {
        /// The slot.
        slot: SlotId,
        /// The technician.
        actor: ActorId,
    },
    /// Remove a binding.
    RemoveBinding {
        /// The binding to remove.
        binding: BindingId,
    },
    /// Change a binding's status.
    SetBindingStatus {
        /// The binding.
        binding: BindingId,
        /// The new status.
        status: BindingStatus,
    },
}

impl Edit {
    /// Returns the edit name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddSlot { .. } => "AddSlot",
            Self::RemoveSlot { .. } => "RemoveSlot",
            Self::RemoveRole { .. } => "RemoveRole",
            Self::AddBinding { .. } => "AddBinding",
            Self::RemoveBinding { .. } => "RemoveBinding",
            Self::SetBindingStatus { .. } => "SetBindingStatus",
        }
    }
}
