// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ids::{ActorId, BindingId, SlotId, SubjectId};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Role label is empty or invalid.
    InvalidRoleLabel(String),
    /// Role type is empty or invalid.
    InvalidRoleType(String),
    /// Binding status string is not recognised.
    InvalidBindingStatus {
        /// The rejected status string.
        status: String,
    },
    /// Effective-date bounds are inverted.
    InvalidDateBounds {
        /// The start of the effective range.
        from: time::Date,
        /// The end of the effective range.
        until: time::Date,
    },
    /// Subject is not loaded in this session.
    SubjectNotFound(SubjectId),
    /// Subject was loaded twice.
    DuplicateSubject(SubjectId),
    /// Slot does not exist.
    SlotNotFound(SlotId),
    /// The subject has no slots of the role type.
    RoleNotFound {
        /// The subject.
        subject: SubjectId,
        /// The role type.
        role_type: String,
    },
    /// Binding does not exist.
    BindingNotFound(BindingId),
    /// The actor is already bound to the slot.
    DuplicateBinding {
        /// The slot.
        slot: SlotId,
        /// The actor already bound.
        actor: ActorId,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoleLabel(msg) => write!(f, "Invalid role label: {msg}"),
            Self::InvalidRoleType(msg) => write!(f, "Invalid role type: {msg}"),
            Self::InvalidBindingStatus { status } => {
                write!(f, "Invalid binding status: '{status}'")
            }
            Self::InvalidDateBounds { from, until } => {
                write!(f, "Invalid effective dates: {from} is after {until}")
            }
            Self::SubjectNotFound(id) => write!(f, "Subject {id} not found"),
            Self::DuplicateSubject(id) => write!(f, "Subject {id} is already loaded"),
            Self::SlotNotFound(id) => write!(f, "Slot {id} not found"),
            Self::RoleNotFound { subject, role_type } => {
                write!(f, "Subject {subject} has no '{role_type}' slots")
            }
            Self::BindingNotFound(id) => write!(f, "Binding {id} not found"),
            Self::DuplicateBinding { slot, actor } => {
                write!(f, "Actor {actor} is already bound to slot {slot}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
