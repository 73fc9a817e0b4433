// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::ids::ActorId;
use crate::types::{RoleType, Slot};
use time::Date;

/// Maximum length of a role label.
pub const MAX_ROLE_LABEL_LEN: usize = 64;

/// Validates a slot's role label and type before the slot is created.
///
/// # Arguments
///
/// * `role_label` - The human-readable label
/// * `role_type` - The role category
///
/// # Errors
///
/// Returns an error if:
/// - The label is empty or only whitespace
/// - The label is longer than [`MAX_ROLE_LABEL_LEN`]
/// - The role type is empty
pub fn validate_slot_fields(role_label: &str, role_type: &RoleType) -> Result<(), DomainError> {
    // Rule: label must not be blank
    if role_label.trim().is_empty() {
        return Err(DomainError::InvalidRoleLabel(String::from(
            "Role label cannot be empty",
        )));
    }

    if role_label.chars().count() > MAX_ROLE_LABEL_LEN {
        return Err(DomainError::InvalidRoleLabel(format!(
            "Role label must be at most {MAX_ROLE_LABEL_LEN} characters"
        )));
    }

    if role_type.as_str().is_empty() {
        return Err(DomainError::InvalidRoleType(String::from(
            "Role type cannot be empty",
        )));
    }

    Ok(())
}

/// Validates that an actor is not already bound to a slot.
///
/// # Errors
///
/// Returns `DomainError::DuplicateBinding` if the actor is already bound.
pub fn validate_actor_unbound(slot: &Slot, actor: ActorId) -> Result<(), DomainError> {
    if slot.has_actor(actor) {
        return Err(DomainError::DuplicateBinding {
            slot: slot.id,
            actor,
        });
    }
    Ok(())
}

/// Validates that effective-date bounds are not inverted.
///
/// Open-ended bounds are always valid.
///
/// # Errors
///
/// Returns `DomainError::InvalidDateBounds` if `from` is after `until`.
pub fn validate_date_bounds(from: Option<Date>, until: Option<Date>) -> Result<(), DomainError> {
    if let (Some(from), Some(until)) = (from, until)
        && from > until
    {
        return Err(DomainError::InvalidDateBounds { from, until });
    }
    Ok(())
}
