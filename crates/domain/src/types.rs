// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::binding_status::BindingStatus;
use crate::error::DomainError;
use crate::ids::{ActorId, BindingId, Identifier, RealId, SlotId, SubjectId, TempId};
use serde::{Deserialize, Serialize};
use time::Date;

/// A role category such as "audio" or "lighting".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleType(String);

impl RoleType {
    /// Creates a new role type.
    ///
    /// Role types are case-insensitive; the stored form is lowercase.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_lowercase())
    }

    /// Returns the role type string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Associates one technician with one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// The binding identifier.
    pub id: BindingId,
    /// The bound technician.
    pub actor: ActorId,
    /// The technician's response.
    pub status: BindingStatus,
    /// First day the binding applies, if bounded.
    pub effective_from: Option<Date>,
    /// Last day the binding applies, if bounded.
    pub effective_until: Option<Date>,
}

impl Binding {
    /// Creates an unbounded, pending binding.
    #[must_use]
    pub const fn new(id: BindingId, actor: ActorId) -> Self {
        Self {
            id,
            actor,
            status: BindingStatus::Pending,
            effective_from: None,
            effective_until: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: BindingStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the effective-date bounds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateBounds` if `from` is after `until`.
    pub fn with_bounds(
        mut self,
        effective_from: Option<Date>,
        effective_until: Option<Date>,
    ) -> Result<Self, DomainError> {
        crate::validation::validate_date_bounds(effective_from, effective_until)?;
        self.effective_from = effective_from;
        self.effective_until = effective_until;
        Ok(self)
    }

    /// Returns true if the binding applies on `date`.
    #[must_use]
    pub fn is_effective_on(&self, date: Date) -> bool {
        self.effective_from.is_none_or(|from| from <= date)
            && self.effective_until.is_none_or(|until| date <= until)
    }
}

/// A typed role bucket belonging to exactly one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// The slot identifier.
    pub id: SlotId,
    /// The owning subject.
    pub subject: SubjectId,
    /// Human-readable role label, e.g. "A1".
    pub role_label: String,
    /// Role category.
    pub role_type: RoleType,
    /// Technicians bound to this slot, in assignment order.
    pub bindings: Vec<Binding>,
}

impl Slot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new(
        id: SlotId,
        subject: SubjectId,
        role_label: String,
        role_type: RoleType,
    ) -> Self {
        Self {
            id,
            subject,
            role_label,
            role_type,
            bindings: Vec::new(),
        }
    }

    /// Finds a binding by identifier.
    #[must_use]
    pub fn binding(&self, id: &BindingId) -> Option<&Binding> {
        self.bindings.iter().find(|b| &b.id == id)
    }

    /// Returns true if `actor` is bound to this slot.
    #[must_use]
    pub fn has_actor(&self, actor: ActorId) -> bool {
        self.bindings.iter().any(|b| b.actor == actor)
    }

    /// Rewrites `temp` to `real` in the slot and its bindings.
    ///
    /// Returns the number of identifiers rewritten.
    pub fn reconcile(&mut self, temp: TempId, real: RealId) -> usize {
        let mut rewritten: usize = usize::from(self.id.reconcile(temp, real));
        for binding in &mut self.bindings {
            rewritten += usize::from(binding.id.reconcile(temp, real));
        }
        rewritten
    }

    /// Returns every identifier held by the slot, slot first.
    pub fn identifiers(&self) -> impl Iterator<Item = Identifier> + '_ {
        std::iter::once(self.id).chain(self.bindings.iter().map(|b| b.id))
    }
}

/// A container entity, e.g. a booked event, owning an ordered set of slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// The subject identifier.
    pub id: SubjectId,
    /// Display name.
    pub name: String,
    /// Slots in display order.
    pub slots: Vec<Slot>,
}

impl Subject {
    /// Creates a subject with no slots.
    #[must_use]
    pub const fn new(id: SubjectId, name: String) -> Self {
        Self {
            id,
            name,
            slots: Vec::new(),
        }
    }

    /// Finds a slot by identifier.
    #[must_use]
    pub fn slot(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| &s.id == id)
    }

    /// Returns the slots of a given role type.
    pub fn slots_of_role<'a>(&'a self, role_type: &'a RoleType) -> impl Iterator<Item = &'a Slot> {
        self.slots.iter().filter(move |s| &s.role_type == role_type)
    }

    /// Returns the number of bindings across all slots.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.slots.iter().map(|s| s.bindings.len()).sum()
    }
}
