// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewsync_domain::{
    Binding, BindingId, BindingStatus, DomainError, Identifier, RealId, Slot, SlotId, Subject,
    SubjectId, TempId, validate_actor_unbound,
};

/// The binding list of one slot, captured before an optimistic mutation.
///
/// Restoring the one binding an optimistic call touched gives back the
/// captured slice exactly when nothing else changed the slot meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    /// The slot the snapshot was taken from.
    pub slot: SlotId,
    /// The slot's bindings at capture time.
    pub bindings: Vec<Binding>,
}

/// In-memory mirror of the subjects being edited.
///
/// The mirror is what the editor renders. Every mutation is total: it
/// validates first and then applies completely, or returns an error and
/// leaves the mirror untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorStore {
    subjects: Vec<Subject>,
}

impl MirrorStore {
    /// Creates an empty mirror.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subjects: Vec::new(),
        }
    }

    /// Loads a subject fetched from the remote store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateSubject` if the subject is already loaded.
    pub fn load_subject(&mut self, subject: Subject) -> Result<(), DomainError> {
        if self.subject(subject.id).is_some() {
            return Err(DomainError::DuplicateSubject(subject.id));
        }
        self.subjects.push(subject);
        Ok(())
    }

    /// Returns every loaded subject in load order.
    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Finds a subject.
    #[must_use]
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Finds a slot in any subject.
    #[must_use]
    pub fn slot(&self, id: &SlotId) -> Option<&Slot> {
        self.subjects.iter().find_map(|s| s.slot(id))
    }

    /// Finds a binding and its parent slot.
    #[must_use]
    pub fn binding(&self, id: &BindingId) -> Option<(&Slot, &Binding)> {
        self.subjects
            .iter()
            .flat_map(|s| s.slots.iter())
            .find_map(|slot| slot.binding(id).map(|b| (slot, b)))
    }

    /// Returns true if any slot or binding carries `id`.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.slot(id).is_some() || self.binding(id).is_some()
    }

    /// Returns the number of slots and bindings still under temp identifiers.
    #[must_use]
    pub fn temp_count(&self) -> usize {
        self.subjects
            .iter()
            .flat_map(|s| s.slots.iter())
            .flat_map(|slot| slot.identifiers())
            .filter(Identifier::is_temp)
            .count()
    }

    fn subject_mut(&mut self, id: SubjectId) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: &SlotId) -> Option<&mut Slot> {
        self.subjects
            .iter_mut()
            .flat_map(|s| s.slots.iter_mut())
            .find(|slot| &slot.id == id)
    }

    fn binding_mut(&mut self, id: &BindingId) -> Option<&mut Binding> {
        self.subjects
            .iter_mut()
            .flat_map(|s| s.slots.iter_mut())
            .flat_map(|slot| slot.bindings.iter_mut())
            .find(|b| &b.id == id)
    }

    /// Appends a slot to its subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is not loaded.
    pub fn add_slot(&mut self, slot: Slot) -> Result<(), DomainError> {
        let subject: &mut Subject = self
            .subject_mut(slot.subject)
            .ok_or(DomainError::SubjectNotFound(slot.subject))?;
        subject.slots.push(slot);
        Ok(())
    }

    /// Removes a slot with all of its bindings and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot does not exist.
    pub fn remove_slot(&mut self, id: &SlotId) -> Result<Slot, DomainError> {
        for subject in &mut self.subjects {
            if let Some(index) = subject.slots.iter().position(|s| &s.id == id) {
                return Ok(subject.slots.remove(index));
            }
        }
        Err(DomainError::SlotNotFound(*id))
    }

    /// Appends a binding to a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The slot does not exist
    /// - The actor is already bound to the slot
    pub fn add_binding(&mut self, slot: &SlotId, binding: Binding) -> Result<(), DomainError> {
        let target: &mut Slot = self
            .slot_mut(slot)
            .ok_or(DomainError::SlotNotFound(*slot))?;
        validate_actor_unbound(target, binding.actor)?;
        target.bindings.push(binding);
        Ok(())
    }

    /// Removes a binding and returns it with its parent slot identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the binding does not exist.
    pub fn remove_binding(&mut self, id: &BindingId) -> Result<(SlotId, Binding), DomainError> {
        for slot in self.subjects.iter_mut().flat_map(|s| s.slots.iter_mut()) {
            if let Some(index) = slot.bindings.iter().position(|b| &b.id == id) {
                return Ok((slot.id, slot.bindings.remove(index)));
            }
        }
        Err(DomainError::BindingNotFound(*id))
    }

    /// Sets a binding's status and returns the previous status.
    ///
    /// # Errors
    ///
    /// Returns an error if the binding does not exist.
    pub fn set_binding_status(
        &mut self,
        id: &BindingId,
        status: BindingStatus,
    ) -> Result<BindingStatus, DomainError> {
        let binding: &mut Binding = self
            .binding_mut(id)
            .ok_or(DomainError::BindingNotFound(*id))?;
        Ok(std::mem::replace(&mut binding.status, status))
    }

    /// Captures a slot's binding list.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot does not exist.
    pub fn snapshot_slot(&self, id: &SlotId) -> Result<SlotSnapshot, DomainError> {
        let slot: &Slot = self.slot(id).ok_or(DomainError::SlotNotFound(*id))?;
        Ok(SlotSnapshot {
            slot: slot.id,
            bindings: slot.bindings.clone(),
        })
    }

    /// Puts one binding of a slot back the way `snapshot` captured it.
    ///
    /// The slot's other bindings keep their current state, so anything that
    /// happened to them since the capture (a reconciliation, a batched edit)
    /// survives. A binding missing from the snapshot is removed; a captured
    /// one is written back in place, or reinserted at its captured position.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot no longer exists.
    pub fn restore_binding(
        &mut self,
        snapshot: &SlotSnapshot,
        id: &BindingId,
    ) -> Result<(), DomainError> {
        let slot: &mut Slot = self
            .slot_mut(&snapshot.slot)
            .ok_or(DomainError::SlotNotFound(snapshot.slot))?;
        let current: Option<usize> = slot.bindings.iter().position(|b| &b.id == id);
        let captured: Option<(usize, &Binding)> = snapshot
            .bindings
            .iter()
            .enumerate()
            .find(|(_, b)| &b.id == id);
        match (current, captured) {
            (Some(index), None) => {
                slot.bindings.remove(index);
            }
            (Some(index), Some((_, binding))) => slot.bindings[index] = binding.clone(),
            (None, Some((position, binding))) => {
                let at: usize = position.min(slot.bindings.len());
                slot.bindings.insert(at, binding.clone());
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Rewrites every occurrence of `temp` to `real`.
    ///
    /// Returns the number of identifiers rewritten.
    pub fn reconcile(&mut self, temp: TempId, real: RealId) -> usize {
        self.subjects
            .iter_mut()
            .flat_map(|s| s.slots.iter_mut())
            .map(|slot| slot.reconcile(temp, real))
            .sum()
    }
}
