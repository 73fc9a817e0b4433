// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory reference collaborator.
//!
//! Implements the remote contract against plain maps. Every call is
//! journaled before it is evaluated, so tests can assert on exactly which
//! requests reached the collaborator. Scripted faults make a chosen call
//! fail without touching the tables.

use crate::RemoteStore;
use crate::error::RemoteError;
use crate::request_response::{BindingRecord, SlotRecord, SubjectRecord};
use crewsync_domain::{ActorId, BindingStatus, RealId, RoleType, SubjectId};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One request as seen by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// Fetch-Subject.
    FetchSubject {
        /// Requested subject.
        subject: SubjectId,
    },
    /// Create-Slot.
    CreateSlot {
        /// Owning subject.
        subject: SubjectId,
        /// Display label.
        role_label: String,
    },
    /// Delete-Slot.
    DeleteSlot {
        /// Slot key.
        slot: RealId,
    },
    /// Create-Binding.
    CreateBinding {
        /// Parent slot key.
        slot: RealId,
        /// Technician.
        actor: ActorId,
    },
    /// Delete-Binding.
    DeleteBinding {
        /// Binding key.
        binding: RealId,
    },
    /// Update-Binding.
    UpdateBinding {
        /// Binding key.
        binding: RealId,
        /// New status.
        status: BindingStatus,
    },
}

impl RemoteCall {
    /// Returns true for calls that change remote state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::FetchSubject { .. })
    }
}

#[derive(Debug, Clone)]
struct SubjectRow {
    name: String,
}

#[derive(Debug, Clone)]
struct SlotRow {
    subject: i64,
    role_label: String,
    role_type: String,
}

#[derive(Debug, Clone)]
struct BindingRow {
    slot: i64,
    actor: i64,
    status: BindingStatus,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    subjects: BTreeMap<i64, SubjectRow>,
    slots: BTreeMap<i64, SlotRow>,
    bindings: BTreeMap<i64, BindingRow>,
    journal: Vec<RemoteCall>,
    mutations_seen: usize,
    faults: HashMap<usize, RemoteError>,
    latency: Option<Duration>,
}

impl Tables {
    const fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Journals a call and returns the scripted fault for it, if any.
    fn record(&mut self, call: RemoteCall) -> Result<(), RemoteError> {
        let mutation: bool = call.is_mutation();
        self.journal.push(call);
        if !mutation {
            return Ok(());
        }
        self.mutations_seen += 1;
        match self.faults.remove(&self.mutations_seen) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn subject_record(&self, id: i64) -> Option<SubjectRecord> {
        let row: &SubjectRow = self.subjects.get(&id)?;
        let slots: Vec<SlotRecord> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.subject == id)
            .map(|(slot_id, slot)| SlotRecord {
                id: *slot_id,
                role_label: slot.role_label.clone(),
                role_type: slot.role_type.clone(),
                bindings: self
                    .bindings
                    .iter()
                    .filter(|(_, b)| b.slot == *slot_id)
                    .map(|(binding_id, b)| BindingRecord {
                        id: *binding_id,
                        actor_id: b.actor,
                        status: b.status,
                        effective_from: None,
                        effective_until: None,
                    })
                    .collect(),
            })
            .collect();
        Some(SubjectRecord {
            id,
            name: row.name.clone(),
            slots,
        })
    }
}

/// Shared handle to an in-memory collaborator.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemote {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRemote {
    /// Creates an empty collaborator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency` before it is evaluated.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    /// Delays every later call by `latency`, for every clone of this handle.
    pub fn set_latency(&self, latency: Duration) {
        self.tables.lock().latency = Some(latency);
    }

    /// Creates a subject without journaling the call.
    pub fn seed_subject(&self, name: &str) -> SubjectId {
        let mut tables = self.tables.lock();
        let id: i64 = tables.allocate();
        tables.subjects.insert(
            id,
            SubjectRow {
                name: name.to_string(),
            },
        );
        SubjectId::new(id)
    }

    /// Creates a slot without journaling the call.
    pub fn seed_slot(&self, subject: SubjectId, role_label: &str, role_type: &str) -> RealId {
        let mut tables = self.tables.lock();
        let id: i64 = tables.allocate();
        tables.slots.insert(
            id,
            SlotRow {
                subject: subject.value(),
                role_label: role_label.to_string(),
                role_type: RoleType::new(role_type).as_str().to_string(),
            },
        );
        RealId::new(id)
    }

    /// Creates a binding without journaling the call.
    pub fn seed_binding(&self, slot: RealId, actor: ActorId) -> RealId {
        let mut tables = self.tables.lock();
        let id: i64 = tables.allocate();
        tables.bindings.insert(
            id,
            BindingRow {
                slot: slot.value(),
                actor: actor.value(),
                status: BindingStatus::Pending,
            },
        );
        RealId::new(id)
    }

    /// Makes the `n`th mutating call from now fail with `error`.
    ///
    /// `n` is 1-based: `fail_nth_mutation(1, ..)` fails the next mutation.
    pub fn fail_nth_mutation(&self, n: usize, error: RemoteError) {
        let mut tables = self.tables.lock();
        let at: usize = tables.mutations_seen + n;
        tables.faults.insert(at, error);
    }

    /// Returns every call received so far.
    #[must_use]
    pub fn journal(&self) -> Vec<RemoteCall> {
        self.tables.lock().journal.clone()
    }

    /// Returns the mutating calls received so far.
    #[must_use]
    pub fn mutations(&self) -> Vec<RemoteCall> {
        self.tables
            .lock()
            .journal
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Forgets the journal.
    pub fn clear_journal(&self) {
        self.tables.lock().journal.clear();
    }

    /// Returns a subject as the collaborator currently stores it.
    #[must_use]
    pub fn snapshot(&self, subject: SubjectId) -> Option<SubjectRecord> {
        self.tables.lock().subject_record(subject.value())
    }

    /// Returns the ids of every stored subject.
    #[must_use]
    pub fn subject_ids(&self) -> Vec<SubjectId> {
        self.tables
            .lock()
            .subjects
            .keys()
            .copied()
            .map(SubjectId::new)
            .collect()
    }

    async fn delay(&self) {
        let latency: Option<Duration> = self.tables.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl RemoteStore for InMemoryRemote {
    async fn fetch_subject(&self, subject: SubjectId) -> Result<SubjectRecord, RemoteError> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.record(RemoteCall::FetchSubject { subject })?;
        tables
            .subject_record(subject.value())
            .ok_or(RemoteError::NotFound {
                resource: "Subject",
                id: subject.value(),
            })
    }

    async fn create_slot(
        &self,
        subject: SubjectId,
        role_label: String,
        role_type: RoleType,
    ) -> Result<RealId, RemoteError> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.record(RemoteCall::CreateSlot {
            subject,
            role_label: role_label.clone(),
        })?;
        if !tables.subjects.contains_key(&subject.value()) {
            return Err(RemoteError::NotFound {
                resource: "Subject",
                id: subject.value(),
            });
        }
        if role_label.trim().is_empty() {
            return Err(RemoteError::validation("role_label", "must not be empty"));
        }
        if role_type.as_str().is_empty() {
            return Err(RemoteError::validation("role_type", "must not be empty"));
        }
        let id: i64 = tables.allocate();
        tables.slots.insert(
            id,
            SlotRow {
                subject: subject.value(),
                role_label,
                role_type: role_type.as_str().to_string(),
            },
        );
        debug!(slot = id, subject = %subject, "Slot created");
        Ok(RealId::new(id))
    }

    async fn delete_slot(&self, slot: RealId) -> Result<(), RemoteError> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.record(RemoteCall::DeleteSlot { slot })?;
        if tables.slots.remove(&slot.value()).is_none() {
            return Err(RemoteError::NotFound {
                resource: "Slot",
                id: slot.value(),
            });
        }
        // Bindings go with their slot.
        tables.bindings.retain(|_, b| b.slot != slot.value());
        debug!(slot = %slot, "Slot deleted");
        Ok(())
    }

    async fn create_binding(&self, slot: RealId, actor: ActorId) -> Result<RealId, RemoteError> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.record(RemoteCall::CreateBinding { slot, actor })?;
        if !tables.slots.contains_key(&slot.value()) {
            return Err(RemoteError::NotFound {
                resource: "Slot",
                id: slot.value(),
            });
        }
        let duplicate: bool = tables
            .bindings
            .values()
            .any(|b| b.slot == slot.value() && b.actor == actor.value());
        if duplicate {
            return Err(RemoteError::validation(
                "actor_id",
                "technician is already bound to this slot",
            ));
        }
        let id: i64 = tables.allocate();
        tables.bindings.insert(
            id,
            BindingRow {
                slot: slot.value(),
                actor: actor.value(),
                status: BindingStatus::Pending,
            },
        );
        debug!(binding = id, slot = %slot, actor = %actor, "Binding created");
        Ok(RealId::new(id))
    }

    async fn delete_binding(&self, binding: RealId) -> Result<(), RemoteError> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.record(RemoteCall::DeleteBinding { binding })?;
        if tables.bindings.remove(&binding.value()).is_none() {
            return Err(RemoteError::NotFound {
                resource: "Binding",
                id: binding.value(),
            });
        }
        debug!(binding = %binding, "Binding deleted");
        Ok(())
    }

    async fn update_binding(
        &self,
        binding: RealId,
        status: BindingStatus,
    ) -> Result<(), RemoteError> {
        self.delay().await;
        let mut tables = self.tables.lock();
        tables.record(RemoteCall::UpdateBinding { binding, status })?;
        let row: &mut BindingRow =
            tables
                .bindings
                .get_mut(&binding.value())
                .ok_or(RemoteError::NotFound {
                    resource: "Binding",
                    id: binding.value(),
                })?;
        row.status = status;
        debug!(binding = %binding, %status, "Binding updated");
        Ok(())
    }
}
