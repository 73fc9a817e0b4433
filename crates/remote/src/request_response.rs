// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wire types exchanged with the remote store.
//!
//! Records carry plain remote keys; conversion into domain entities tags
//! every key as a real identifier.

use crewsync_domain::{
    ActorId, Binding, BindingStatus, Identifier, RealId, RoleType, Slot, Subject, SubjectId,
};
use serde::{Deserialize, Serialize};
use time::Date;

/// A persisted binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    /// Remote key.
    pub id: i64,
    /// Bound technician.
    pub actor_id: i64,
    /// Current status.
    pub status: BindingStatus,
    /// First effective day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<Date>,
    /// Last effective day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_until: Option<Date>,
}

/// A persisted slot with its bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Remote key.
    pub id: i64,
    /// Display label.
    pub role_label: String,
    /// Role category.
    pub role_type: String,
    /// Bindings in creation order.
    pub bindings: Vec<BindingRecord>,
}

/// A persisted subject with its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Remote key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Slots in creation order.
    pub slots: Vec<SlotRecord>,
}

impl From<BindingRecord> for Binding {
    fn from(record: BindingRecord) -> Self {
        Self {
            id: Identifier::Real(RealId::new(record.id)),
            actor: ActorId::new(record.actor_id),
            status: record.status,
            effective_from: record.effective_from,
            effective_until: record.effective_until,
        }
    }
}

impl From<SubjectRecord> for Subject {
    fn from(record: SubjectRecord) -> Self {
        let subject: SubjectId = SubjectId::new(record.id);
        let slots: Vec<Slot> = record
            .slots
            .into_iter()
            .map(|slot| Slot {
                id: Identifier::Real(RealId::new(slot.id)),
                subject,
                role_label: slot.role_label,
                role_type: RoleType::new(&slot.role_type),
                bindings: slot.bindings.into_iter().map(Binding::from).collect(),
            })
            .collect();
        Self {
            id: subject,
            name: record.name,
            slots,
        }
    }
}

/// Request body for Create-Slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    /// Display label.
    pub role_label: String,
    /// Role category.
    pub role_type: String,
}

/// Response body for Create-Slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSlotResponse {
    /// The new slot's remote key.
    pub slot_id: i64,
}

/// Request body for Create-Binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBindingRequest {
    /// The technician to bind.
    pub actor_id: i64,
}

/// Response body for Create-Binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBindingResponse {
    /// The new binding's remote key.
    pub binding_id: i64,
}

/// Request body for Update-Binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBindingRequest {
    /// The new status.
    pub status: BindingStatus,
}

/// Error body returned by the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub error: String,
}
