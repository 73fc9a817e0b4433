// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Edit;
use crate::error::CoreError;
use crate::log::OperationLog;
use crate::operation::PendingOperation;
use crate::resolver::{Reconciled, TempIdResolver};
use crate::state::MirrorStore;
use crewsync_domain::{
    ActorId, Binding, BindingId, BindingStatus, DomainError, Identifier, RealId, RoleType, Slot,
    SlotId, SubjectId, TempId, validate_actor_unbound, validate_slot_fields,
};

/// Options that change how edits are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Remove a slot in the same edit that removes its last binding.
    pub remove_empty_slots: bool,
}

/// The outcome of applying one edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResult {
    /// The identifier minted for a newly created slot or binding.
    pub created: Option<Identifier>,
    /// Operations appended to the log.
    pub enqueued: usize,
    /// Earlier operations cancelled by this edit.
    pub pruned: usize,
    /// Whether the mirror changed. A no-op edit leaves the buffer clean.
    pub changed: bool,
}

/// The session-scoped editing buffer: the mirror, its pending operations,
/// and the resolver that ties temp identifiers in both together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    /// What the editor renders.
    pub store: MirrorStore,
    /// Operations not yet sent.
    pub log: OperationLog,
    /// Temp identifier bookkeeping.
    pub resolver: TempIdResolver,
}

impl EditBuffer {
    /// Creates a buffer over an already loaded mirror.
    #[must_use]
    pub fn new(store: MirrorStore) -> Self {
        Self {
            store,
            log: OperationLog::new(),
            resolver: TempIdResolver::new(),
        }
    }

    /// Mints a fresh temp identifier.
    pub const fn mint(&mut self) -> TempId {
        self.resolver.mint()
    }

    /// Reconciles `temp` to `real` across the mirror and the log.
    ///
    /// # Errors
    ///
    /// Returns an error if `temp` was already reconciled to a different identifier.
    pub fn reconcile(&mut self, temp: TempId, real: RealId) -> Result<Reconciled, CoreError> {
        self.resolver
            .reconcile(&mut self.store, &mut self.log, temp, real)
    }
}

/// Applies an edit to the buffer in batched mode.
///
/// The mirror changes immediately and the matching remote work is queued.
/// Edits that cancel earlier queued work prune it instead of queueing an
/// inverse operation.
///
/// # Arguments
///
/// * `buffer` - The buffer to edit
/// * `edit` - The edit to apply
/// * `options` - Apply-time behaviour switches
///
/// # Returns
///
/// * `Ok(EditResult)` describing what changed
/// * `Err(CoreError)` if the edit is invalid; the buffer is then unchanged
///
/// # Errors
///
/// Returns an error if:
/// - A referenced subject, slot or binding does not exist
/// - The slot fields are invalid
/// - The actor is already bound to the slot
pub fn apply(
    buffer: &mut EditBuffer,
    edit: Edit,
    options: ApplyOptions,
) -> Result<EditResult, CoreError> {
    match edit {
        Edit::AddSlot {
            subject,
            role_label,
            role_type,
        } => add_slot(buffer, subject, role_label, role_type),
        Edit::RemoveSlot { slot } => {
            if buffer.store.slot(&slot).is_none() {
                return Err(CoreError::DomainViolation(DomainError::SlotNotFound(slot)));
            }
            Ok(remove_slots(buffer, &[slot]))
        }
        Edit::RemoveRole { subject, role_type } => {
            let slots: Vec<SlotId> = buffer
                .store
                .subject(subject)
                .ok_or(DomainError::SubjectNotFound(subject))?
                .slots_of_role(&role_type)
                .map(|s| s.id)
                .collect();
            if slots.is_empty() {
                return Err(CoreError::DomainViolation(DomainError::RoleNotFound {
                    subject,
                    role_type: role_type.as_str().to_string(),
                }));
            }
            Ok(remove_slots(buffer, &slots))
        }
        Edit::AddBinding { slot, actor } => add_binding(buffer, slot, actor),
        Edit::RemoveBinding { binding } => remove_binding(buffer, binding, options),
        Edit::SetBindingStatus { binding, status } => set_binding_status(buffer, binding, status),
    }
}

fn add_slot(
    buffer: &mut EditBuffer,
    subject: SubjectId,
    role_label: String,
    role_type: RoleType,
) -> Result<EditResult, CoreError> {
    if buffer.store.subject(subject).is_none() {
        return Err(CoreError::DomainViolation(DomainError::SubjectNotFound(
            subject,
        )));
    }
    validate_slot_fields(&role_label, &role_type)?;

    let temp: TempId = buffer.mint();
    buffer.store.add_slot(Slot::new(
        Identifier::Temp(temp),
        subject,
        role_label.clone(),
        role_type.clone(),
    ))?;
    buffer.log.enqueue(PendingOperation::CreateSlot {
        subject,
        slot: temp,
        role_label,
        role_type,
    });

    Ok(EditResult {
        created: Some(Identifier::Temp(temp)),
        enqueued: 1,
        pruned: 0,
        changed: true,
    })
}

/// Removes existing slots and queues at most one delete covering them.
///
/// Queued work for a removed slot or any of its bindings is pruned. A slot
/// whose create was still queued never reached the remote store, so it is
/// left out of the delete.
fn remove_slots(buffer: &mut EditBuffer, slots: &[SlotId]) -> EditResult {
    let mut to_delete: Vec<SlotId> = Vec::new();
    let mut pruned: usize = 0;

    for slot_id in slots {
        let Ok(slot) = buffer.store.remove_slot(slot_id) else {
            continue;
        };
        let ids: Vec<Identifier> = slot.identifiers().collect();
        let removed: Vec<PendingOperation> = buffer
            .log
            .prune(|op| ids.iter().any(|id| op.references(id)));
        pruned += removed.len();

        let never_sent: bool = slot
            .id
            .as_temp()
            .is_some_and(|temp| removed.iter().any(|op| op.creates() == Some(temp)));
        if !never_sent {
            to_delete.push(slot.id);
        }
    }

    let enqueued: usize = usize::from(!to_delete.is_empty());
    if !to_delete.is_empty() {
        buffer
            .log
            .enqueue(PendingOperation::DeleteSlot { slots: to_delete });
    }

    EditResult {
        created: None,
        enqueued,
        pruned,
        changed: true,
    }
}

fn add_binding(
    buffer: &mut EditBuffer,
    slot: SlotId,
    actor: ActorId,
) -> Result<EditResult, CoreError> {
    let target: &Slot = buffer
        .store
        .slot(&slot)
        .ok_or(DomainError::SlotNotFound(slot))?;
    validate_actor_unbound(target, actor)?;

    let temp: TempId = buffer.mint();
    buffer
        .store
        .add_binding(&slot, Binding::new(Identifier::Temp(temp), actor))?;
    buffer.log.enqueue(PendingOperation::CreateBinding {
        binding: temp,
        slot,
        actor,
    });

    Ok(EditResult {
        created: Some(Identifier::Temp(temp)),
        enqueued: 1,
        pruned: 0,
        changed: true,
    })
}

fn remove_binding(
    buffer: &mut EditBuffer,
    binding: BindingId,
    options: ApplyOptions,
) -> Result<EditResult, CoreError> {
    let (slot, _) = buffer.store.remove_binding(&binding)?;

    let removed: Vec<PendingOperation> = buffer.log.prune(|op| op.references(&binding));
    let never_sent: bool = binding
        .as_temp()
        .is_some_and(|temp| removed.iter().any(|op| op.creates() == Some(temp)));

    let mut result: EditResult = EditResult {
        created: None,
        enqueued: 0,
        pruned: removed.len(),
        changed: true,
    };
    if !never_sent {
        buffer
            .log
            .enqueue(PendingOperation::DeleteBinding { binding });
        result.enqueued += 1;
    }

    let now_empty: bool = buffer
        .store
        .slot(&slot)
        .is_some_and(|s| s.bindings.is_empty());
    if options.remove_empty_slots && now_empty {
        let slot_result: EditResult = remove_slots(buffer, &[slot]);
        result.enqueued += slot_result.enqueued;
        result.pruned += slot_result.pruned;
    }

    Ok(result)
}

fn set_binding_status(
    buffer: &mut EditBuffer,
    binding: BindingId,
    status: BindingStatus,
) -> Result<EditResult, CoreError> {
    let previous: BindingStatus = buffer.store.set_binding_status(&binding, status)?;
    if previous == status {
        return Ok(EditResult::default());
    }

    // Only the latest status for a binding needs to reach the remote store.
    let superseded: usize = buffer
        .log
        .prune(|op| {
            matches!(op, PendingOperation::UpdateBindingStatus { binding: b, .. } if *b == binding)
        })
        .len();
    buffer
        .log
        .enqueue(PendingOperation::UpdateBindingStatus { binding, status });

    Ok(EditResult {
        created: None,
        enqueued: 1,
        pruned: superseded,
        changed: true,
    })
}
