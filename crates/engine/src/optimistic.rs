// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Immediate mutations with snapshot rollback.
//!
//! These bypass the operation log. The parent slot's binding list is
//! captured, the mirror is mutated, and the remote call is issued right
//! away. If the call fails, the binding the call touched is put back the
//! way it was captured. Other bindings in the slot keep whatever a flush or
//! a batched edit did to them while the call was outstanding.

use crate::error::SyncError;
use crewsync::{EditBuffer, PendingOperation, SlotSnapshot};
use crewsync_domain::{
    ActorId, Binding, BindingId, BindingStatus, DomainError, Identifier, RealId, SlotId, TempId,
};
use crewsync_remote::RemoteStore;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Binds an actor to a persisted slot.
///
/// The binding appears in the mirror under a temp identifier at once and
/// is reconciled when the remote store answers.
///
/// # Arguments
///
/// * `remote` - The remote store
/// * `buffer` - The session buffer
/// * `slot` - The slot to bind into; must already be persisted
/// * `actor` - The technician
///
/// # Returns
///
/// * `Ok(BindingId)` with the binding's real identifier
/// * `Err(SyncError)` if the edit is invalid or the remote call failed
///
/// # Errors
///
/// Returns an error if:
/// - The slot does not exist, or the actor is already bound to it
/// - The slot has not been persisted yet
/// - The remote call failed; the binding is then restored
pub async fn assign_now<R: RemoteStore>(
    remote: &R,
    buffer: &Mutex<EditBuffer>,
    slot: SlotId,
    actor: ActorId,
) -> Result<BindingId, SyncError> {
    let (slot_real, temp, snapshot): (RealId, TempId, SlotSnapshot) = {
        let mut guard = buffer.lock();
        let snapshot: SlotSnapshot = guard.store.snapshot_slot(&slot)?;
        let Identifier::Real(slot_real) = slot else {
            return Err(SyncError::ReferentialStaleness { id: slot });
        };
        let temp: TempId = guard.mint();
        guard
            .store
            .add_binding(&slot, Binding::new(Identifier::Temp(temp), actor))?;
        (slot_real, temp, snapshot)
    };
    debug!(%slot, %actor, %temp, "Optimistic assign applied");

    match remote.create_binding(slot_real, actor).await {
        Ok(real) => {
            buffer.lock().reconcile(temp, real)?;
            info!(%slot, %actor, binding = %real, "Technician assigned");
            Ok(Identifier::Real(real))
        }
        Err(err) => {
            rollback(buffer, &snapshot, Identifier::Temp(temp));
            Err(SyncError::from_remote("create binding", err))
        }
    }
}

/// Changes a persisted binding's status.
///
/// Setting the status a binding already has sends nothing. If the binding's
/// status is changed again by a batched edit while the call is out, that
/// newer status is kept locally whatever the call's outcome.
///
/// # Errors
///
/// Returns an error if:
/// - The binding does not exist or has not been persisted yet
/// - The remote call failed; the binding is then restored
pub async fn set_status_now<R: RemoteStore>(
    remote: &R,
    buffer: &Mutex<EditBuffer>,
    binding: BindingId,
    status: BindingStatus,
) -> Result<(), SyncError> {
    let (real, snapshot): (RealId, SlotSnapshot) = {
        let mut guard = buffer.lock();
        let (real, snapshot) = capture(&guard, binding)?;
        let previous: BindingStatus = guard.store.set_binding_status(&binding, status)?;
        if previous == status {
            return Ok(());
        }
        (real, snapshot)
    };
    debug!(%binding, %status, "Optimistic status change applied");

    match remote.update_binding(real, status).await {
        Ok(()) => {
            let mut guard = buffer.lock();
            // A batched change made while the call was out is newer than the
            // status just sent; it stays queued.
            let superseded: usize = if status_of(&guard, binding) == Some(status) {
                guard.log.prune(|op| is_status_change(op, binding)).len()
            } else {
                0
            };
            drop(guard);
            info!(%binding, %status, superseded, "Binding status changed");
            Ok(())
        }
        Err(err) => {
            let mut guard = buffer.lock();
            if status_of(&guard, binding) == Some(status) {
                restore(&mut guard, &snapshot, binding);
            } else {
                warn!(%binding, "Remote call failed, newer local status kept");
            }
            drop(guard);
            Err(SyncError::from_remote("update binding", err))
        }
    }
}

/// Removes a persisted binding.
///
/// # Errors
///
/// Returns an error if:
/// - The binding does not exist or has not been persisted yet
/// - The remote call failed; the binding is then restored
pub async fn unassign_now<R: RemoteStore>(
    remote: &R,
    buffer: &Mutex<EditBuffer>,
    binding: BindingId,
) -> Result<(), SyncError> {
    let (real, snapshot): (RealId, SlotSnapshot) = {
        let mut guard = buffer.lock();
        let captured: (RealId, SlotSnapshot) = capture(&guard, binding)?;
        guard.store.remove_binding(&binding)?;
        captured
    };
    debug!(%binding, "Optimistic unassign applied");

    match remote.delete_binding(real).await {
        Ok(()) => {
            let pruned: usize = buffer.lock().log.prune(|op| op.references(&binding)).len();
            info!(%binding, pruned, "Technician unassigned");
            Ok(())
        }
        Err(err) => {
            rollback(buffer, &snapshot, binding);
            Err(SyncError::from_remote("delete binding", err))
        }
    }
}

/// Snapshots the slot holding a persisted binding.
fn capture(buffer: &EditBuffer, binding: BindingId) -> Result<(RealId, SlotSnapshot), SyncError> {
    let (slot, _) = buffer
        .store
        .binding(&binding)
        .ok_or(DomainError::BindingNotFound(binding))?;
    let Identifier::Real(real) = binding else {
        return Err(SyncError::ReferentialStaleness { id: binding });
    };
    let snapshot: SlotSnapshot = buffer.store.snapshot_slot(&slot.id)?;
    Ok((real, snapshot))
}

fn status_of(buffer: &EditBuffer, binding: BindingId) -> Option<BindingStatus> {
    buffer.store.binding(&binding).map(|(_, b)| b.status)
}

fn is_status_change(op: &PendingOperation, binding: BindingId) -> bool {
    matches!(op, PendingOperation::UpdateBindingStatus { binding: b, .. } if *b == binding)
}

fn rollback(buffer: &Mutex<EditBuffer>, snapshot: &SlotSnapshot, binding: BindingId) {
    restore(&mut buffer.lock(), snapshot, binding);
}

fn restore(buffer: &mut EditBuffer, snapshot: &SlotSnapshot, binding: BindingId) {
    let slot: SlotId = snapshot.slot;
    match buffer.store.restore_binding(snapshot, &binding) {
        Ok(()) => warn!(%slot, %binding, "Remote call failed, binding restored"),
        Err(err) => {
            warn!(%slot, %binding, error = %err, "Remote call failed, slot no longer present");
        }
    }
}
