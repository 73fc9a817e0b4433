// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{EXPO, create_test_buffer, real};
use crate::{
    ApplyOptions, CoreError, Edit, EditBuffer, PendingOperation, Reconciled, TempIdResolver, apply,
};
use crewsync_domain::{ActorId, BindingStatus, Identifier, RealId, RoleType, TempId};

fn new_slot_with_binding(buffer: &mut EditBuffer) -> (TempId, TempId) {
    let slot: Identifier = apply(
        buffer,
        Edit::AddSlot {
            subject: EXPO,
            role_label: String::from("R1"),
            role_type: RoleType::new("rigging"),
        },
        ApplyOptions::default(),
    )
    .unwrap()
    .created
    .unwrap();
    let binding: Identifier = apply(
        buffer,
        Edit::AddBinding {
            slot,
            actor: ActorId::new(4),
        },
        ApplyOptions::default(),
    )
    .unwrap()
    .created
    .unwrap();
    (slot.as_temp().unwrap(), binding.as_temp().unwrap())
}

#[test]
fn test_mint_is_monotonic_and_unique() {
    let mut resolver: TempIdResolver = TempIdResolver::new();
    let minted: Vec<TempId> = (0..100).map(|_| resolver.mint()).collect();

    for pair in minted.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert_eq!(minted[0], TempId::from_sequence(1));
}

#[test]
fn test_reconcile_rewrites_store_and_log() {
    let mut buffer: EditBuffer = create_test_buffer();
    let (slot, _binding) = new_slot_with_binding(&mut buffer);

    // CreateSlot was sent; only the binding create is still queued.
    let sent: Vec<PendingOperation> = buffer.log.drain();
    buffer.log.requeue_front(sent[1..].to_vec());

    let reconciled: Reconciled = buffer.reconcile(slot, RealId::new(500)).unwrap();

    assert_eq!(reconciled.store_rewrites, 1);
    assert_eq!(reconciled.log_rewrites, 1);
    assert_eq!(reconciled.dropped, 0);
    assert!(buffer.store.slot(&real(500)).is_some());
    assert!(matches!(
        buffer.log.iter().next(),
        Some(PendingOperation::CreateBinding { slot, .. }) if *slot == real(500)
    ));
    assert_eq!(buffer.resolver.resolve(slot), Some(RealId::new(500)));
    assert_eq!(buffer.resolver.current(Identifier::Temp(slot)), real(500));
}

#[test]
fn test_reconcile_twice_has_no_further_effect() {
    let mut buffer: EditBuffer = create_test_buffer();
    let (slot, _binding) = new_slot_with_binding(&mut buffer);
    buffer.log.drain();

    buffer.reconcile(slot, RealId::new(500)).unwrap();
    let after_first: EditBuffer = buffer.clone();
    let second: Reconciled = buffer.reconcile(slot, RealId::new(500)).unwrap();

    assert_eq!(second, Reconciled::default());
    assert_eq!(buffer, after_first);
}

#[test]
fn test_conflicting_reconcile_is_rejected() {
    let mut buffer: EditBuffer = create_test_buffer();
    let (slot, _binding) = new_slot_with_binding(&mut buffer);
    buffer.reconcile(slot, RealId::new(500)).unwrap();

    let result = buffer.reconcile(slot, RealId::new(501));

    assert_eq!(
        result,
        Err(CoreError::ConflictingReconciliation {
            temp: slot,
            existing: RealId::new(500),
            requested: RealId::new(501),
        })
    );
}

#[test]
fn test_deleted_entity_keeps_delete_and_drops_other_references() {
    let mut buffer: EditBuffer = create_test_buffer();
    let (_slot, binding) = new_slot_with_binding(&mut buffer);

    // Both creates are in flight.
    buffer.log.drain();
    apply(
        &mut buffer,
        Edit::RemoveBinding {
            binding: Identifier::Temp(binding),
        },
        ApplyOptions::default(),
    )
    .unwrap();
    // A stale reference that slipped in behind the delete.
    buffer.log.enqueue(PendingOperation::UpdateBindingStatus {
        binding: Identifier::Temp(binding),
        status: BindingStatus::Accepted,
    });

    let reconciled: Reconciled = buffer.reconcile(binding, RealId::new(700)).unwrap();

    assert_eq!(reconciled.dropped, 1);
    assert_eq!(reconciled.store_rewrites, 0);
    let remaining: Vec<PendingOperation> = buffer.log.iter().cloned().collect();
    assert_eq!(
        remaining,
        vec![PendingOperation::DeleteBinding { binding: real(700) }]
    );
}
