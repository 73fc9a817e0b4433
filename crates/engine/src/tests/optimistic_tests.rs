// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    ALICE, BOB, CAROL, FIRST_NEW_KEY, add_slot, assert_converged, create_test_fixture,
    open_test_session, open_tokio_session, real,
};
use crate::{EngineConfig, FlushOutcome, FlushReport, SaveStatus, SyncError};
use crewsync::{CoreError, Edit, EditResult, PendingOperation};
use crewsync_domain::{BindingId, BindingStatus, DomainError, Identifier, RealId, Slot, SlotId};
use crewsync_remote::{RemoteCall, RemoteError};
use std::time::Duration;

const LATENCY: Duration = Duration::from_millis(10);

/// Lets the first future of a `join!` reach its remote call.
async fn after_first_call_starts() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test]
async fn test_assign_now_persists_and_reconciles() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;

    let binding: BindingId = session.assign_now(fixture.lighting, CAROL).await.unwrap();

    assert_eq!(binding, real(FIRST_NEW_KEY));
    assert_eq!(
        fixture.remote.mutations(),
        vec![RemoteCall::CreateBinding {
            slot: RealId::new(5),
            actor: CAROL,
        }]
    );
    let slot: Slot = session.read(|s| s.slot(&fixture.lighting).cloned()).unwrap();
    assert_eq!(slot.bindings[0].id, binding);
    assert!(session.pending().is_empty());
    assert_eq!(session.status(), SaveStatus::Saved);
    assert_converged(&session);
}

#[tokio::test]
async fn test_failed_assign_restores_slot_exactly() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;
    let before: Slot = session.read(|s| s.slot(&fixture.audio).cloned()).unwrap();
    fixture
        .remote
        .fail_nth_mutation(1, RemoteError::network("connection reset"));

    let result: Result<BindingId, SyncError> = session.assign_now(fixture.audio, CAROL).await;

    assert!(matches!(result, Err(SyncError::NetworkFailure { .. })));
    let after: Slot = session.read(|s| s.slot(&fixture.audio).cloned()).unwrap();
    assert_eq!(after, before);
    assert_eq!(session.store().temp_count(), 0);
}

#[tokio::test]
async fn test_failed_status_change_restores_slot_exactly() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;
    let before: Slot = session.read(|s| s.slot(&fixture.audio).cloned()).unwrap();
    fixture
        .remote
        .fail_nth_mutation(1, RemoteError::validation("status", "locked"));

    let result: Result<(), SyncError> = session
        .set_status_now(fixture.bob, BindingStatus::Accepted)
        .await;

    assert!(matches!(result, Err(SyncError::ValidationFailure { .. })));
    let after: Slot = session.read(|s| s.slot(&fixture.audio).cloned()).unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_failed_unassign_restores_binding_order() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;
    let before: Slot = session.read(|s| s.slot(&fixture.audio).cloned()).unwrap();
    fixture.remote.fail_nth_mutation(1, RemoteError::Timeout);

    let result: Result<(), SyncError> = session.unassign_now(fixture.alice).await;

    assert!(matches!(result, Err(SyncError::NetworkFailure { .. })));
    let after: Slot = session.read(|s| s.slot(&fixture.audio).cloned()).unwrap();
    assert_eq!(after, before);
    assert_eq!(after.bindings[0].id, fixture.alice);
}

#[tokio::test]
async fn test_status_change_to_current_status_sends_nothing() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;

    session
        .set_status_now(fixture.alice, BindingStatus::Pending)
        .await
        .unwrap();

    assert!(fixture.remote.mutations().is_empty());
}

#[tokio::test]
async fn test_successful_immediate_changes_supersede_queued_ones() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;
    session
        .edit(Edit::SetBindingStatus {
            binding: fixture.alice,
            status: BindingStatus::Declined,
        })
        .unwrap();
    session
        .edit(Edit::SetBindingStatus {
            binding: fixture.bob,
            status: BindingStatus::Tentative,
        })
        .unwrap();

    session
        .set_status_now(fixture.alice, BindingStatus::Accepted)
        .await
        .unwrap();
    session.unassign_now(fixture.bob).await.unwrap();

    assert!(session.pending().is_empty());
    session.save_now().await;
    assert_eq!(session.status(), SaveStatus::Saved);
    assert_converged(&session);
}

#[tokio::test]
async fn test_assign_into_unsaved_slot_is_refused() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;
    let slot: SlotId = session
        .edit(add_slot(fixture.gala, "V1", "video"))
        .unwrap()
        .created
        .unwrap();

    let result: Result<BindingId, SyncError> = session.assign_now(slot, CAROL).await;

    assert_eq!(result, Err(SyncError::ReferentialStaleness { id: slot }));
    assert!(fixture.remote.mutations().is_empty());
    let bound: usize = session.read(|s| s.slot(&slot).map_or(0, |s| s.bindings.len()));
    assert_eq!(bound, 0);
}

#[tokio::test]
async fn test_assign_duplicate_actor_is_refused_before_any_call() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;

    let result: Result<BindingId, SyncError> = session.assign_now(fixture.audio, ALICE).await;

    assert_eq!(
        result,
        Err(SyncError::Core(CoreError::DomainViolation(
            DomainError::DuplicateBinding {
                slot: fixture.audio,
                actor: ALICE,
            }
        )))
    );
    assert!(fixture.remote.mutations().is_empty());
}

#[tokio::test]
async fn test_unassign_unknown_binding_is_refused() {
    let fixture = create_test_fixture();
    let (session, _clock) = open_test_session(&fixture, EngineConfig::default()).await;
    let missing: Identifier = real(404);

    let result: Result<(), SyncError> = session.unassign_now(missing).await;

    assert_eq!(
        result,
        Err(SyncError::Core(CoreError::DomainViolation(
            DomainError::BindingNotFound(missing)
        )))
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_assign_keeps_binding_reconciled_by_running_flush() {
    let fixture = create_test_fixture();
    let session = open_tokio_session(&fixture, EngineConfig::default()).await;
    session
        .edit(Edit::AddBinding {
            slot: fixture.lighting,
            actor: CAROL,
        })
        .unwrap();
    fixture.remote.set_latency(LATENCY);
    fixture
        .remote
        .fail_nth_mutation(2, RemoteError::network("connection reset"));

    let assign = async {
        after_first_call_starts().await;
        session.assign_now(fixture.lighting, BOB).await
    };
    let (outcome, assigned) = tokio::join!(session.save_now(), assign);

    assert!(outcome.succeeded());
    assert!(matches!(assigned, Err(SyncError::NetworkFailure { .. })));
    let slot: Slot = session.read(|s| s.slot(&fixture.lighting).cloned()).unwrap();
    assert_eq!(slot.bindings.len(), 1);
    assert_eq!(slot.bindings[0].id, real(FIRST_NEW_KEY));
    assert_eq!(session.store().temp_count(), 0);
    assert!(session.pending().is_empty());
    assert_converged(&session);

    session
        .edit(Edit::RemoveBinding {
            binding: real(FIRST_NEW_KEY),
        })
        .unwrap();
    assert!(session.save_now().await.succeeded());
    assert_converged(&session);
}

#[tokio::test(start_paused = true)]
async fn test_batched_status_change_made_during_immediate_one_is_still_sent() {
    let fixture = create_test_fixture();
    let session = open_tokio_session(&fixture, EngineConfig::default()).await;
    fixture.remote.set_latency(LATENCY);

    let change = async {
        after_first_call_starts().await;
        session
            .edit(Edit::SetBindingStatus {
                binding: fixture.alice,
                status: BindingStatus::Declined,
            })
            .unwrap()
    };
    let (immediate, edited) = tokio::join!(
        session.set_status_now(fixture.alice, BindingStatus::Accepted),
        change
    );

    immediate.unwrap();
    let edited: EditResult = edited;
    assert_eq!(edited.enqueued, 1);
    assert_eq!(
        session.pending(),
        vec![PendingOperation::UpdateBindingStatus {
            binding: fixture.alice,
            status: BindingStatus::Declined,
        }]
    );

    assert!(session.save_now().await.succeeded());
    let status: Option<BindingStatus> =
        session.read(|s| s.binding(&fixture.alice).map(|(_, b)| b.status));
    assert_eq!(status, Some(BindingStatus::Declined));
    assert_eq!(session.status(), SaveStatus::Saved);
    assert_converged(&session);
}

#[tokio::test(start_paused = true)]
async fn test_failed_status_change_keeps_newer_batched_status() {
    let fixture = create_test_fixture();
    let session = open_tokio_session(&fixture, EngineConfig::default()).await;
    fixture.remote.set_latency(LATENCY);
    fixture.remote.fail_nth_mutation(1, RemoteError::Timeout);

    let change = async {
        after_first_call_starts().await;
        session
            .edit(Edit::SetBindingStatus {
                binding: fixture.alice,
                status: BindingStatus::Tentative,
            })
            .unwrap();
    };
    let (immediate, ()) = tokio::join!(
        session.set_status_now(fixture.alice, BindingStatus::Accepted),
        change
    );

    assert!(matches!(immediate, Err(SyncError::NetworkFailure { .. })));
    let status: Option<BindingStatus> =
        session.read(|s| s.binding(&fixture.alice).map(|(_, b)| b.status));
    assert_eq!(status, Some(BindingStatus::Tentative));

    assert!(session.save_now().await.succeeded());
    assert_converged(&session);
}

#[tokio::test(start_paused = true)]
async fn test_unassign_racing_a_flush_of_its_status_change_does_not_wedge_the_log() {
    let fixture = create_test_fixture();
    let session = open_tokio_session(&fixture, EngineConfig::default()).await;
    session
        .edit(Edit::SetBindingStatus {
            binding: fixture.alice,
            status: BindingStatus::Accepted,
        })
        .unwrap();
    fixture.remote.set_latency(LATENCY);

    let save = async {
        after_first_call_starts().await;
        session.save_now().await
    };
    let (unassigned, outcome) = tokio::join!(session.unassign_now(fixture.alice), save);

    unassigned.unwrap();
    assert_eq!(
        outcome,
        FlushOutcome::Completed(FlushReport {
            drained: 1,
            settled: 1,
            ..FlushReport::default()
        })
    );
    assert!(session.pending().is_empty());

    session
        .edit(Edit::AddBinding {
            slot: fixture.lighting,
            actor: CAROL,
        })
        .unwrap();
    assert!(session.save_now().await.succeeded());
    assert!(session.pending().is_empty());
    assert_eq!(session.indicator().to_string(), "saved");
    assert_converged(&session);
}
