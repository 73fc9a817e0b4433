// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Clock, EditorSession, EngineConfig, ManualClock, TokioClock};
use crewsync::Edit;
use crewsync_domain::{
    ActorId, BindingId, Identifier, RealId, RoleType, SlotId, Subject, SubjectId,
};
use crewsync_remote::{InMemoryRemote, SubjectRecord};

pub const ALICE: ActorId = ActorId::new(1);
pub const BOB: ActorId = ActorId::new(2);
pub const CAROL: ActorId = ActorId::new(9);

/// The first key the collaborator hands out after seeding.
pub const FIRST_NEW_KEY: i64 = 7;

pub fn real(value: i64) -> Identifier {
    Identifier::Real(RealId::new(value))
}

/// Keys seeded into the collaborator:
/// gala (1) with an audio slot (2) binding Alice (3) and Bob (4) and an
/// empty lighting slot (5); expo (6) with no slots.
pub struct Fixture {
    pub remote: InMemoryRemote,
    pub gala: SubjectId,
    pub expo: SubjectId,
    pub audio: SlotId,
    pub lighting: SlotId,
    pub alice: BindingId,
    pub bob: BindingId,
}

pub fn create_test_fixture() -> Fixture {
    let remote: InMemoryRemote = InMemoryRemote::new();
    let gala: SubjectId = remote.seed_subject("Spring Gala");
    let audio: RealId = remote.seed_slot(gala, "A1", "audio");
    let alice: RealId = remote.seed_binding(audio, ALICE);
    let bob: RealId = remote.seed_binding(audio, BOB);
    let lighting: RealId = remote.seed_slot(gala, "L1", "lighting");
    let expo: SubjectId = remote.seed_subject("Trade Expo");
    Fixture {
        remote,
        gala,
        expo,
        audio: Identifier::Real(audio),
        lighting: Identifier::Real(lighting),
        alice: Identifier::Real(alice),
        bob: Identifier::Real(bob),
    }
}

pub async fn open_test_session(
    fixture: &Fixture,
    config: EngineConfig,
) -> (EditorSession<InMemoryRemote, ManualClock>, ManualClock) {
    let clock: ManualClock = ManualClock::new();
    let session: EditorSession<InMemoryRemote, ManualClock> = EditorSession::open(
        fixture.remote.clone(),
        &[fixture.gala, fixture.expo],
        config,
        clock.clone(),
    )
    .await
    .unwrap();
    fixture.remote.clear_journal();
    (session, clock)
}

pub async fn open_tokio_session(
    fixture: &Fixture,
    config: EngineConfig,
) -> EditorSession<InMemoryRemote, TokioClock> {
    let session: EditorSession<InMemoryRemote, TokioClock> = EditorSession::open(
        fixture.remote.clone(),
        &[fixture.gala, fixture.expo],
        config,
        TokioClock,
    )
    .await
    .unwrap();
    fixture.remote.clear_journal();
    session
}

pub fn add_slot(subject: SubjectId, role_label: &str, role_type: &str) -> Edit {
    Edit::AddSlot {
        subject,
        role_label: role_label.to_string(),
        role_type: RoleType::new(role_type),
    }
}

/// Asserts that every loaded subject matches the collaborator exactly.
pub fn assert_converged<C: Clock>(session: &EditorSession<InMemoryRemote, C>) {
    for subject in session.store().subjects() {
        let record: SubjectRecord = session.remote().snapshot(subject.id).unwrap();
        assert_eq!(&Subject::from(record), subject);
    }
}
