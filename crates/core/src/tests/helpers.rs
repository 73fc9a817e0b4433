// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{EditBuffer, MirrorStore};
use crewsync_domain::{ActorId, Binding, Identifier, RealId, RoleType, Slot, Subject, SubjectId};

pub const GALA: SubjectId = SubjectId::new(1);
pub const EXPO: SubjectId = SubjectId::new(2);

pub fn real(value: i64) -> Identifier {
    Identifier::Real(RealId::new(value))
}

/// Subject 1 has a persisted audio slot (100) with technicians 1 and 2
/// bound (200, 201) and an empty persisted lighting slot (101).
/// Subject 2 has no slots.
pub fn create_test_store() -> MirrorStore {
    let mut audio: Slot = Slot::new(real(100), GALA, String::from("A1"), RoleType::new("audio"));
    audio.bindings.push(Binding::new(real(200), ActorId::new(1)));
    audio.bindings.push(Binding::new(real(201), ActorId::new(2)));

    let lighting: Slot = Slot::new(real(101), GALA, String::from("L1"), RoleType::new("lighting"));

    let mut gala: Subject = Subject::new(GALA, String::from("Spring Gala"));
    gala.slots.push(audio);
    gala.slots.push(lighting);

    let mut store: MirrorStore = MirrorStore::new();
    store.load_subject(gala).unwrap();
    store
        .load_subject(Subject::new(EXPO, String::from("Trade Expo")))
        .unwrap();
    store
}

pub fn create_test_buffer() -> EditBuffer {
    EditBuffer::new(create_test_store())
}
