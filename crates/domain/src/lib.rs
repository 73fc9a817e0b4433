// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod binding_status;
mod error;
mod ids;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use binding_status::BindingStatus;
pub use error::DomainError;
pub use ids::{ActorId, BindingId, Identifier, RealId, SlotId, SubjectId, TempId};
pub use types::{Binding, RoleType, Slot, Subject};
pub use validation::{
    MAX_ROLE_LABEL_LEN, validate_actor_unbound, validate_date_bounds, validate_slot_fields,
};
