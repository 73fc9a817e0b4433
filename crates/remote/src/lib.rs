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

//! The remote store contract.
//!
//! Only real identifiers cross this boundary. A slot or binding that is
//! still under a temp identifier cannot be named in a call.

mod error;
mod memory;
mod request_response;

#[cfg(test)]
mod tests;

use crewsync_domain::{ActorId, BindingStatus, RealId, RoleType, SubjectId};
use std::future::Future;

pub use error::RemoteError;
pub use memory::{InMemoryRemote, RemoteCall};
pub use request_response::{
    BindingRecord, CreateBindingRequest, CreateBindingResponse, CreateSlotRequest,
    CreateSlotResponse, ErrorResponse, SlotRecord, SubjectRecord, UpdateBindingRequest,
};

/// The persistence collaborator the sync engine talks to.
///
/// Each call either succeeds, or fails with a [`RemoteError`] and leaves
/// the remote state unchanged.
pub trait RemoteStore: Send + Sync {
    /// Fetches a subject with all of its slots and bindings.
    fn fetch_subject(
        &self,
        subject: SubjectId,
    ) -> impl Future<Output = Result<SubjectRecord, RemoteError>> + Send;

    /// Creates a slot and returns its remote key.
    fn create_slot(
        &self,
        subject: SubjectId,
        role_label: String,
        role_type: RoleType,
    ) -> impl Future<Output = Result<RealId, RemoteError>> + Send;

    /// Deletes a slot and every binding under it.
    fn delete_slot(&self, slot: RealId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Binds an actor to a slot and returns the binding's remote key.
    fn create_binding(
        &self,
        slot: RealId,
        actor: ActorId,
    ) -> impl Future<Output = Result<RealId, RemoteError>> + Send;

    /// Deletes a binding.
    fn delete_binding(
        &self,
        binding: RealId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Sets a binding's status.
    fn update_binding(
        &self,
        binding: RealId,
        status: BindingStatus,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
