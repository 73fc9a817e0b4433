// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crewsync_domain::{DomainError, RealId, TempId};

/// Errors that can occur while editing the local buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A temp identifier was already reconciled to a different real identifier.
    ConflictingReconciliation {
        /// The temp identifier.
        temp: TempId,
        /// The real identifier it was reconciled to first.
        existing: RealId,
        /// The real identifier offered now.
        requested: RealId,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::ConflictingReconciliation {
                temp,
                existing,
                requested,
            } => write!(
                f,
                "{temp} is already reconciled to {existing}, cannot reconcile to {requested}"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
