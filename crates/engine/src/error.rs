// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the sync engine.

use crewsync::CoreError;
use crewsync_domain::{DomainError, Identifier};
use crewsync_remote::RemoteError;
use thiserror::Error;

/// Failures surfaced by a flush or an immediate mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// A remote call failed in transport or timed out.
    #[error("Network failure during {operation}: {source}")]
    NetworkFailure {
        /// The remote call that failed.
        operation: &'static str,
        /// The underlying failure.
        source: RemoteError,
    },

    /// The remote store rejected a call.
    #[error("{operation} was rejected: {source}")]
    ValidationFailure {
        /// The remote call that was rejected.
        operation: &'static str,
        /// The rejection.
        source: RemoteError,
    },

    /// An entity still under a temp identifier was about to be sent.
    #[error("{id} has not been saved yet")]
    ReferentialStaleness {
        /// The unreconciled identifier.
        id: Identifier,
    },

    /// The local edit was invalid.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    /// Classifies a remote failure.
    #[must_use]
    pub fn from_remote(operation: &'static str, source: RemoteError) -> Self {
        if source.is_transport() {
            Self::NetworkFailure { operation, source }
        } else {
            Self::ValidationFailure { operation, source }
        }
    }

    /// Returns true if retrying the same call later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }
}

impl From<DomainError> for SyncError {
    fn from(err: DomainError) -> Self {
        Self::Core(CoreError::from(err))
    }
}

/// Failures loading an [`crate::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid configuration JSON.
    #[error("Invalid engine configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The debounce window is zero.
    #[error("Debounce window must be greater than zero")]
    ZeroDebounce,
}
