// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for remote store calls.

use thiserror::Error;

/// Failures reported by the remote store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The call never got an answer: connection refused, reset, and so on.
    #[error("Network failure: {message}")]
    Network {
        /// Transport-level description.
        message: String,
    },

    /// The call did not complete in time.
    #[error("Remote call timed out")]
    Timeout,

    /// The remote store rejected the request.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        message: String,
    },

    /// The request named an entity the remote store does not have.
    #[error("{resource} {id} not found")]
    NotFound {
        /// The kind of entity.
        resource: &'static str,
        /// The key that was looked up.
        id: i64,
    },
}

impl RemoteError {
    /// Creates a network failure.
    #[must_use]
    pub fn network(message: &str) -> Self {
        Self::Network {
            message: message.to_string(),
        }
    }

    /// Creates a validation failure.
    #[must_use]
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns true if the request never reached a decision on the remote side.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout)
    }
}
