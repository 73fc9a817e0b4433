// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifier types.
//!
//! Entities created locally carry a client-minted [`TempId`] until the remote
//! store assigns a [`RealId`]. The two are kept apart by [`Identifier`], so a
//! temp token can never be mistaken for a persisted key.

use serde::{Deserialize, Serialize};

/// A client-minted placeholder for an entity that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(u64);

impl TempId {
    /// Creates a temp identifier from a session sequence number.
    #[must_use]
    pub const fn from_sequence(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Returns the session sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tmp:{}", self.0)
    }
}

/// An identifier assigned by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RealId(i64);

impl RealId {
    /// Wraps a remote key.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the remote key.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RealId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Either a temp or a real identifier for a slot or binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identifier {
    /// Not yet confirmed by the remote store.
    Temp(TempId),
    /// Persisted.
    Real(RealId),
}

impl Identifier {
    /// Returns true if this identifier has not been reconciled yet.
    #[must_use]
    pub const fn is_temp(&self) -> bool {
        matches!(self, Self::Temp(_))
    }

    /// Returns the temp token, if any.
    #[must_use]
    pub const fn as_temp(&self) -> Option<TempId> {
        match self {
            Self::Temp(temp) => Some(*temp),
            Self::Real(_) => None,
        }
    }

    /// Returns the real key, if any.
    #[must_use]
    pub const fn as_real(&self) -> Option<RealId> {
        match self {
            Self::Real(real) => Some(*real),
            Self::Temp(_) => None,
        }
    }

    /// Replaces `temp` with `real` in place.
    ///
    /// Returns true if this identifier was rewritten.
    pub fn reconcile(&mut self, temp: TempId, real: RealId) -> bool {
        if *self == Self::Temp(temp) {
            *self = Self::Real(real);
            true
        } else {
            false
        }
    }
}

impl From<TempId> for Identifier {
    fn from(temp: TempId) -> Self {
        Self::Temp(temp)
    }
}

impl From<RealId> for Identifier {
    fn from(real: RealId) -> Self {
        Self::Real(real)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temp(temp) => write!(f, "{temp}"),
            Self::Real(real) => write!(f, "{real}"),
        }
    }
}

/// Identifies a slot.
pub type SlotId = Identifier;

/// Identifies a binding.
pub type BindingId = Identifier;

/// Identifies a subject (e.g. a booked event).
///
/// Subjects are loaded from the remote store and never created locally,
/// so their identifiers are always real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(i64);

impl SubjectId {
    /// Wraps a remote subject key.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the remote subject key.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies an external actor (a technician).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
    /// Wraps a remote actor key.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the remote actor key.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
