// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Debounced auto-save state machine.
//!
//! The scheduler never reads a clock or sleeps on its own. Callers pass the
//! current instant in and ask whether a flush is due, which keeps every
//! transition deterministic under test.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Save state of the whole editing buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    /// Nothing is waiting to be sent.
    #[default]
    Saved,
    /// Edits are waiting for the next flush.
    Unsaved,
    /// A flush is in progress.
    Saving,
}

impl SaveStatus {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Unsaved => "unsaved",
            Self::Saving => "saving",
        }
    }
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the save indicator renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveIndicator {
    /// Current save state.
    pub status: SaveStatus,
    /// Number of queued operations.
    pub pending: usize,
}

impl std::fmt::Display for SaveIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            SaveStatus::Unsaved => write!(f, "unsaved ({})", self.pending),
            SaveStatus::Saved | SaveStatus::Saving => write!(f, "{}", self.status),
        }
    }
}

/// Tracks the save state and the quiescence deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSaveScheduler {
    status: SaveStatus,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl AutoSaveScheduler {
    /// Creates a scheduler in the `saved` state.
    #[must_use]
    pub const fn new(debounce: Duration) -> Self {
        Self {
            status: SaveStatus::Saved,
            debounce,
            deadline: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn status(&self) -> SaveStatus {
        self.status
    }

    /// Returns when the armed timer fires, if one is armed.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records a local mutation and (re)starts the timer.
    ///
    /// During a flush the state stays `saving`; the timer armed here decides
    /// when the edits made meanwhile are sent.
    pub fn on_mutation(&mut self, now: Instant) {
        if self.status == SaveStatus::Saved {
            debug!(from = %self.status, to = %SaveStatus::Unsaved, "Save status changed");
            self.status = SaveStatus::Unsaved;
        }
        self.deadline = Some(now + self.debounce);
    }

    /// Returns true if the timer has expired and nothing is in flight.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.status == SaveStatus::Unsaved && self.deadline.is_some_and(|d| now >= d)
    }

    /// Cancels the timer and enters `saving`.
    pub fn begin_flush(&mut self) {
        debug!(from = %self.status, to = %SaveStatus::Saving, "Save status changed");
        self.status = SaveStatus::Saving;
        self.deadline = None;
    }

    /// Leaves `saving` once a flush has finished.
    ///
    /// The buffer is saved only if the flush succeeded and nothing is left
    /// in the log. A timer armed by edits made during the flush survives;
    /// otherwise no retry is scheduled.
    pub fn finish_flush(&mut self, succeeded: bool, queue_empty: bool) {
        let next: SaveStatus = if succeeded && queue_empty {
            self.deadline = None;
            SaveStatus::Saved
        } else {
            SaveStatus::Unsaved
        };
        debug!(from = %self.status, to = %next, "Save status changed");
        self.status = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(1500);

    #[test]
    fn test_save_indicator_renders_pending_count() {
        let indicator: SaveIndicator = SaveIndicator {
            status: SaveStatus::Unsaved,
            pending: 3,
        };
        assert_eq!(indicator.to_string(), "unsaved (3)");

        let saving: SaveIndicator = SaveIndicator {
            status: SaveStatus::Saving,
            pending: 3,
        };
        assert_eq!(saving.to_string(), "saving");
    }

    #[test]
    fn test_first_mutation_moves_to_unsaved_and_arms_timer() {
        let now: Instant = Instant::now();
        let mut scheduler: AutoSaveScheduler = AutoSaveScheduler::new(DEBOUNCE);

        scheduler.on_mutation(now);

        assert_eq!(scheduler.status(), SaveStatus::Unsaved);
        assert_eq!(scheduler.deadline(), Some(now + DEBOUNCE));
    }

    #[test]
    fn test_burst_of_mutations_restarts_timer() {
        let start: Instant = Instant::now();
        let mut scheduler: AutoSaveScheduler = AutoSaveScheduler::new(DEBOUNCE);

        scheduler.on_mutation(start);
        scheduler.on_mutation(start + Duration::from_millis(1000));

        assert!(!scheduler.is_due(start + DEBOUNCE));
        assert!(scheduler.is_due(start + Duration::from_millis(2500)));
    }

    #[test]
    fn test_begin_flush_cancels_timer() {
        let start: Instant = Instant::now();
        let mut scheduler: AutoSaveScheduler = AutoSaveScheduler::new(DEBOUNCE);
        scheduler.on_mutation(start);

        scheduler.begin_flush();

        assert_eq!(scheduler.status(), SaveStatus::Saving);
        assert_eq!(scheduler.deadline(), None);
        assert!(!scheduler.is_due(start + DEBOUNCE * 4));
    }

    #[test]
    fn test_successful_flush_with_empty_queue_is_saved() {
        let mut scheduler: AutoSaveScheduler = AutoSaveScheduler::new(DEBOUNCE);
        scheduler.on_mutation(Instant::now());
        scheduler.begin_flush();

        scheduler.finish_flush(true, true);

        assert_eq!(scheduler.status(), SaveStatus::Saved);
    }

    #[test]
    fn test_failed_flush_is_unsaved_without_retry() {
        let start: Instant = Instant::now();
        let mut scheduler: AutoSaveScheduler = AutoSaveScheduler::new(DEBOUNCE);
        scheduler.on_mutation(start);
        scheduler.begin_flush();

        scheduler.finish_flush(false, false);

        assert_eq!(scheduler.status(), SaveStatus::Unsaved);
        assert_eq!(scheduler.deadline(), None);
        assert!(!scheduler.is_due(start + DEBOUNCE * 10));
    }

    #[test]
    fn test_mutation_during_flush_keeps_saving_and_arms_timer() {
        let start: Instant = Instant::now();
        let mut scheduler: AutoSaveScheduler = AutoSaveScheduler::new(DEBOUNCE);
        scheduler.on_mutation(start);
        scheduler.begin_flush();

        scheduler.on_mutation(start + Duration::from_millis(100));
        assert_eq!(scheduler.status(), SaveStatus::Saving);
        assert!(!scheduler.is_due(start + DEBOUNCE * 2));

        scheduler.finish_flush(true, false);
        assert_eq!(scheduler.status(), SaveStatus::Unsaved);
        assert!(scheduler.is_due(start + Duration::from_millis(1600)));
    }
}
