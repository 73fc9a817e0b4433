// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::clock::{Clock, TokioClock};
use crate::config::EngineConfig;
use crate::error::SyncError;
use crate::flush::{FlushExecutor, FlushOutcome, FlushPermit};
use crate::optimistic;
use crate::scheduler::{AutoSaveScheduler, SaveIndicator, SaveStatus};
use crewsync::{Edit, EditBuffer, EditResult, MirrorStore, PendingOperation, apply};
use crewsync_domain::{ActorId, BindingId, BindingStatus, SlotId, Subject, SubjectId};
use crewsync_remote::{RemoteStore, SubjectRecord};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One user's editing session over a set of subjects.
///
/// Owns the mirror, the operation log and the auto-save scheduler. All
/// methods take `&self`; the buffer is locked only for synchronous work,
/// so edits can be made while a flush or an immediate call is awaiting
/// the remote store.
#[derive(Debug)]
pub struct EditorSession<R: RemoteStore, C: Clock = TokioClock> {
    remote: R,
    clock: C,
    config: EngineConfig,
    buffer: Mutex<EditBuffer>,
    scheduler: Mutex<AutoSaveScheduler>,
    executor: FlushExecutor,
}

impl<R: RemoteStore, C: Clock> EditorSession<R, C> {
    /// Loads `subjects` from the remote store and opens a session over them.
    ///
    /// # Errors
    ///
    /// Returns an error if a subject cannot be fetched or is listed twice.
    pub async fn open(
        remote: R,
        subjects: &[SubjectId],
        config: EngineConfig,
        clock: C,
    ) -> Result<Self, SyncError> {
        let mut store: MirrorStore = MirrorStore::new();
        for id in subjects {
            let record: SubjectRecord = remote
                .fetch_subject(*id)
                .await
                .map_err(|err| SyncError::from_remote("fetch subject", err))?;
            store.load_subject(Subject::from(record))?;
        }
        info!(subjects = subjects.len(), "Editor session opened");
        Ok(Self::with_store(remote, store, config, clock))
    }

    /// Opens a session over an already loaded mirror.
    #[must_use]
    pub fn with_store(remote: R, store: MirrorStore, config: EngineConfig, clock: C) -> Self {
        Self {
            remote,
            clock,
            config,
            buffer: Mutex::new(EditBuffer::new(store)),
            scheduler: Mutex::new(AutoSaveScheduler::new(config.debounce_window())),
            executor: FlushExecutor::new(),
        }
    }

    /// Returns the remote store.
    #[must_use]
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Applies an edit in batched mode and restarts the debounce timer.
    ///
    /// # Errors
    ///
    /// Returns an error if the edit is invalid; nothing changes then.
    pub fn edit(&self, edit: Edit) -> Result<EditResult, SyncError> {
        let name: &'static str = edit.name();
        let result: EditResult = apply(&mut self.buffer.lock(), edit, self.config.apply_options())?;
        if result.changed {
            self.scheduler.lock().on_mutation(self.clock.now());
        }
        debug!(
            edit = name,
            enqueued = result.enqueued,
            pruned = result.pruned,
            changed = result.changed,
            "Edit applied"
        );
        Ok(result)
    }

    /// Runs `f` against the mirror.
    pub fn read<T>(&self, f: impl FnOnce(&MirrorStore) -> T) -> T {
        f(&self.buffer.lock().store)
    }

    /// Returns a copy of the mirror.
    #[must_use]
    pub fn store(&self) -> MirrorStore {
        self.buffer.lock().store.clone()
    }

    /// Returns the queued operations in order.
    #[must_use]
    pub fn pending(&self) -> Vec<PendingOperation> {
        self.buffer.lock().log.iter().cloned().collect()
    }

    /// Returns the save state.
    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.scheduler.lock().status()
    }

    /// Returns what the save indicator should show.
    #[must_use]
    pub fn indicator(&self) -> SaveIndicator {
        SaveIndicator {
            status: self.status(),
            pending: self.buffer.lock().log.len(),
        }
    }

    /// Returns when the debounce timer fires, if it is armed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.lock().deadline()
    }

    /// Cancels the debounce timer and flushes now.
    pub async fn save_now(&self) -> FlushOutcome {
        debug!("Manual save requested");
        self.flush().await
    }

    /// Flushes if the debounce timer has expired.
    ///
    /// Returns `None` if no flush was due.
    pub async fn flush_if_due(&self) -> Option<FlushOutcome> {
        let due: bool = self.scheduler.lock().is_due(self.clock.now());
        if !due {
            return None;
        }
        debug!("Debounce window elapsed");
        Some(self.flush().await)
    }

    /// Sleeps until the debounce timer fires and then flushes.
    ///
    /// Edits made while waiting push the deadline back. Returns `None`
    /// without waiting if no timer is armed.
    pub async fn run_autosave(&self) -> Option<FlushOutcome> {
        loop {
            let deadline: Instant = self.next_deadline()?;
            tokio::time::sleep_until(deadline).await;
            if let Some(outcome) = self.flush_if_due().await {
                return Some(outcome);
            }
            if self.next_deadline() == Some(deadline) {
                // A flush is running; edits made during it are due once it ends.
                self.executor.wait_idle().await;
            }
        }
    }

    async fn flush(&self) -> FlushOutcome {
        let Some(permit) = self.executor.try_begin() else {
            debug!("Flush already in progress, skipping");
            return FlushOutcome::Skipped;
        };
        self.run_flush(permit).await
    }

    async fn run_flush(&self, permit: FlushPermit<'_>) -> FlushOutcome {
        self.scheduler.lock().begin_flush();
        let outcome: FlushOutcome = permit.run(&self.remote, &self.buffer).await;
        let queue_empty: bool = self.buffer.lock().log.is_empty();
        self.scheduler
            .lock()
            .finish_flush(outcome.succeeded(), queue_empty);
        drop(permit);
        outcome
    }

    /// Binds an actor to a persisted slot right away.
    ///
    /// # Errors
    ///
    /// See [`optimistic::assign_now`].
    pub async fn assign_now(&self, slot: SlotId, actor: ActorId) -> Result<BindingId, SyncError> {
        optimistic::assign_now(&self.remote, &self.buffer, slot, actor).await
    }

    /// Changes a persisted binding's status right away.
    ///
    /// # Errors
    ///
    /// See [`optimistic::set_status_now`].
    pub async fn set_status_now(
        &self,
        binding: BindingId,
        status: BindingStatus,
    ) -> Result<(), SyncError> {
        optimistic::set_status_now(&self.remote, &self.buffer, binding, status).await
    }

    /// Removes a persisted binding right away.
    ///
    /// # Errors
    ///
    /// See [`optimistic::unassign_now`].
    pub async fn unassign_now(&self, binding: BindingId) -> Result<(), SyncError> {
        optimistic::unassign_now(&self.remote, &self.buffer, binding).await
    }

    /// Ends the session.
    ///
    /// With `flush_on_teardown` set, pending edits are flushed first and the
    /// outcome returned. Otherwise they are discarded.
    pub async fn close(self) -> Option<FlushOutcome> {
        let pending: usize = self.buffer.lock().log.len();
        let dirty: bool = pending > 0 || self.status() != SaveStatus::Saved;
        if !dirty {
            info!("Editor session closed");
            return None;
        }
        if !self.config.flush_on_teardown {
            warn!(pending, "Editor session closed with unsaved edits");
            return None;
        }
        let outcome: FlushOutcome = self.flush().await;
        if let Some(error) = outcome.error() {
            warn!(pending, %error, "Final flush failed, edits lost");
        } else {
            info!("Editor session closed");
        }
        Some(outcome)
    }
}
