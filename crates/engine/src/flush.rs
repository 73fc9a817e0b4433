// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Flush executor.
//!
//! A flush drains the operation log and sends the batch to the remote
//! store one call at a time, in enqueue order. A create is reconciled as
//! soon as its response arrives, before the next operation is looked at,
//! so later operations in the batch carry the real identifier by the time
//! they are dispatched.
//!
//! The buffer lock is only held between remote calls. Edits made while a
//! call is outstanding land in the log behind the batch.

use crate::error::SyncError;
use crewsync::{EditBuffer, PendingOperation};
use crewsync_domain::{Identifier, RealId, SlotId, TempId};
use crewsync_remote::{RemoteError, RemoteStore};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Counters describing one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Operations drained from the log.
    pub drained: usize,
    /// Remote calls that succeeded.
    pub calls: usize,
    /// Operations dropped because a later delete in the batch cancelled them.
    pub elided: usize,
    /// Operations or delete targets skipped because they still named a
    /// temp identifier.
    pub skipped: usize,
    /// Operations answered with "not found" for an entity the mirror no
    /// longer shows either; the state they asked for already held.
    pub settled: usize,
    /// Operations put back at the front of the log after a failure.
    pub requeued: usize,
}

/// The result of a flush request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Another flush was already running; nothing was done.
    Skipped,
    /// The log was empty.
    Empty,
    /// Every drained operation was sent or elided.
    Completed(FlushReport),
    /// A remote call failed; the rest of the batch was requeued.
    Failed {
        /// What happened before the failure.
        report: FlushReport,
        /// The failure.
        error: SyncError,
    },
}

impl FlushOutcome {
    /// Returns the report, if the flush ran.
    #[must_use]
    pub const fn report(&self) -> Option<&FlushReport> {
        match self {
            Self::Completed(report) | Self::Failed { report, .. } => Some(report),
            Self::Skipped | Self::Empty => None,
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&SyncError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Skipped | Self::Empty | Self::Completed(_) => None,
        }
    }

    /// Returns true unless a remote call failed.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Guards against overlapping flushes.
#[derive(Debug, Default)]
pub struct FlushExecutor {
    in_flight: AtomicBool,
    idle: Notify,
}

/// Proof that the caller owns the only running flush.
///
/// Dropping the permit lets the next flush start and wakes everything
/// waiting in [`FlushExecutor::wait_idle`].
#[derive(Debug)]
pub struct FlushPermit<'a> {
    executor: &'a FlushExecutor,
}

impl Drop for FlushPermit<'_> {
    fn drop(&mut self) {
        self.executor.in_flight.store(false, Ordering::Release);
        self.executor.idle.notify_waiters();
    }
}

impl FlushExecutor {
    /// Creates an idle executor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a flush is running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the executor, or returns `None` if a flush is already running.
    #[must_use]
    pub fn try_begin(&self) -> Option<FlushPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlushPermit { executor: self })
    }

    /// Returns once no flush is running.
    pub async fn wait_idle(&self) {
        let notified = self.idle.notified();
        tokio::pin!(notified);
        // Register before checking so a permit dropped in between still wakes us.
        notified.as_mut().enable();
        if !self.is_in_flight() {
            return;
        }
        notified.await;
    }

    /// Runs a flush unless one is already running.
    pub async fn flush<R: RemoteStore>(
        &self,
        remote: &R,
        buffer: &Mutex<EditBuffer>,
    ) -> FlushOutcome {
        let Some(permit) = self.try_begin() else {
            debug!("Flush already in progress, skipping");
            return FlushOutcome::Skipped;
        };
        permit.run(remote, buffer).await
    }
}

impl FlushPermit<'_> {
    /// Drains the log and sends the batch.
    ///
    /// The executor stays claimed until the permit is dropped, so callers
    /// can finish their own bookkeeping first.
    pub async fn run<R: RemoteStore>(
        &self,
        remote: &R,
        buffer: &Mutex<EditBuffer>,
    ) -> FlushOutcome {
        let drained: Vec<PendingOperation> = buffer.lock().log.drain();
        if drained.is_empty() {
            debug!("Nothing to flush");
            return FlushOutcome::Empty;
        }

        let mut report: FlushReport = FlushReport {
            drained: drained.len(),
            ..FlushReport::default()
        };
        let mut pending: VecDeque<PendingOperation> = elide_ghosts(drained, &mut report);
        info!(
            drained = report.drained,
            batch = pending.len(),
            elided = report.elided,
            "Flushing pending operations"
        );

        while let Some(op) = pending.pop_front() {
            debug!(op = op.name(), remaining = pending.len(), "Dispatching operation");
            if let Err(Failure { remainder, error }) =
                dispatch(remote, buffer, &op, &mut pending, &mut report).await
            {
                let mut requeue: Vec<PendingOperation> = Vec::with_capacity(pending.len() + 1);
                requeue.push(remainder);
                requeue.extend(pending);
                report.requeued = requeue.len();
                buffer.lock().log.requeue_front(requeue);
                warn!(
                    op = op.name(),
                    calls = report.calls,
                    requeued = report.requeued,
                    error = %error,
                    "Flush failed"
                );
                return FlushOutcome::Failed { report, error };
            }
        }

        info!(
            calls = report.calls,
            elided = report.elided,
            skipped = report.skipped,
            settled = report.settled,
            "Flush completed"
        );
        FlushOutcome::Completed(report)
    }
}

/// A failed dispatch: what is left of the failing operation, and why.
struct Failure {
    remainder: PendingOperation,
    error: SyncError,
}

impl Failure {
    fn new(remainder: PendingOperation, operation: &'static str, err: RemoteError) -> Self {
        Self {
            remainder,
            error: SyncError::from_remote(operation, err),
        }
    }
}

/// Drops creates that a later delete in the same batch cancels.
///
/// A slot created and deleted within one batch never needs to exist
/// remotely, and neither do bindings created under it. Every operation
/// naming such an entity is dropped; delete lists lose the ghost entries.
fn elide_ghosts(
    batch: Vec<PendingOperation>,
    report: &mut FlushReport,
) -> VecDeque<PendingOperation> {
    let created: HashSet<TempId> = batch.iter().filter_map(PendingOperation::creates).collect();
    let mut ghosts: HashSet<TempId> = batch
        .iter()
        .filter(|op| op.is_delete())
        .flat_map(PendingOperation::temp_dependencies)
        .filter(|temp| created.contains(temp))
        .collect();
    if ghosts.is_empty() {
        return batch.into();
    }

    for op in &batch {
        if let PendingOperation::CreateBinding { binding, slot, .. } = op
            && slot.as_temp().is_some_and(|temp| ghosts.contains(&temp))
        {
            ghosts.insert(*binding);
        }
    }

    let is_ghost = |id: &Identifier| id.as_temp().is_some_and(|temp| ghosts.contains(&temp));
    let mut kept: VecDeque<PendingOperation> = VecDeque::with_capacity(batch.len());
    for op in batch {
        match op {
            PendingOperation::DeleteSlot { slots } => {
                let remaining: Vec<SlotId> =
                    slots.iter().copied().filter(|id| !is_ghost(id)).collect();
                report.elided += usize::from(remaining.len() < slots.len());
                if !remaining.is_empty() {
                    kept.push_back(PendingOperation::DeleteSlot { slots: remaining });
                }
            }
            op => {
                let named_ghost: bool = op.creates().is_some_and(|temp| ghosts.contains(&temp))
                    || op.temp_dependencies().iter().any(|temp| ghosts.contains(temp));
                if named_ghost {
                    debug!(op = op.name(), "Eliding operation cancelled within batch");
                    report.elided += 1;
                } else {
                    kept.push_back(op);
                }
            }
        }
    }
    kept
}

/// Sends one operation.
///
/// `rest` is the not-yet-dispatched tail of the batch; a successful create
/// rewrites its temp identifier there too.
async fn dispatch<R: RemoteStore>(
    remote: &R,
    buffer: &Mutex<EditBuffer>,
    op: &PendingOperation,
    rest: &mut VecDeque<PendingOperation>,
    report: &mut FlushReport,
) -> Result<(), Failure> {
    match op {
        PendingOperation::CreateSlot {
            subject,
            slot,
            role_label,
            role_type,
        } => {
            let real: RealId = remote
                .create_slot(*subject, role_label.clone(), role_type.clone())
                .await
                .map_err(|err| Failure::new(op.clone(), "create slot", err))?;
            report.calls += 1;
            reconcile(buffer, *slot, real, rest, report);
        }
        PendingOperation::CreateBinding {
            binding,
            slot,
            actor,
        } => {
            let Identifier::Real(slot_real) = *slot else {
                stale(op.name(), *slot, report);
                return Ok(());
            };
            let real: RealId = remote
                .create_binding(slot_real, *actor)
                .await
                .map_err(|err| Failure::new(op.clone(), "create binding", err))?;
            report.calls += 1;
            reconcile(buffer, *binding, real, rest, report);
        }
        PendingOperation::DeleteSlot { slots } => {
            for (position, id) in slots.iter().enumerate() {
                let Identifier::Real(real) = *id else {
                    stale(op.name(), *id, report);
                    continue;
                };
                match remote.delete_slot(real).await {
                    Ok(()) => report.calls += 1,
                    Err(err) if already_gone(buffer, *id, &err) => settled(op.name(), *id, report),
                    Err(err) => {
                        let remainder: PendingOperation = PendingOperation::DeleteSlot {
                            slots: slots[position..].to_vec(),
                        };
                        return Err(Failure::new(remainder, "delete slot", err));
                    }
                }
            }
        }
        PendingOperation::DeleteBinding { binding } => {
            let Identifier::Real(real) = *binding else {
                stale(op.name(), *binding, report);
                return Ok(());
            };
            match remote.delete_binding(real).await {
                Ok(()) => report.calls += 1,
                Err(err) if already_gone(buffer, *binding, &err) => {
                    settled(op.name(), *binding, report);
                }
                Err(err) => return Err(Failure::new(op.clone(), "delete binding", err)),
            }
        }
        PendingOperation::UpdateBindingStatus { binding, status } => {
            let Identifier::Real(real) = *binding else {
                stale(op.name(), *binding, report);
                return Ok(());
            };
            match remote.update_binding(real, *status).await {
                Ok(()) => report.calls += 1,
                Err(err) if already_gone(buffer, *binding, &err) => {
                    settled(op.name(), *binding, report);
                }
                Err(err) => return Err(Failure::new(op.clone(), "update binding", err)),
            }
        }
    }
    Ok(())
}

/// Returns true if `err` says the entity is missing remotely and the mirror
/// no longer shows it. Such an operation has nothing left to do: it was
/// removed by another path, such as an immediate unassign.
fn already_gone(buffer: &Mutex<EditBuffer>, id: Identifier, err: &RemoteError) -> bool {
    matches!(err, RemoteError::NotFound { .. }) && !buffer.lock().store.contains(&id)
}

fn settled(op: &'static str, id: Identifier, report: &mut FlushReport) {
    debug!(op, %id, "Entity already gone remotely, nothing to send");
    report.settled += 1;
}

fn stale(op: &'static str, id: Identifier, report: &mut FlushReport) {
    let error: SyncError = SyncError::ReferentialStaleness { id };
    warn!(op, %error, "Skipping operation");
    report.skipped += 1;
}

/// Reconciles a freshly created entity in the buffer and in the batch tail.
///
/// If the entity was removed locally while its create was in flight, the
/// tail keeps only the deletes naming it, as reconciliation does for the log.
fn reconcile(
    buffer: &Mutex<EditBuffer>,
    temp: TempId,
    real: RealId,
    rest: &mut VecDeque<PendingOperation>,
    report: &mut FlushReport,
) {
    let gone: bool = {
        let mut guard = buffer.lock();
        match guard.reconcile(temp, real) {
            Ok(reconciled) => debug!(
                %temp,
                %real,
                store = reconciled.store_rewrites,
                log = reconciled.log_rewrites,
                dropped = reconciled.dropped,
                "Reconciled identifier"
            ),
            Err(err) => warn!(%temp, %real, error = %err, "Reconciliation refused"),
        }
        !guard.store.contains(&Identifier::Real(real))
    };

    if gone {
        let id: Identifier = Identifier::Temp(temp);
        let before: usize = rest.len();
        rest.retain(|op| op.is_delete() || !op.references(&id));
        report.elided += before - rest.len();
    }
    for op in rest.iter_mut() {
        op.reconcile(temp, real);
    }
}
