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

mod clock;
mod config;
mod error;
mod flush;
mod optimistic;
mod scheduler;
mod session;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{DEFAULT_DEBOUNCE_MS, EngineConfig};
pub use error::{ConfigError, SyncError};
pub use flush::{FlushExecutor, FlushOutcome, FlushPermit, FlushReport};
pub use optimistic::{assign_now, set_status_now, unassign_now};
pub use scheduler::{AutoSaveScheduler, SaveIndicator, SaveStatus};
pub use session::EditorSession;
