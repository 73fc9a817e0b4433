// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::ConfigError;
use crewsync::ApplyOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default quiescence window before an automatic flush.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1500;

/// Editor session settings.
///
/// Every field is optional in the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiescence window in milliseconds.
    pub debounce: u64,
    /// Remove a slot together with its last binding.
    pub remove_empty_slots: bool,
    /// Flush pending edits when the session is closed.
    pub flush_on_teardown: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE_MS,
            remove_empty_slots: false,
            flush_on_teardown: true,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the debounce window is zero.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.debounce == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        Ok(config)
    }

    /// Returns the debounce window.
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce)
    }

    /// Returns the switches the edit reducer needs.
    #[must_use]
    pub const fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            remove_empty_slots: self.remove_empty_slots,
        }
    }
}
