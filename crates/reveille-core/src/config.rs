//! Host-tunable runtime options.
//!
//! The behavior knobs the reference platforms hard-code divergently
//! (grace window, cancellation notices, timer cadences) live here as one
//! canonical configuration, serialized to TOML at
//! `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::StoreError;
use crate::store::data_dir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeOptions {
    /// How long after a missed trigger a late fire is still honored.
    /// Records staler than this are abandoned silently.
    #[serde(default = "default_grace_window_secs")]
    pub grace_window_secs: u64,
    /// Emit a `stopped` event when a never-rang alarm is cancelled.
    /// Off by default: only alarms that actually rang notify the host.
    #[serde(default)]
    pub notify_cancelled: bool,
    /// Cadence of the corrective volume check while `volumeEnforced`.
    #[serde(default = "default_enforcement_interval_ms")]
    pub enforcement_interval_ms: u64,
    /// Sampling cadence of the fade ramp.
    #[serde(default = "default_fade_tick_ms")]
    pub fade_tick_ms: u64,
    /// Warning notification shown while alarms need the host alive.
    #[serde(default = "default_warning_title")]
    pub warning_title: String,
    #[serde(default = "default_warning_body")]
    pub warning_body: String,
}

fn default_grace_window_secs() -> u64 {
    60
}
fn default_enforcement_interval_ms() -> u64 {
    1000
}
fn default_fade_tick_ms() -> u64 {
    50
}
fn default_warning_title() -> String {
    "Your alarms may not ring".into()
}
fn default_warning_body() -> String {
    "You killed the app. Please reopen so your alarms can be rescheduled.".into()
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            grace_window_secs: default_grace_window_secs(),
            notify_cancelled: false,
            enforcement_interval_ms: default_enforcement_interval_ms(),
            fade_tick_ms: default_fade_tick_ms(),
            warning_title: default_warning_title(),
            warning_body: default_warning_body(),
        }
    }
}

impl RuntimeOptions {
    pub fn grace_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.grace_window_secs as i64)
    }

    pub fn enforcement_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.enforcement_interval_ms)
    }

    pub fn fade_tick(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.fade_tick_ms.max(1))
    }

    pub fn path() -> Result<PathBuf, StoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load() -> Result<Self, StoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| StoreError::DataDir(format!("bad config {}: {e}", path.display()))),
            Err(_) => {
                let options = Self::default();
                options.save()?;
                Ok(options)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StoreError::DataDir(format!("serialize config: {e}")))?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
