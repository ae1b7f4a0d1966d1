//! Durable alarm storage.
//!
//! The store is the source of truth that survives process restarts; the
//! scheduler's registrations are volatile and may be lost on kill or
//! reboot. The reconciliation pass repairs the difference, so every write
//! here must be immediately durable.

mod json_file;
mod memory;

use std::path::PathBuf;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::alarm::{AlarmId, AlarmSettings};
use crate::error::StoreError;

/// Durable mapping from alarm id to settings.
pub trait AlarmStore: Send + Sync {
    /// Insert or replace by id.
    fn put(&self, settings: &AlarmSettings) -> Result<(), StoreError>;

    /// Delete if present; absent ids are a no-op.
    fn remove(&self, id: AlarmId) -> Result<(), StoreError>;

    /// The full current set, unordered.
    fn list(&self) -> Result<Vec<AlarmSettings>, StoreError>;
}

/// Per-user data directory, `~/.config/reveille[-dev]/`.
///
/// Set `REVEILLE_ENV=dev` for the development directory, or
/// `REVEILLE_DATA_DIR` to point somewhere else entirely (tests, sandboxes).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = match std::env::var("REVEILLE_DATA_DIR") {
        Ok(explicit) => PathBuf::from(explicit),
        Err(_) => {
            let base = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            match std::env::var("REVEILLE_ENV").as_deref() {
                Ok("dev") => base.join("reveille-dev"),
                _ => base.join("reveille"),
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
