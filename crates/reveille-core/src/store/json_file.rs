//! File-backed store: one JSON array of alarm records.
//!
//! Matches the wire format hosts exchange alarm records in, so the file is
//! directly inspectable. Every mutation rewrites the file; each call is
//! atomic with respect to itself via the internal lock, not with respect
//! to other processes.

use std::path::PathBuf;
use std::sync::Mutex;

use super::{data_dir, AlarmStore};
use crate::alarm::{AlarmId, AlarmSettings};
use crate::error::StoreError;

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at the default location, `<data dir>/alarms.json`.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::with_path(data_dir()?.join("alarms.json")))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<AlarmSettings>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, alarms: &[AlarmSettings]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(alarms)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl AlarmStore for JsonFileStore {
    fn put(&self, settings: &AlarmSettings) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut alarms = self.read_all()?;
        alarms.retain(|a| a.id != settings.id);
        alarms.push(settings.clone());
        self.write_all(&alarms)
    }

    fn remove(&self, id: AlarmId) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut alarms = self.read_all()?;
        let before = alarms.len();
        alarms.retain(|a| a.id != id);
        if alarms.len() == before {
            return Ok(());
        }
        self.write_all(&alarms)
    }

    fn list(&self) -> Result<Vec<AlarmSettings>, StoreError> {
        let _guard = self.lock.lock().unwrap();
        self.read_all()
    }
}
