//! In-memory store for tests and hosts that manage their own durability.

use std::collections::HashMap;
use std::sync::Mutex;

use super::AlarmStore;
use crate::alarm::{AlarmId, AlarmSettings};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    alarms: Mutex<HashMap<AlarmId, AlarmSettings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlarmStore for MemoryStore {
    fn put(&self, settings: &AlarmSettings) -> Result<(), StoreError> {
        self.alarms
            .lock()
            .unwrap()
            .insert(settings.id, settings.clone());
        Ok(())
    }

    fn remove(&self, id: AlarmId) -> Result<(), StoreError> {
        self.alarms.lock().unwrap().remove(&id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<AlarmSettings>, StoreError> {
        Ok(self.alarms.lock().unwrap().values().cloned().collect())
    }
}
