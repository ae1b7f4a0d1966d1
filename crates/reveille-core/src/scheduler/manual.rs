//! Deterministic scheduler for tests: registrations fire only when the
//! test says so.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{FireFn, Scheduler};
use crate::alarm::AlarmId;

#[derive(Default)]
pub struct ManualScheduler {
    armed: Mutex<HashMap<AlarmId, (DateTime<Utc>, FireFn)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the registration for `id` now. Returns false when nothing
    /// was armed for it.
    pub fn fire(&self, id: AlarmId) -> bool {
        let entry = self.armed.lock().unwrap().remove(&id);
        match entry {
            Some((_, on_fire)) => {
                on_fire();
                true
            }
            None => false,
        }
    }

    pub fn armed_ids(&self) -> Vec<AlarmId> {
        let mut ids: Vec<AlarmId> = self.armed.lock().unwrap().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn trigger_time(&self, id: AlarmId) -> Option<DateTime<Utc>> {
        self.armed.lock().unwrap().get(&id).map(|(at, _)| *at)
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&self, id: AlarmId, instant: DateTime<Utc>, on_fire: FireFn) {
        self.armed.lock().unwrap().insert(id, (instant, on_fire));
    }

    fn disarm(&self, id: AlarmId) {
        self.armed.lock().unwrap().remove(&id);
    }
}
