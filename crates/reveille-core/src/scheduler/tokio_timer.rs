//! Tokio-backed scheduler: one sleep-until task per armed id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{FireFn, Scheduler};
use crate::alarm::AlarmId;

struct Armed {
    generation: u64,
    handle: tokio::task::JoinHandle<()>,
}

/// Scheduler running on the host's tokio runtime. Must be used from
/// within a runtime; the firing callback runs on a runtime worker.
pub struct TokioScheduler {
    armed: Arc<Mutex<HashMap<AlarmId, Armed>>>,
    next_generation: Mutex<u64>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            armed: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Mutex::new(0),
        }
    }

    /// Ids with a pending registration.
    pub fn armed_ids(&self) -> Vec<AlarmId> {
        self.armed.lock().unwrap().keys().copied().collect()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&self, id: AlarmId, instant: DateTime<Utc>, on_fire: FireFn) {
        let delay = (instant - Utc::now()).to_std().unwrap_or(Duration::ZERO);

        let generation = {
            let mut next = self.next_generation.lock().unwrap();
            *next += 1;
            *next
        };

        let armed = Arc::clone(&self.armed);
        // Hold the map lock across spawn and insert so a zero-delay task
        // cannot observe the map before its own registration lands.
        let mut map = self.armed.lock().unwrap();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Drop our own registration, but only if it has not been
            // replaced while we slept.
            {
                let mut map = armed.lock().unwrap();
                match map.get(&id) {
                    Some(entry) if entry.generation == generation => {
                        map.remove(&id);
                    }
                    _ => {}
                }
            }
            on_fire();
        });

        debug!(alarm_id = id, %instant, delay_ms = delay.as_millis() as u64, "armed trigger");

        if let Some(previous) = map.insert(id, Armed { generation, handle }) {
            debug!(alarm_id = id, "replaced prior registration");
            previous.handle.abort();
        }
    }

    fn disarm(&self, id: AlarmId) {
        if let Some(armed) = self.armed.lock().unwrap().remove(&id) {
            debug!(alarm_id = id, "disarmed trigger");
            armed.handle.abort();
        }
    }
}
