//! The alarm manager: one explicit context object per process.
//!
//! Owns the durable store, the wake-up scheduler, the ring controller,
//! and the effector bundle, and exposes the host-facing operation
//! surface. All operations are non-blocking; waiting for a trigger is
//! event-driven through the scheduler, never a sleep.
//!
//! The manager must live inside a tokio runtime when fades, volume
//! enforcement, or non-looping auto-stop are in play, since those run as
//! runtime tasks.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::alarm::{AlarmId, AlarmSettings};
use crate::config::RuntimeOptions;
use crate::effects::Effects;
use crate::error::{AlarmError, Result};
use crate::events::EventSink;
use crate::reconcile::{classify, ReconcileAction, ReconcileSummary};
use crate::ring::{FinishedFn, RingController, RingOutcome, RingState, StopOutcome};
use crate::scheduler::Scheduler;
use crate::store::AlarmStore;

struct WarningText {
    title: String,
    body: String,
}

pub struct AlarmManager {
    store: Arc<dyn AlarmStore>,
    scheduler: Arc<dyn Scheduler>,
    ring: RingController,
    effects: Effects,
    options: RuntimeOptions,
    warning: Mutex<WarningText>,
    weak: Weak<AlarmManager>,
}

impl AlarmManager {
    pub fn new(
        store: Arc<dyn AlarmStore>,
        scheduler: Arc<dyn Scheduler>,
        effects: Effects,
        sink: Arc<dyn EventSink>,
        options: RuntimeOptions,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let on_finished: FinishedFn = {
                let weak = weak.clone();
                Arc::new(move |id: AlarmId| {
                    if let Some(manager) = weak.upgrade() {
                        debug!(alarm_id = id, "playback finished; stopping alarm");
                        let _ = manager.stop_alarm(id);
                    }
                })
            };
            let warning = Mutex::new(WarningText {
                title: options.warning_title.clone(),
                body: options.warning_body.clone(),
            });
            Self {
                ring: RingController::new(effects.clone(), sink, options.clone(), on_finished),
                store,
                scheduler,
                effects,
                options,
                warning,
                weak: weak.clone(),
            }
        })
    }

    /// Schedule an alarm. A colliding id stops and replaces the prior
    /// registration first. A past or near-future trigger rings as soon
    /// as practicable instead of being rejected.
    ///
    /// # Errors
    /// `InvalidInput` before any state mutation; `Persistence` when the
    /// durable write fails (the alarm is then not scheduled).
    pub fn set_alarm(&self, settings: AlarmSettings) -> Result<()> {
        settings.validate()?;

        if self.ring.contains(settings.id) {
            warn!(
                alarm_id = settings.id,
                "stopping alarm with identical id before scheduling a new one"
            );
            self.scheduler.disarm(settings.id);
            self.ring.stop(settings.id);
        }

        self.store.put(&settings)?;
        self.ring.register(settings.clone());
        self.arm(settings.id, settings.date_time);
        self.refresh_warning_notification();

        info!(alarm_id = settings.id, trigger = %settings.date_time, "alarm set");
        Ok(())
    }

    /// Stop one alarm: cancel its pending trigger, stop its effects,
    /// remove its durable record. Idempotent; stopping an unknown id is
    /// a benign no-op.
    pub fn stop_alarm(&self, id: AlarmId) -> Result<()> {
        self.scheduler.disarm(id);

        match self.ring.stop(id) {
            StopOutcome::NotFound => debug!(alarm_id = id, "stop for unknown id; nothing to do"),
            outcome => debug!(alarm_id = id, ?outcome, "alarm stopped"),
        }

        // Ring state stays authoritative even when durable storage is
        // degraded, so a store failure must not fail the stop.
        if let Err(e) = self.store.remove(id) {
            warn!(alarm_id = id, error = %e, "failed to remove stored record");
        }

        self.refresh_warning_notification();
        Ok(())
    }

    /// Stop every live or stored alarm.
    pub fn stop_all(&self) -> Result<()> {
        let mut ids: BTreeSet<AlarmId> = self.ring.ids().into_iter().collect();
        match self.store.list() {
            Ok(records) => ids.extend(records.iter().map(|r| r.id)),
            Err(e) => warn!(error = %e, "could not list stored alarms; stopping live ones"),
        }

        info!(count = ids.len(), "stopping all alarms");
        for id in ids {
            self.stop_alarm(id)?;
        }
        Ok(())
    }

    /// Whether `id` is ringing, or whether any alarm rings when `id` is
    /// omitted. Pure query.
    pub fn is_ringing(&self, id: Option<AlarmId>) -> bool {
        self.ring.is_ringing(id)
    }

    /// Runtime state of one live alarm, `None` when it is not live.
    pub fn alarm_state(&self, id: AlarmId) -> Option<RingState> {
        self.ring.state(id)
    }

    /// The stored alarm set.
    ///
    /// # Errors
    /// `Persistence` when the store cannot be read.
    pub fn get_alarms(&self) -> Result<Vec<AlarmSettings>> {
        Ok(self.store.list()?)
    }

    /// One stored record.
    ///
    /// # Errors
    /// `NotFound` when no record carries `id`; `Persistence` when the
    /// store cannot be read.
    pub fn get_alarm(&self, id: AlarmId) -> Result<AlarmSettings> {
        self.store
            .list()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or(AlarmError::NotFound(id))
    }

    /// Replace the warning-notification text and refresh its visibility.
    pub fn set_warning_notification_on_kill(&self, title: String, body: String) {
        {
            let mut warning = self.warning.lock().unwrap();
            warning.title = title;
            warning.body = body;
        }
        self.refresh_warning_notification();
    }

    /// Reconciliation pass: re-derive scheduler and ring state from the
    /// durable store. Run at process start, on a boot signal, and on
    /// periodic background wakes; never double-rings a ringing id.
    ///
    /// # Errors
    /// `Persistence` when the store cannot be read at all.
    pub fn check_alarms(&self) -> Result<ReconcileSummary> {
        let now = Utc::now();
        let grace = self.options.grace_window();
        let mut summary = ReconcileSummary::default();

        for record in self.store.list()? {
            if self.ring.is_ringing(Some(record.id)) {
                summary.already_ringing += 1;
                continue;
            }
            match classify(record.date_time, now, grace) {
                ReconcileAction::Rearm => {
                    if !self.ring.contains(record.id) {
                        self.ring.register(record.clone());
                    }
                    self.arm(record.id, record.date_time);
                    summary.rearmed += 1;
                }
                ReconcileAction::RingNow => {
                    debug!(alarm_id = record.id, "missed within grace window; ringing now");
                    if !self.ring.contains(record.id) {
                        self.ring.register(record.clone());
                    }
                    self.scheduler.disarm(record.id);
                    self.handle_trigger(record.id);
                    summary.rung += 1;
                }
                ReconcileAction::Drop => {
                    debug!(alarm_id = record.id, trigger = %record.date_time, "stale record abandoned");
                    self.scheduler.disarm(record.id);
                    self.ring.discard(record.id);
                    if let Err(e) = self.store.remove(record.id) {
                        warn!(alarm_id = record.id, error = %e, "failed to drop stale record");
                    }
                    summary.dropped += 1;
                }
            }
        }

        self.refresh_warning_notification();
        info!(
            rearmed = summary.rearmed,
            rung = summary.rung,
            dropped = summary.dropped,
            "reconciliation pass complete"
        );
        Ok(summary)
    }

    fn arm(&self, id: AlarmId, instant: DateTime<Utc>) {
        let weak = self.weak.clone();
        self.scheduler.arm(
            id,
            instant,
            Box::new(move || {
                if let Some(manager) = weak.upgrade() {
                    manager.handle_trigger(id);
                }
            }),
        );
    }

    fn handle_trigger(&self, id: AlarmId) {
        match self.ring.ring(id) {
            RingOutcome::Rang => self.refresh_warning_notification(),
            RingOutcome::SuppressedByOverlap => {
                // First ringer wins; the late arrival is fully stopped.
                let _ = self.stop_alarm(id);
            }
            RingOutcome::AlreadyRinging => {
                debug!(alarm_id = id, "trigger for already-ringing alarm ignored")
            }
            RingOutcome::Unknown => {
                // Late callback after disarm or stop.
                debug!(alarm_id = id, "trigger for unknown alarm ignored")
            }
        }
    }

    /// Show the kill warning while any stored, not-yet-ringing alarm
    /// wants it; clear it otherwise.
    fn refresh_warning_notification(&self) {
        let stored = match self.store.list() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "could not read store for warning refresh");
                return;
            }
        };
        let needed = stored
            .iter()
            .any(|a| a.warning_notification_on_kill && !self.ring.is_ringing(Some(a.id)));

        if needed {
            let warning = self.warning.lock().unwrap();
            self.effects
                .notification
                .show_kill_warning(&warning.title, &warning.body);
        } else {
            self.effects.notification.clear_kill_warning();
        }
    }
}

impl std::fmt::Debug for AlarmManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AlarmManager { .. }")
    }
}
