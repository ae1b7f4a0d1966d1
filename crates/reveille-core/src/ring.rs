//! The ring controller: runtime state machine for "is alarm X ringing".
//!
//! Per id the states are `Scheduled -> Ringing -> (gone)`, with
//! `Scheduled -> (gone)` on cancellation. All check-then-act sequences
//! (notably the overlap policy) run under one lock, so two triggers
//! landing at the same instant cannot both win. Fade and enforcement
//! timers carry an `alive` flag that is cleared under the same lock
//! before their tasks are aborted; a timer callback that lost the race
//! observes the flag and does nothing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::alarm::{AlarmId, AlarmSettings, FadePlan};
use crate::config::RuntimeOptions;
use crate::effects::Effects;
use crate::events::{AlarmEvent, EventSink};

/// Runtime state of one live alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    Scheduled,
    Ringing,
}

/// Invoked when a non-looping alarm's playback runs out; wired by the
/// manager to a full stop.
pub(crate) type FinishedFn = Arc<dyn Fn(AlarmId) + Send + Sync>;

struct ActiveAlarm {
    settings: AlarmSettings,
    state: RingState,
    /// Cleared on stop, before timer tasks are aborted.
    alive: Arc<AtomicBool>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

/// Captured system volume, restored when the last holder stops.
struct VolumeRestore {
    previous: f64,
    holders: HashSet<AlarmId>,
}

#[derive(Default)]
struct RingInner {
    alarms: HashMap<AlarmId, ActiveAlarm>,
    volume_restore: Option<VolumeRestore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RingOutcome {
    Rang,
    /// Another alarm was already ringing and this record does not allow
    /// overlap; the caller must stop this alarm (first ringer wins).
    SuppressedByOverlap,
    AlreadyRinging,
    /// No live registration: a late trigger after disarm or stop.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StopOutcome {
    WasRinging,
    WasScheduled,
    NotFound,
}

pub(crate) struct RingController {
    effects: Effects,
    sink: Arc<dyn EventSink>,
    options: RuntimeOptions,
    on_finished: FinishedFn,
    inner: Mutex<RingInner>,
}

impl RingController {
    pub(crate) fn new(
        effects: Effects,
        sink: Arc<dyn EventSink>,
        options: RuntimeOptions,
        on_finished: FinishedFn,
    ) -> Self {
        Self {
            effects,
            sink,
            options,
            on_finished,
            inner: Mutex::new(RingInner::default()),
        }
    }

    /// Track a freshly scheduled alarm. The caller stops any colliding
    /// registration first.
    pub(crate) fn register(&self, settings: AlarmSettings) {
        let mut inner = self.inner.lock().unwrap();
        inner.alarms.insert(
            settings.id,
            ActiveAlarm {
                settings,
                state: RingState::Scheduled,
                alive: Arc::new(AtomicBool::new(true)),
                tasks: Vec::new(),
            },
        );
    }

    pub(crate) fn contains(&self, id: AlarmId) -> bool {
        self.inner.lock().unwrap().alarms.contains_key(&id)
    }

    pub(crate) fn state(&self, id: AlarmId) -> Option<RingState> {
        self.inner.lock().unwrap().alarms.get(&id).map(|a| a.state)
    }

    pub(crate) fn is_ringing(&self, id: Option<AlarmId>) -> bool {
        let inner = self.inner.lock().unwrap();
        match id {
            Some(id) => inner
                .alarms
                .get(&id)
                .map(|a| a.state == RingState::Ringing)
                .unwrap_or(false),
            None => inner.alarms.values().any(|a| a.state == RingState::Ringing),
        }
    }

    /// All live ids, sorted for deterministic iteration.
    pub(crate) fn ids(&self) -> Vec<AlarmId> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<AlarmId> = inner.alarms.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Transition `id` to `Ringing` and start its effects.
    ///
    /// Effector failures degrade: the failed effect is skipped, the state
    /// transition and the `rang` event still happen.
    pub(crate) fn ring(&self, id: AlarmId) -> RingOutcome {
        let mut inner = self.inner.lock().unwrap();

        let (settings, alive) = match inner.alarms.get(&id) {
            None => return RingOutcome::Unknown,
            Some(entry) if entry.state == RingState::Ringing => {
                return RingOutcome::AlreadyRinging
            }
            Some(entry) => (entry.settings.clone(), Arc::clone(&entry.alive)),
        };

        if !settings.allow_alarm_overlap
            && inner
                .alarms
                .iter()
                .any(|(other, a)| *other != id && a.state == RingState::Ringing)
        {
            debug!(alarm_id = id, "another alarm is ringing; suppressing late arrival");
            return RingOutcome::SuppressedByOverlap;
        }

        if let Some(entry) = inner.alarms.get_mut(&id) {
            entry.state = RingState::Ringing;
        }

        if let Err(e) = self
            .effects
            .notification
            .show_alarm(id, &settings.notification_settings)
        {
            warn!(alarm_id = id, error = %e, "notification unavailable; ringing without it");
        }

        if let Some(target) = settings.volume_settings.volume {
            match inner.volume_restore.as_mut() {
                Some(restore) => {
                    restore.holders.insert(id);
                }
                None => {
                    let previous = self.effects.system_volume.current();
                    let mut holders = HashSet::new();
                    holders.insert(id);
                    inner.volume_restore = Some(VolumeRestore { previous, holders });
                }
            }
            self.effects.system_volume.set(target);
        }

        let playback = match self.effects.audio.play(
            id,
            &settings.asset_audio_path,
            settings.loop_audio,
        ) {
            Ok(playback) => Some(playback),
            Err(e) => {
                warn!(alarm_id = id, error = %e, "audio unavailable; ringing without sound");
                None
            }
        };

        let mut tasks = Vec::new();

        if playback.is_some() {
            match FadePlan::from_settings(&settings.volume_settings) {
                Some(plan) => {
                    self.effects.audio.set_volume(id, plan.volume_at(Duration::ZERO));
                    tasks.push(self.spawn_fade(id, plan, Arc::clone(&alive)));
                }
                None => self.effects.audio.set_volume(id, 1.0),
            }
        }

        if settings.volume_settings.volume_enforced {
            let target = settings
                .volume_settings
                .volume
                .unwrap_or_else(|| self.effects.system_volume.current());
            tasks.push(self.spawn_enforcement(id, target, Arc::clone(&alive)));
        }

        if settings.vibrate {
            if let Err(e) = self.effects.vibration.start() {
                warn!(alarm_id = id, error = %e, "vibration unavailable");
            }
        }

        if !settings.loop_audio {
            if let Some(duration) = playback.and_then(|p| p.duration) {
                tasks.push(self.spawn_completion(id, duration, Arc::clone(&alive)));
            }
        }

        if let Some(entry) = inner.alarms.get_mut(&id) {
            entry.tasks = tasks;
        }

        debug!(alarm_id = id, "ringing");
        // Emitted under the lock so a racing stop cannot publish its
        // `stopped` ahead of this `rang`.
        self.sink
            .emit(AlarmEvent::rang(id, settings.payload.clone()));
        RingOutcome::Rang
    }

    /// Remove `id` and stop its effects. Idempotent: stopping an absent
    /// id reports `NotFound` and changes nothing.
    ///
    /// Emits `stopped` when the alarm had rung; a never-rang cancellation
    /// notifies only when `notify_cancelled` is configured.
    pub(crate) fn stop(&self, id: AlarmId) -> StopOutcome {
        let mut inner = self.inner.lock().unwrap();

        let entry = match inner.alarms.remove(&id) {
            None => return StopOutcome::NotFound,
            Some(entry) => entry,
        };

        entry.alive.store(false, Ordering::SeqCst);
        for task in &entry.tasks {
            task.abort();
        }

        let was_ringing = entry.state == RingState::Ringing;

        self.effects.notification.cancel(id);
        if was_ringing {
            self.effects.audio.stop(id);
        }

        self.release_volume(&mut inner, id);

        let still_vibrating = inner
            .alarms
            .values()
            .any(|a| a.state == RingState::Ringing && a.settings.vibrate);
        if !still_vibrating {
            self.effects.vibration.stop();
        }

        if was_ringing || self.options.notify_cancelled {
            self.sink
                .emit(AlarmEvent::stopped(id, entry.settings.payload.clone()));
        }

        drop(inner);

        debug!(alarm_id = id, was_ringing, "stopped");
        if was_ringing {
            StopOutcome::WasRinging
        } else {
            StopOutcome::WasScheduled
        }
    }

    /// Drop a `Scheduled` registration without effects or events; used
    /// when reconciliation abandons a stale record. A `Ringing` id is
    /// left alone.
    pub(crate) fn discard(&self, id: AlarmId) {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .alarms
            .get(&id)
            .map(|a| a.state == RingState::Scheduled)
            .unwrap_or(false)
        {
            inner.alarms.remove(&id);
        }
    }

    fn release_volume(&self, inner: &mut RingInner, id: AlarmId) {
        let last_holder_gone = match inner.volume_restore.as_mut() {
            Some(restore) => {
                restore.holders.remove(&id);
                restore.holders.is_empty()
            }
            None => false,
        };
        if last_holder_gone {
            if let Some(restore) = inner.volume_restore.take() {
                debug!(volume = restore.previous, "restoring system volume");
                self.effects.system_volume.set(restore.previous);
            }
        }
    }

    fn spawn_fade(
        &self,
        id: AlarmId,
        plan: FadePlan,
        alive: Arc<AtomicBool>,
    ) -> tokio::task::JoinHandle<()> {
        let audio = Arc::clone(&self.effects.audio);
        let tick = self.options.fade_tick();
        let total = plan.total();
        tokio::spawn(async move {
            let start = tokio::time::Instant::now();
            loop {
                tokio::time::sleep(tick).await;
                if !alive.load(Ordering::SeqCst) {
                    break;
                }
                let elapsed = start.elapsed();
                audio.set_volume(id, plan.volume_at(elapsed));
                if elapsed >= total {
                    break;
                }
            }
        })
    }

    fn spawn_enforcement(
        &self,
        id: AlarmId,
        target: f64,
        alive: Arc<AtomicBool>,
    ) -> tokio::task::JoinHandle<()> {
        let system_volume = Arc::clone(&self.effects.system_volume);
        let interval = self.options.enforcement_interval();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if !alive.load(Ordering::SeqCst) {
                    break;
                }
                let current = system_volume.current();
                if (current - target).abs() > 0.01 {
                    debug!(alarm_id = id, current, target, "system volume drifted; re-applying");
                    system_volume.set(target);
                }
            }
        })
    }

    fn spawn_completion(
        &self,
        id: AlarmId,
        duration: Duration,
        alive: Arc<AtomicBool>,
    ) -> tokio::task::JoinHandle<()> {
        let on_finished = Arc::clone(&self.on_finished);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if alive.load(Ordering::SeqCst) {
                on_finished(id);
            }
        })
    }
}
