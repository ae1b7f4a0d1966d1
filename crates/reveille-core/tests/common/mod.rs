//! Shared helpers for manager-level tests: recording effectors, a
//! recording event sink, and a harness wiring them to a manual scheduler.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reveille_core::{
    AlarmEvent, AlarmId, AlarmManager, AlarmSettings, AlarmStore, AudioBackend, Effects,
    EffectorError, EventSink, ManualScheduler, MemoryStore, NotificationBackend,
    NotificationSettings, Playback, RuntimeOptions, SystemVolume, TokioScheduler, VolumeSettings,
};

/// Collects every emitted event in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AlarmEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AlarmEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn rang_ids(&self) -> Vec<AlarmId> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                AlarmEvent::Rang { alarm_id, .. } => Some(*alarm_id),
                _ => None,
            })
            .collect()
    }

    pub fn stopped_ids(&self) -> Vec<AlarmId> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                AlarmEvent::Stopped { alarm_id, .. } => Some(*alarm_id),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: AlarmEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Records play/stop/volume calls; optionally fails every `play`.
#[derive(Default)]
pub struct RecordingAudio {
    pub fail_play: bool,
    pub track_duration: Option<Duration>,
    playing: Mutex<HashMap<AlarmId, bool>>,
    volumes: Mutex<HashMap<AlarmId, Vec<f32>>>,
}

impl RecordingAudio {
    pub fn failing() -> Self {
        Self {
            fail_play: true,
            ..Default::default()
        }
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            track_duration: Some(duration),
            ..Default::default()
        }
    }

    pub fn is_playing(&self, id: AlarmId) -> bool {
        self.playing.lock().unwrap().get(&id).copied().unwrap_or(false)
    }

    /// Every volume applied to `id`, in order.
    pub fn volume_trace(&self, id: AlarmId) -> Vec<f32> {
        self.volumes.lock().unwrap().get(&id).cloned().unwrap_or_default()
    }
}

impl AudioBackend for RecordingAudio {
    fn play(
        &self,
        id: AlarmId,
        _asset_path: &str,
        _looping: bool,
    ) -> Result<Playback, EffectorError> {
        if self.fail_play {
            return Err(EffectorError::Unavailable {
                effector: "audio",
                message: "test backend configured to fail".into(),
            });
        }
        self.playing.lock().unwrap().insert(id, true);
        Ok(Playback {
            duration: self.track_duration,
        })
    }

    fn set_volume(&self, id: AlarmId, volume: f32) {
        self.volumes.lock().unwrap().entry(id).or_default().push(volume);
    }

    fn stop(&self, id: AlarmId) {
        self.playing.lock().unwrap().insert(id, false);
    }
}

/// Records alarm notifications and the kill-warning state.
#[derive(Default)]
pub struct RecordingNotification {
    shown: Mutex<Vec<AlarmId>>,
    cancelled: Mutex<Vec<AlarmId>>,
    kill_warning: Mutex<Option<(String, String)>>,
}

impl RecordingNotification {
    pub fn shown_ids(&self) -> Vec<AlarmId> {
        self.shown.lock().unwrap().clone()
    }

    pub fn kill_warning(&self) -> Option<(String, String)> {
        self.kill_warning.lock().unwrap().clone()
    }
}

impl NotificationBackend for RecordingNotification {
    fn show_alarm(
        &self,
        id: AlarmId,
        _settings: &NotificationSettings,
    ) -> Result<(), EffectorError> {
        self.shown.lock().unwrap().push(id);
        Ok(())
    }

    fn cancel(&self, id: AlarmId) {
        self.cancelled.lock().unwrap().push(id);
    }

    fn show_kill_warning(&self, title: &str, body: &str) {
        *self.kill_warning.lock().unwrap() = Some((title.to_string(), body.to_string()));
    }

    fn clear_kill_warning(&self) {
        *self.kill_warning.lock().unwrap() = None;
    }
}

/// Fake device volume that remembers every `set`.
pub struct FakeSystemVolume {
    level: Mutex<f64>,
    sets: Mutex<Vec<f64>>,
}

impl FakeSystemVolume {
    pub fn at(level: f64) -> Self {
        Self {
            level: Mutex::new(level),
            sets: Mutex::new(Vec::new()),
        }
    }

    pub fn level(&self) -> f64 {
        *self.level.lock().unwrap()
    }

    /// Change the level out-of-band, as a user twiddling the rocker would.
    pub fn drift_to(&self, level: f64) {
        *self.level.lock().unwrap() = level;
    }

    pub fn set_history(&self) -> Vec<f64> {
        self.sets.lock().unwrap().clone()
    }
}

impl SystemVolume for FakeSystemVolume {
    fn current(&self) -> f64 {
        *self.level.lock().unwrap()
    }

    fn set(&self, volume: f64) {
        *self.level.lock().unwrap() = volume;
        self.sets.lock().unwrap().push(volume);
    }
}

/// Store whose writes can be made to fail, for degraded-persistence tests.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: std::sync::atomic::AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), reveille_core::StoreError> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(reveille_core::StoreError::DataDir(
                "write failure injected".into(),
            ));
        }
        Ok(())
    }
}

impl reveille_core::AlarmStore for FlakyStore {
    fn put(&self, settings: &AlarmSettings) -> Result<(), reveille_core::StoreError> {
        self.check()?;
        self.inner.put(settings)
    }

    fn remove(&self, id: AlarmId) -> Result<(), reveille_core::StoreError> {
        self.check()?;
        self.inner.remove(id)
    }

    fn list(&self) -> Result<Vec<AlarmSettings>, reveille_core::StoreError> {
        self.inner.list()
    }
}

pub struct Harness {
    pub manager: Arc<AlarmManager>,
    pub store: Arc<MemoryStore>,
    pub scheduler: Arc<ManualScheduler>,
    pub sink: Arc<RecordingSink>,
    pub audio: Arc<RecordingAudio>,
    pub notification: Arc<RecordingNotification>,
    pub system_volume: Arc<FakeSystemVolume>,
}

pub fn harness() -> Harness {
    harness_with(RuntimeOptions::default(), RecordingAudio::default())
}

pub fn harness_with(options: RuntimeOptions, audio: RecordingAudio) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let scheduler = Arc::new(ManualScheduler::new());
    let sink = Arc::new(RecordingSink::default());
    let audio = Arc::new(audio);
    let notification = Arc::new(RecordingNotification::default());
    let system_volume = Arc::new(FakeSystemVolume::at(0.8));

    let effects = Effects {
        audio: audio.clone(),
        notification: notification.clone(),
        vibration: Arc::new(reveille_core::effects::NullVibration),
        system_volume: system_volume.clone(),
    };

    let manager = AlarmManager::new(
        store.clone(),
        scheduler.clone(),
        effects,
        sink.clone(),
        options,
    );

    Harness {
        manager,
        store,
        scheduler,
        sink,
        audio,
        notification,
        system_volume,
    }
}

pub struct TokioHarness {
    pub manager: Arc<AlarmManager>,
    pub store: Arc<MemoryStore>,
    pub sink: Arc<RecordingSink>,
    pub audio: Arc<RecordingAudio>,
    pub system_volume: Arc<FakeSystemVolume>,
}

/// Harness backed by the real tokio scheduler, for paused-clock tests.
pub fn tokio_harness(options: RuntimeOptions, audio: RecordingAudio) -> TokioHarness {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::default());
    let audio = Arc::new(audio);
    let system_volume = Arc::new(FakeSystemVolume::at(0.8));

    let effects = Effects {
        audio: audio.clone(),
        notification: Arc::new(RecordingNotification::default()),
        vibration: Arc::new(reveille_core::effects::NullVibration),
        system_volume: system_volume.clone(),
    };

    let manager = AlarmManager::new(
        store.clone(),
        Arc::new(TokioScheduler::new()),
        effects,
        sink.clone(),
        options,
    );

    TokioHarness {
        manager,
        store,
        sink,
        audio,
        system_volume,
    }
}

/// A valid record ringing one minute from now.
pub fn settings(id: AlarmId) -> AlarmSettings {
    settings_at(id, Utc::now() + chrono::Duration::seconds(60))
}

pub fn settings_at(id: AlarmId, date_time: DateTime<Utc>) -> AlarmSettings {
    AlarmSettings {
        id,
        date_time,
        asset_audio_path: "sounds/marimba.mp3".into(),
        volume_settings: VolumeSettings::default(),
        notification_settings: NotificationSettings {
            title: "Alarm".into(),
            body: "Time to wake up".into(),
            stop_button: Some("Stop".into()),
            icon: None,
            icon_color: None,
        },
        loop_audio: true,
        vibrate: true,
        warning_notification_on_kill: true,
        android_full_screen_intent: true,
        allow_alarm_overlap: false,
        ios_background_audio: true,
        android_stop_alarm_on_termination: true,
        payload: None,
    }
}
