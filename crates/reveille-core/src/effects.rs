//! Effector traits: the platform services the ring controller drives.
//!
//! Audio, notifications, vibration, and the system volume are host
//! collaborators, not part of this core. Each is a trait object so hosts
//! plug in their platform backend and tests plug in recorders. A failing
//! effector degrades the ring (the effect is skipped) rather than
//! aborting it.

use std::sync::Arc;
use std::time::Duration;

use crate::alarm::{AlarmId, NotificationSettings};
use crate::error::EffectorError;

/// Started playback, as reported by the audio backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Playback {
    /// Track length when the backend knows it. Non-looping alarms with a
    /// known length auto-stop when it elapses.
    pub duration: Option<Duration>,
}

/// Starts and stops alarm audio.
pub trait AudioBackend: Send + Sync {
    fn play(&self, id: AlarmId, asset_path: &str, looping: bool)
        -> Result<Playback, EffectorError>;

    /// Adjust playback volume for one alarm; no-op if it is not playing.
    fn set_volume(&self, id: AlarmId, volume: f32);

    fn stop(&self, id: AlarmId);
}

/// Shows and cancels user-visible alerts.
pub trait NotificationBackend: Send + Sync {
    fn show_alarm(
        &self,
        id: AlarmId,
        settings: &NotificationSettings,
    ) -> Result<(), EffectorError>;

    fn cancel(&self, id: AlarmId);

    /// Persistent warning shown while any stored alarm wants protection
    /// against the host being killed.
    fn show_kill_warning(&self, title: &str, body: &str);

    fn clear_kill_warning(&self);
}

/// Repeating haptic pattern; a single global channel shared by all
/// ringing alarms.
pub trait VibrationBackend: Send + Sync {
    fn start(&self) -> Result<(), EffectorError>;
    fn stop(&self);
}

/// The device's shared system volume.
pub trait SystemVolume: Send + Sync {
    fn current(&self) -> f64;
    fn set(&self, volume: f64);
}

/// The effector bundle an [`crate::manager::AlarmManager`] is built with.
#[derive(Clone)]
pub struct Effects {
    pub audio: Arc<dyn AudioBackend>,
    pub notification: Arc<dyn NotificationBackend>,
    pub vibration: Arc<dyn VibrationBackend>,
    pub system_volume: Arc<dyn SystemVolume>,
}

impl Effects {
    /// All-no-op bundle for hosts that only need scheduling and events.
    pub fn null() -> Self {
        Self {
            audio: Arc::new(NullAudio),
            notification: Arc::new(NullNotification),
            vibration: Arc::new(NullVibration),
            system_volume: Arc::new(NullSystemVolume),
        }
    }
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Effects { .. }")
    }
}

/// Plays nothing, reports no duration.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioBackend for NullAudio {
    fn play(
        &self,
        _id: AlarmId,
        _asset_path: &str,
        _looping: bool,
    ) -> Result<Playback, EffectorError> {
        Ok(Playback::default())
    }

    fn set_volume(&self, _id: AlarmId, _volume: f32) {}

    fn stop(&self, _id: AlarmId) {}
}

#[derive(Debug, Default)]
pub struct NullNotification;

impl NotificationBackend for NullNotification {
    fn show_alarm(
        &self,
        _id: AlarmId,
        _settings: &NotificationSettings,
    ) -> Result<(), EffectorError> {
        Ok(())
    }

    fn cancel(&self, _id: AlarmId) {}

    fn show_kill_warning(&self, _title: &str, _body: &str) {}

    fn clear_kill_warning(&self) {}
}

#[derive(Debug, Default)]
pub struct NullVibration;

impl VibrationBackend for NullVibration {
    fn start(&self) -> Result<(), EffectorError> {
        Ok(())
    }

    fn stop(&self) {}
}

/// Fixed full volume; `set` is ignored.
#[derive(Debug, Default)]
pub struct NullSystemVolume;

impl SystemVolume for NullSystemVolume {
    fn current(&self) -> f64 {
        1.0
    }

    fn set(&self, _volume: f64) {}
}
