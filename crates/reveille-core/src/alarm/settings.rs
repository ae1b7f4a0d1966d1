//! Persisted alarm settings and their JSON wire format.
//!
//! Field names on the wire are fixed by the host bridge contract
//! (`dateTime`, `assetAudioPath`, ...). Optional fields carry explicit
//! defaults so that records written by older hosts still decode. The
//! platform flags (`androidFullScreenIntent`, `iOSBackgroundAudio`,
//! `androidStopAlarmOnTermination`) are opaque pass-through configuration:
//! persisted and round-tripped, never interpreted here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AlarmId;
use crate::error::ValidationError;

/// One alarm: a trigger instant plus ring behavior, keyed by a
/// caller-supplied id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSettings {
    pub id: AlarmId,
    /// Absolute trigger instant. A past or near-future instant is not an
    /// error; it rings as soon as practicable.
    pub date_time: DateTime<Utc>,
    /// Opaque audio source reference, resolved by the host's audio backend.
    pub asset_audio_path: String,
    pub volume_settings: VolumeSettings,
    pub notification_settings: NotificationSettings,
    #[serde(default = "default_true")]
    pub loop_audio: bool,
    #[serde(default = "default_true")]
    pub vibrate: bool,
    #[serde(default = "default_true")]
    pub warning_notification_on_kill: bool,
    #[serde(default = "default_true")]
    pub android_full_screen_intent: bool,
    #[serde(default)]
    pub allow_alarm_overlap: bool,
    #[serde(rename = "iOSBackgroundAudio", default = "default_true")]
    pub ios_background_audio: bool,
    #[serde(default = "default_true")]
    pub android_stop_alarm_on_termination: bool,
    /// Returned verbatim to the host on `rang`/`stopped` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

/// Volume behavior while ringing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSettings {
    /// Target system volume fraction in [0, 1]. When set, the previous
    /// system volume is captured at ring start and restored on stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Fade from silence to the target volume over this many milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_duration: Option<u64>,
    /// Explicit fade curve; each step applies at its offset from ring start.
    /// Takes precedence over `fade_duration` when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fade_steps: Vec<VolumeFadeStep>,
    /// Re-apply the target system volume (~1 Hz) while ringing.
    #[serde(default)]
    pub volume_enforced: bool,
}

/// One point on an explicit fade curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeFadeStep {
    /// Offset from ring start, in milliseconds.
    pub time: u64,
    /// Playback volume fraction in [0, 1] to reach at `time`.
    pub volume: f64,
}

/// User-visible notification content shown while ringing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub title: String,
    pub body: String,
    /// Label for the stop action; no button when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_button: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
}

fn default_true() -> bool {
    true
}

impl AlarmSettings {
    /// Boundary validation, run once before any state mutation.
    /// Deeper layers trust validated settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id <= 0 {
            return Err(ValidationError::NonPositiveId(self.id));
        }
        if self.asset_audio_path.is_empty() {
            return Err(ValidationError::EmptyAudioPath);
        }
        if self.notification_settings.title.is_empty() {
            return Err(ValidationError::EmptyNotificationField { field: "title" });
        }
        if self.notification_settings.body.is_empty() {
            return Err(ValidationError::EmptyNotificationField { field: "body" });
        }
        if let Some(volume) = self.volume_settings.volume {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ValidationError::VolumeOutOfRange {
                    field: "volume",
                    value: volume,
                });
            }
        }
        for step in &self.volume_settings.fade_steps {
            if !(0.0..=1.0).contains(&step.volume) {
                return Err(ValidationError::VolumeOutOfRange {
                    field: "fadeSteps.volume",
                    value: step.volume,
                });
            }
        }
        Ok(())
    }
}
