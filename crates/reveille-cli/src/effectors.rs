//! Console and rodio stand-ins for the platform effectors.

use std::collections::HashMap;
use std::sync::Mutex;

use rodio::Source;
use tracing::info;

use reveille_core::{
    AlarmEvent, AlarmId, AudioBackend, EffectorError, EventSink, NotificationBackend,
    NotificationSettings, Playback, SystemVolume, VibrationBackend,
};

/// Prints every event as one JSON line, the same shape a plugin bridge
/// would deliver to its host application.
pub struct PrintSink;

impl EventSink for PrintSink {
    fn emit(&self, event: AlarmEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => println!("{json}"),
            Err(e) => info!(error = %e, "event could not be serialized"),
        }
    }
}

/// Renders notifications to the console.
pub struct ConsoleNotification;

impl NotificationBackend for ConsoleNotification {
    fn show_alarm(
        &self,
        id: AlarmId,
        settings: &NotificationSettings,
    ) -> Result<(), EffectorError> {
        let stop_hint = settings
            .stop_button
            .as_deref()
            .map(|label| format!("  [{label}: reveille alarm stop {id}]"))
            .unwrap_or_default();
        println!("** {} -- {}{stop_hint}", settings.title, settings.body);
        Ok(())
    }

    fn cancel(&self, id: AlarmId) {
        info!(alarm_id = id, "notification dismissed");
    }

    fn show_kill_warning(&self, title: &str, body: &str) {
        info!(title, body, "kill warning active");
    }

    fn clear_kill_warning(&self) {
        info!("kill warning cleared");
    }
}

/// No haptics on a desktop host; logs the pattern instead.
pub struct ConsoleVibration;

impl VibrationBackend for ConsoleVibration {
    fn start(&self) -> Result<(), EffectorError> {
        info!("vibration started");
        Ok(())
    }

    fn stop(&self) {
        info!("vibration stopped");
    }
}

/// Simulated device volume for the desktop host.
pub struct HostVolume {
    level: Mutex<f64>,
}

impl HostVolume {
    pub fn new() -> Self {
        Self {
            level: Mutex::new(1.0),
        }
    }
}

impl SystemVolume for HostVolume {
    fn current(&self) -> f64 {
        *self.level.lock().unwrap()
    }

    fn set(&self, volume: f64) {
        info!(volume, "system volume set");
        *self.level.lock().unwrap() = volume;
    }
}

/// Rodio-backed playback, one sink per ringing alarm.
pub struct RodioAudio {
    handle: rodio::OutputStreamHandle,
    sinks: Mutex<HashMap<AlarmId, rodio::Sink>>,
}

impl RodioAudio {
    pub fn new(handle: rodio::OutputStreamHandle) -> Self {
        Self {
            handle,
            sinks: Mutex::new(HashMap::new()),
        }
    }
}

impl AudioBackend for RodioAudio {
    fn play(
        &self,
        id: AlarmId,
        asset_path: &str,
        looping: bool,
    ) -> Result<Playback, EffectorError> {
        let file = std::fs::File::open(asset_path).map_err(|e| EffectorError::Unavailable {
            effector: "audio",
            message: format!("{asset_path}: {e}"),
        })?;
        let decoder =
            rodio::Decoder::new(std::io::BufReader::new(file)).map_err(|e| {
                EffectorError::Failed {
                    effector: "audio",
                    message: format!("decode {asset_path}: {e}"),
                }
            })?;
        let duration = decoder.total_duration();

        let sink = rodio::Sink::try_new(&self.handle).map_err(|e| EffectorError::Failed {
            effector: "audio",
            message: e.to_string(),
        })?;
        if looping {
            sink.append(decoder.repeat_infinite());
        } else {
            sink.append(decoder);
        }

        // Replacing a sink drops the old one, which stops its playback.
        self.sinks.lock().unwrap().insert(id, sink);

        Ok(Playback {
            duration: if looping { None } else { duration },
        })
    }

    fn set_volume(&self, id: AlarmId, volume: f32) {
        if let Some(sink) = self.sinks.lock().unwrap().get(&id) {
            sink.set_volume(volume);
        }
    }

    fn stop(&self, id: AlarmId) {
        if let Some(sink) = self.sinks.lock().unwrap().remove(&id) {
            sink.stop();
        }
    }
}
