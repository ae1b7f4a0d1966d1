//! Offline alarm management: mutate the durable store directly. The
//! scheduler side is volatile by design; `reveille run` reconciles and
//! arms whatever this subcommand wrote.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use reveille_core::{
    classify, AlarmStore, AlarmSettings, JsonFileStore, NotificationSettings, ReconcileAction,
    RuntimeOptions, VolumeFadeStep, VolumeSettings,
};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Schedule an alarm, replacing any with the same id
    Set(SetArgs),
    /// Remove one alarm
    Stop {
        alarm_id: i64,
    },
    /// Remove every alarm
    StopAll,
    /// Print stored alarms as JSON
    List,
    /// Reconcile stored alarms against the clock, pruning stale records
    Check,
}

#[derive(Args)]
pub struct SetArgs {
    /// Alarm id, unique among live alarms
    #[arg(long)]
    id: i64,
    /// Trigger instant, RFC 3339 (e.g. 2026-08-04T07:30:00Z)
    #[arg(long, conflicts_with = "in_secs")]
    at: Option<DateTime<Utc>>,
    /// Trigger this many seconds from now
    #[arg(long = "in", value_name = "SECS", conflicts_with = "at")]
    in_secs: Option<i64>,
    /// Audio asset path
    #[arg(long)]
    audio: String,
    #[arg(long, default_value = "Alarm")]
    title: String,
    #[arg(long, default_value = "Time to wake up")]
    body: String,
    /// Stop-button label on the notification
    #[arg(long)]
    stop_button: Option<String>,
    /// Target system volume fraction in [0, 1]
    #[arg(long)]
    volume: Option<f64>,
    /// Fade-in duration in milliseconds
    #[arg(long, value_name = "MS")]
    fade_ms: Option<u64>,
    /// Fade step as "offset_ms:volume"; repeatable
    #[arg(long = "fade-step", value_name = "MS:VOL")]
    fade_steps: Vec<String>,
    /// Re-apply the target volume while ringing
    #[arg(long)]
    volume_enforced: bool,
    /// Play the audio once instead of looping
    #[arg(long)]
    once: bool,
    #[arg(long)]
    no_vibrate: bool,
    /// Allow ringing concurrently with other alarms
    #[arg(long)]
    overlap: bool,
    /// Skip the kill-warning notification for this alarm
    #[arg(long)]
    no_warning: bool,
    /// Opaque payload returned with rang/stopped events
    #[arg(long)]
    payload: Option<String>,
}

impl SetArgs {
    fn into_settings(self) -> Result<AlarmSettings, Box<dyn std::error::Error>> {
        let date_time = match (self.at, self.in_secs) {
            (Some(at), _) => at,
            (None, Some(secs)) => Utc::now() + chrono::Duration::seconds(secs),
            (None, None) => return Err("one of --at or --in is required".into()),
        };

        let fade_steps = self
            .fade_steps
            .iter()
            .map(|raw| parse_fade_step(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AlarmSettings {
            id: self.id,
            date_time,
            asset_audio_path: self.audio,
            volume_settings: VolumeSettings {
                volume: self.volume,
                fade_duration: self.fade_ms,
                fade_steps,
                volume_enforced: self.volume_enforced,
            },
            notification_settings: NotificationSettings {
                title: self.title,
                body: self.body,
                stop_button: self.stop_button,
                icon: None,
                icon_color: None,
            },
            loop_audio: !self.once,
            vibrate: !self.no_vibrate,
            warning_notification_on_kill: !self.no_warning,
            android_full_screen_intent: true,
            allow_alarm_overlap: self.overlap,
            ios_background_audio: true,
            android_stop_alarm_on_termination: true,
            payload: self.payload,
        })
    }
}

fn parse_fade_step(raw: &str) -> Result<VolumeFadeStep, Box<dyn std::error::Error>> {
    let (time, volume) = raw
        .split_once(':')
        .ok_or_else(|| format!("bad fade step '{raw}', expected MS:VOL"))?;
    Ok(VolumeFadeStep {
        time: time.parse()?,
        volume: volume.parse()?,
    })
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::open_default()?;

    match action {
        AlarmAction::Set(args) => {
            let settings = args.into_settings()?;
            settings.validate()?;
            store.put(&settings)?;
            println!("alarm {} set for {}", settings.id, settings.date_time);
            println!("start `reveille run` so it can ring");
        }
        AlarmAction::Stop { alarm_id } => {
            let known = store.list()?.iter().any(|a| a.id == alarm_id);
            store.remove(alarm_id)?;
            if known {
                println!("alarm {alarm_id} removed");
            } else {
                // Stopping an unknown id is a no-op, not an error.
                println!("no alarm {alarm_id}; nothing to do");
            }
        }
        AlarmAction::StopAll => {
            let alarms = store.list()?;
            for alarm in &alarms {
                store.remove(alarm.id)?;
            }
            println!("removed {} alarm(s)", alarms.len());
        }
        AlarmAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.list()?)?);
        }
        AlarmAction::Check => {
            let options = RuntimeOptions::load_or_default();
            let now = Utc::now();
            for record in store.list()? {
                match classify(record.date_time, now, options.grace_window()) {
                    ReconcileAction::Rearm => {
                        println!("alarm {}: scheduled for {}", record.id, record.date_time);
                    }
                    ReconcileAction::RingNow => {
                        let late = (now - record.date_time).num_seconds();
                        println!(
                            "alarm {}: missed {late}s ago, within grace; rings on next `reveille run`",
                            record.id
                        );
                    }
                    ReconcileAction::Drop => {
                        store.remove(record.id)?;
                        println!("alarm {}: stale ({}), removed", record.id, record.date_time);
                    }
                }
            }
        }
    }

    Ok(())
}
