//! # Reveille Core Library
//!
//! Core logic for a cross-platform alarm clock: durable alarm records,
//! best-effort wake-up scheduling, ring-state control, and the
//! reconciliation pass that repairs drift between them after restarts,
//! kills, and reboots. Platform services (audio, notifications,
//! vibration, the system volume, the wake-up primitive itself) are
//! collaborator traits the host plugs in; this crate holds the state
//! machine they orbit.
//!
//! ## Architecture
//!
//! - **Store**: durable truth. Every write is immediately durable.
//! - **Scheduler**: volatile, best-effort trigger registrations.
//! - **RingController**: per-id `Scheduled -> Ringing -> gone` lifecycle,
//!   single-ringer overlap policy, fade and volume-enforcement timers.
//! - **Reconciliation**: at process start / boot / background wake, the
//!   stored set is re-derived into scheduler registrations; recent misses
//!   ring late, stale misses are abandoned.
//! - **AlarmManager**: one explicit context object owning all of the
//!   above and exposing the host operation surface.
//!
//! ## Key Components
//!
//! - [`AlarmManager`]: operation surface (`set_alarm`, `stop_alarm`,
//!   `stop_all`, `is_ringing`, `get_alarms`,
//!   `set_warning_notification_on_kill`, `check_alarms`)
//! - [`AlarmSettings`]: the persisted alarm record and its JSON wire form
//! - [`Scheduler`]: the platform wake-up primitive contract
//! - [`AlarmStore`]: durable persistence contract

pub mod alarm;
pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod manager;
pub mod reconcile;
mod ring;
pub mod scheduler;
pub mod store;

pub use alarm::{AlarmId, AlarmSettings, FadePlan, NotificationSettings, VolumeFadeStep, VolumeSettings};
pub use config::RuntimeOptions;
pub use effects::{AudioBackend, Effects, NotificationBackend, Playback, SystemVolume, VibrationBackend};
pub use error::{AlarmError, EffectorError, Result, StoreError, ValidationError};
pub use events::{AlarmEvent, EventSink, NullSink};
pub use manager::AlarmManager;
pub use reconcile::{classify, ReconcileAction, ReconcileSummary};
pub use ring::RingState;
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use store::{AlarmStore, JsonFileStore, MemoryStore};
