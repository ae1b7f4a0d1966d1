//! The platform wake-up primitive, abstracted.
//!
//! A scheduler arms one one-shot trigger per alarm id and fires the
//! registered callback as close to the instant as it can. Delivery is
//! best-effort only; the platform may drop a registration on kill or
//! reboot, and the reconciliation pass compensates. Re-arming an id
//! replaces the prior registration, so an id never fires twice for one
//! arm. Arming an instant at or before "now" fires as soon as
//! practicable rather than erroring.
//!
//! A callback may still be in flight when `disarm` lands; the resulting
//! late invocation must be treated as a no-op by the receiver, which
//! checks ring state rather than trusting delivery.

mod manual;
mod tokio_timer;

use chrono::{DateTime, Utc};

pub use manual::ManualScheduler;
pub use tokio_timer::TokioScheduler;

use crate::alarm::AlarmId;

/// Invoked once when an armed registration fires.
pub type FireFn = Box<dyn FnOnce() + Send>;

pub trait Scheduler: Send + Sync {
    /// Register a one-shot trigger for `id` at `instant`, replacing any
    /// prior registration for the same id.
    fn arm(&self, id: AlarmId, instant: DateTime<Utc>, on_fire: FireFn);

    /// Cancel a pending registration; no-op if none is pending or it has
    /// already fired.
    fn disarm(&self, id: AlarmId);
}
