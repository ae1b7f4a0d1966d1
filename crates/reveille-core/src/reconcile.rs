//! Reconciliation: repairing drift between the durable store and the
//! volatile scheduler.
//!
//! The store survives restarts; scheduler registrations do not. After a
//! relaunch, boot, or background wake, every stored record falls into one
//! of three cases, decided here and applied by
//! [`crate::manager::AlarmManager::check_alarms`].

use chrono::{DateTime, Duration, Utc};

/// What to do with one stored record during a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Trigger is still ahead: re-register with the scheduler. Arming is
    /// idempotent, so this is safe even when the registration survived.
    Rearm,
    /// Missed, but recently enough to honor: ring immediately.
    RingNow,
    /// Missed by more than the grace window: abandon silently.
    Drop,
}

/// Classify a trigger instant against `now` and the grace window.
pub fn classify(trigger: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> ReconcileAction {
    if trigger > now {
        ReconcileAction::Rearm
    } else if now - trigger <= grace {
        ReconcileAction::RingNow
    } else {
        ReconcileAction::Drop
    }
}

/// Counts reported by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub rearmed: usize,
    pub rung: usize,
    pub dropped: usize,
    /// Records skipped because they were already ringing.
    pub already_ringing: usize,
}
