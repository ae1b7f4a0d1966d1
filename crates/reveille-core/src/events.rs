//! Host-facing events.
//!
//! Every ring and stop produces an event for the host application. Events
//! for one alarm id are emitted in causal order: a `stopped` never precedes
//! the `rang` it pairs with, and an alarm that never rang emits no
//! `stopped` unless the host opts into cancellation notices
//! (`RuntimeOptions::notify_cancelled`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmId;

/// A state change the host subscribes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlarmEvent {
    #[serde(rename = "alarmRang", rename_all = "camelCase")]
    Rang {
        alarm_id: AlarmId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
        at: DateTime<Utc>,
    },
    #[serde(rename = "alarmStopped", rename_all = "camelCase")]
    Stopped {
        alarm_id: AlarmId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
        at: DateTime<Utc>,
    },
}

impl AlarmEvent {
    pub fn rang(alarm_id: AlarmId, payload: Option<String>) -> Self {
        Self::Rang {
            alarm_id,
            payload,
            at: Utc::now(),
        }
    }

    pub fn stopped(alarm_id: AlarmId, payload: Option<String>) -> Self {
        Self::Stopped {
            alarm_id,
            payload,
            at: Utc::now(),
        }
    }

    pub fn alarm_id(&self) -> AlarmId {
        match self {
            Self::Rang { alarm_id, .. } | Self::Stopped { alarm_id, .. } => *alarm_id,
        }
    }
}

/// Receives events; implemented by the host bridge.
///
/// `emit` runs on the controller's critical path and must not call back
/// into the alarm manager; hand the event off and return.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AlarmEvent);
}

/// Discards all events.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: AlarmEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_tag_with_bridge_names() {
        let json = serde_json::to_value(AlarmEvent::rang(5, Some("p".into()))).unwrap();
        assert_eq!(json["type"], "alarmRang");
        assert_eq!(json["alarmId"], 5);
        assert_eq!(json["payload"], "p");

        let json = serde_json::to_value(AlarmEvent::stopped(5, None)).unwrap();
        assert_eq!(json["type"], "alarmStopped");
        assert!(json.get("payload").is_none());
    }
}
