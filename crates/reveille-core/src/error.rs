//! Error types for reveille-core.
//!
//! Nothing here is fatal to the host process. Validation problems are
//! rejected synchronously before any state mutation; effector and
//! persistence failures degrade per the rules documented on each operation.

use thiserror::Error;

use crate::alarm::AlarmId;

/// Top-level error type for core operations.
#[derive(Error, Debug)]
pub enum AlarmError {
    /// Malformed or out-of-range alarm settings, rejected at the boundary.
    #[error("invalid alarm settings: {0}")]
    InvalidInput(#[from] ValidationError),

    /// An operation referenced an alarm id with no live record.
    #[error("alarm {0} not found")]
    NotFound(AlarmId),

    /// A collaborator (audio, notification, vibration) was unavailable.
    #[error("effector error: {0}")]
    Effector(#[from] EffectorError),

    /// The durable store failed to read or write.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Settings validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("alarm id must be positive, got {0}")]
    NonPositiveId(AlarmId),

    #[error("{field} must be within [0.0, 1.0], got {value}")]
    VolumeOutOfRange { field: &'static str, value: f64 },

    #[error("notification {field} must not be empty")]
    EmptyNotificationField { field: &'static str },

    #[error("audio asset path must not be empty")]
    EmptyAudioPath,
}

/// Durable store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("data directory unavailable: {0}")]
    DataDir(String),
}

/// Effector errors. The ring path treats these as degradations, not
/// failures: the affected effect is skipped and the alarm still rings.
#[derive(Error, Debug)]
pub enum EffectorError {
    #[error("{effector} unavailable: {message}")]
    Unavailable {
        effector: &'static str,
        message: String,
    },

    #[error("{effector} failed: {message}")]
    Failed {
        effector: &'static str,
        message: String,
    },
}

/// Result type alias for core operations.
pub type Result<T, E = AlarmError> = std::result::Result<T, E>;
