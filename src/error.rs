//! Error types shared across the crate

use thiserror::Error;

/// Failures of the key-value persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON under key `{key}`: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize value for key `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
}

/// A base64 payload that could not be decoded
#[derive(Debug, Error)]
#[error("invalid base64 payload: {0}")]
pub struct PayloadError(#[from] pub base64::DecodeError);

/// Rejected user input while building or editing a timer configuration
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("timer name must not be empty")]
    EmptyName,
    #[error("duration must be a positive number of minutes, got {0}")]
    InvalidDuration(f64),
    #[error("interval must be greater than 0, got {0}")]
    IntervalNotPositive(f64),
    #[error("interval must be less than or equal to {duration} minutes, got {interval}")]
    IntervalTooLarge { interval: f64, duration: f64 },
    #[error("interval {0} is already configured")]
    DuplicateInterval(f64),
}

/// Countdown arithmetic failures. These stop the tick driver.
#[derive(Debug, Error, PartialEq)]
pub enum TimerError {
    #[error("duration of {0} minutes cannot be converted to milliseconds")]
    InvalidDuration(f64),
    #[error("remaining time {remaining_ms}ms exceeds total duration {total_ms}ms")]
    RemainingExceedsTotal { remaining_ms: u64, total_ms: u64 },
}

/// Why a persisted snapshot could not be resumed
#[derive(Debug, Error, PartialEq)]
pub enum RestoreError {
    #[error("snapshot belongs to timer `{found}`, not `{expected}`")]
    OtherTimer { expected: String, found: String },
    #[error(transparent)]
    Timer(#[from] TimerError),
}

/// Sound output failures. Always recoverable; sound simply stays silent.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("built without audio support")]
    Disabled,
    #[error("no audio output device: {0}")]
    NoDevice(String),
    #[error("audio engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("failed to decode audio clip: {0}")]
    Decode(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Desktop notification failures
#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("notification permission denied")]
    PermissionDenied,
    #[error("notification backend failed: {0}")]
    Backend(String),
}

/// Errors surfaced by runtime commands
#[derive(Debug, Error, PartialEq)]
pub enum RuntimeError {
    #[error("no timer is active")]
    NoActiveTimer,
    #[error(transparent)]
    Timer(#[from] TimerError),
}

/// Why a timer could not be created or edited
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
