//! Error types for the coaching core.

use std::time::Duration;

/// Top-level error type for one unit of work.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// An onboarding field failed its constraint.
///
/// These are conversational re-prompts, not faults: the controller maps them
/// to corrective messages and never logs them as errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("no number found in input")]
    NotANumber,

    #[error("age {value} outside [{min}, {max}]")]
    AgeOutOfRange { value: i64, min: i64, max: i64 },

    #[error("weight {value}kg outside [{min}, {max}]")]
    WeightOutOfRange { value: f64, min: f64, max: f64 },

    #[error("height {value}cm outside [{min}, {max}]")]
    HeightOutOfRange { value: f64, min: f64, max: f64 },

    #[error("gender token not recognized")]
    UnknownGender,

    #[error("activity level not recognized")]
    UnknownActivityLevel,

    #[error("goals text too short ({len} chars, need more than {min})")]
    GoalsTooShort { len: usize, min: usize },
}

/// Storage collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Entity not found: {entity} for {id}")]
    NotFound { entity: String, id: String },

    #[error("Backend failure: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Generation service errors. Always caught at the adapter boundary and
/// converted to fallback content; never shown raw to the user.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Generation request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Unparsable generation response: {reason}")]
    InvalidResponse { reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Job scheduler collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Failed to enqueue job {job}: {reason}")]
    EnqueueFailed { job: String, reason: String },
}

/// Outbound transport collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send reply to {user_id}: {reason}")]
    SendFailed { user_id: String, reason: String },
}

/// A domain invariant was found broken in stored data.
///
/// Detection triggers corrective action plus an error-level log entry.
#[derive(Debug, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{count} active {kind} plans for user {user_id}, expected at most one")]
    MultipleActivePlans {
        user_id: String,
        kind: String,
        count: usize,
    },
}

/// Result type alias for the coaching core.
pub type Result<T> = std::result::Result<T, Error>;
