//! Error taxonomy
//!
//! Per-entity errors never halt a session: the controller logs them and
//! moves on. Only `ConfigError` is fatal, and only when starting a session.

use thiserror::Error;

/// Recoverable per-entity/per-tick failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Drawn path too short (or too few points) to become a barrier
    #[error("gesture of length {length:.1} is below the minimum barrier length")]
    InvalidGesture { length: f32 },

    /// A referenced adversary or barrier type is absent from the tables
    #[error("unknown {kind} type `{id}`")]
    MissingConfiguration { kind: &'static str, id: String },

    /// A wave entry that is not `id:count`
    #[error("malformed wave entry `{entry}`")]
    MalformedWave { entry: String },
}

/// Failures loading or selecting configuration at session start
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("stage {0} not found")]
    UnknownStage(u32),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
