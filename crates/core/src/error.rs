//! Error types for Smart Search.
//!
//! One enum covers the failure categories that cross crate boundaries:
//! configuration, I/O, user input, completion, prompt rendering and
//! serialization. Failures that are recovered inside a component have
//! their own narrower types next to that component.

use thiserror::Error;

/// Unified error type for Smart Search.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration. Raised before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input rejected before any work is done (e.g. an empty question)
    #[error("{0}")]
    InvalidInput(String),

    /// Completion provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt loading and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
