//! Error types for Engagemetry

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum EngageError {
    #[error("Failed to decode audio chunk: {0}")]
    DecodeError(String),

    #[error("Failed to parse event payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Insufficient samples for computation: {0}")]
    InsufficientSamples(String),
}
