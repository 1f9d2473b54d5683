//! Errors raised at the engine boundary.
//!
//! Geometry operations are total and never fail; only parsing of external
//! input (drop payloads, scene documents, configuration) produces errors.

use thiserror::Error;

/// Boundary errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid drop payload: {0}")]
    Payload(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for boundary operations.
pub type SceneResult<T> = Result<T, SceneError>;
