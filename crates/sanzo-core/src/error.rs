//! Error types for sanzo-core
//!
//! Malformed colors at the validation boundary are not errors: they surface
//! as `None` from [`crate::color::validate_and_normalize`]. The variants here
//! cover request-level failures and the accelerated path's internal faults.

use thiserror::Error;

/// Result type for sanzo-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sanzo-core operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A color could not be resolved where one was required
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Request named an operation the engine does not provide
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Request is missing a field the operation needs
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Request could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Linear memory too small for an accelerated call
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Accelerated module could not be loaded
    #[error("Accelerated backend unavailable: {0}")]
    AcceleratedUnavailable(String),

    /// Worker thread has shut down
    #[error("Worker is no longer running")]
    WorkerClosed,

    /// Worker thread could not be started
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
