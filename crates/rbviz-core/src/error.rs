//! Error types for the wire codec.

use thiserror::Error;

/// Errors raised while converting between wire records and text.
#[derive(Debug, Error)]
pub enum WireError {
    /// The text is not well-formed JSON, or does not have the snapshot shape.
    #[error("malformed wire text: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Result type for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;
