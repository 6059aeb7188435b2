//! Error types for decoding.

use rbviz_core::WireError;
use thiserror::Error;

/// Errors that can occur while decoding a snapshot.
///
/// Only malformed text is an error. Divergence sentinels, dangling ranks
/// and error strings are expected data.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("parse error: {0}")]
    Parse(#[from] WireError),
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
