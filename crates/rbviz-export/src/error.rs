//! Error types for export operations.

use rbviz_core::WireError;
use thiserror::Error;

/// Errors that can occur while exporting a tree.
///
/// Structural anomalies and hook failures are never errors; they are
/// written into the snapshot. Only failing to produce the text is.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("wire encoding failed: {0}")]
    Wire(#[from] WireError),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
