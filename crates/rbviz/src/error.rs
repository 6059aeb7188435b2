//! Error types for the unified API.

use rbviz_export::ExportError;
use rbviz_view::DecodeError;
use thiserror::Error;

/// A failure reported by a [`Viewer`](crate::session::Viewer).
#[derive(Debug, Error)]
#[error("viewer failed: {0}")]
pub struct ViewerError(pub String);

/// Errors that can occur during visualizer operations.
#[derive(Debug, Error)]
pub enum VisualizerError {
    /// Export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Wire text could not be parsed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The external viewer could not show a snapshot.
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

/// Result type for visualizer operations.
pub type Result<T> = std::result::Result<T, VisualizerError>;
