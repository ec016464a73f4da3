//! Error types for snapshot and recording output.

use std::path::PathBuf;

/// Errors that can occur while writing captured frames
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Filesystem error creating or writing an output
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image encoding failed
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    /// Nothing to write: the frame has zero width or height
    #[error("frame is empty, nothing to write")]
    EmptyFrame,
}

impl CaptureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
