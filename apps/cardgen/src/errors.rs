use std::path::PathBuf;

use thiserror::Error;

/// Batch-level error type.
///
/// Only data-source and pool-exhaustion failures halt a run. Asset and layout
/// degradations never surface here; they are absorbed where they happen.
#[derive(Debug, Error)]
pub enum CardgenError {
    #[error("Question bank not found at {}", .0.display())]
    MissingDataSource(PathBuf),

    #[error("Question bank at {} is not a valid record array: {source}", .path.display())]
    InvalidDataSource {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No eligible records left after relaxing every filter ({requested} requested)")]
    ExhaustedPool { requested: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CardgenError {
    /// True for the failures that must stop the whole batch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CardgenError::MissingDataSource(_)
                | CardgenError::InvalidDataSource { .. }
                | CardgenError::ExhaustedPool { .. }
        )
    }
}
