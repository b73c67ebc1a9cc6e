//! Error types for pipeline orchestration.

use thiserror::Error;

/// Errors that can stop an ingest or indexing run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] sorot_gcs::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] sorot_media::MediaError),

    #[error("Search error: {0}")]
    Discovery(#[from] sorot_discovery::DiscoveryError),

    #[error("'{tool}' not found in PATH. Install it and try again.")]
    ToolNotFound { tool: String },

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
