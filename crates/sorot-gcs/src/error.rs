//! Error types for object storage operations.

use thiserror::Error;

/// Errors that can occur when talking to Cloud Storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The object does not exist.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// API returned an error response.
    #[error("Storage API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Could not build a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Credential resolution failed.
    #[error("Auth error: {0}")]
    Auth(#[from] sorot_auth::AuthError),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local file IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
