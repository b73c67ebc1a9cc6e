//! Error types for credential resolution.

use thiserror::Error;

/// Errors that can occur when resolving Google Cloud credentials.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No credential source produced a token.
    #[error("No Google Cloud credentials available. Set GOOGLE_ACCESS_TOKEN, run on GCE, or install the gcloud CLI.")]
    NoCredentials,

    /// Metadata server returned an error response.
    #[error("Metadata server error (status {status}): {message}")]
    MetadataError { status: u16, message: String },

    /// gcloud CLI is installed but returned an error.
    #[error("gcloud failed: {0}")]
    GcloudFailed(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error running gcloud.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;
