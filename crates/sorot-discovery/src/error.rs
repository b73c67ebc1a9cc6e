//! Error types for search operations.

use thiserror::Error;

/// Errors that can occur when talking to the search API.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Search API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Auth error: {0}")]
    Auth(#[from] sorot_auth::AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
