//! Error types for analyzer operations.

use thiserror::Error;

/// Errors that can occur when talking to the analyzer API.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Analyzer API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse analyzer response: {0}")]
    ParseError(String),

    #[error("Auth error: {0}")]
    Auth(#[from] sorot_auth::AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GeminiResult<T> = Result<T, GeminiError>;
