//! Sorot Core - Shared domain types for the Sorot video indexing system.

mod error;
mod gcs;
mod types;

pub use error::{Error, Result};
pub use gcs::GcsUri;
pub use types::*;
