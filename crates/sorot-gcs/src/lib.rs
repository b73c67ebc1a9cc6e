//! Sorot GCS - Object storage for videos, segments and import files.

mod client;
mod error;

pub use client::StorageClient;
pub use error::{StorageError, StorageResult};
