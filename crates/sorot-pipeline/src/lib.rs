//! Orchestration of the indexing pipeline.
//!
//! [`PlaylistIngestor`] pulls source videos from a playlist into the bucket,
//! [`VideoIndexer`] runs the per-video stages (segment, classify, analyze,
//! assemble, publish), and [`DocumentBuilder`] turns analyzed clips into
//! the schema documents the import job consumes.

mod documents;
mod error;
mod indexer;
mod ingest;

pub use documents::DocumentBuilder;
pub use error::{PipelineError, PipelineResult};
pub use indexer::{IndexOutcome, VideoIndexer};
pub use ingest::{IngestOutcome, IngestReport, PlaylistIngestor};
