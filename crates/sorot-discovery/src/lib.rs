//! Vertex AI Search client: data-store setup, document imports and queries.

mod client;
mod error;
mod types;

pub use client::DiscoveryClient;
pub use error::{DiscoveryError, DiscoveryResult};
pub use types::{Document, Facet, FacetValue, SearchResponse, SearchResult, Summary};
