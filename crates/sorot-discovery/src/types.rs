//! Response types for the search API.
//!
//! `struct_data` stays a raw JSON value: imported documents control their own
//! schema, so consumers pick fields out with fallbacks instead of a fixed
//! struct.

use serde::Deserialize;

/// One page of search results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// Total matches across all pages, not just this one.
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub facets: Vec<Facet>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub struct_data: serde_json::Value,
    #[serde(default)]
    pub derived_struct_data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Facet {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub values: Vec<FacetValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacetValue {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(default)]
    pub summary_text: String,
}
