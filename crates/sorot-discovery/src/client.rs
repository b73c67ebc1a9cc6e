//! REST client for Vertex AI Search.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::types::SearchResponse;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sorot_auth::TokenProvider;
use sorot_config::{GcpConfig, SearchConfig};
use sorot_core::GcsUri;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const SUMMARY_PREAMBLE: &str = "Provide a brief summary of the video content.";

/// Client for data-store administration, imports and queries.
#[derive(Clone)]
pub struct DiscoveryClient {
    client: Client,
    base_url: String,
    project_id: String,
    location: String,
    data_store_id: String,
    engine_id: String,
    page_size: u32,
    summary_result_count: u32,
    time_zone: String,
    auth: Arc<TokenProvider>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDataStoreBody {
    display_name: &'static str,
    industry_vertical: &'static str,
    solution_types: Vec<&'static str>,
    content_config: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocumentsBody {
    gcs_source: GcsSource,
    reconciliation_mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GcsSource {
    input_uris: Vec<String>,
    data_schema: &'static str,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    page_size: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    filter: String,
    facet_specs: Vec<FacetSpec>,
    content_search_spec: ContentSearchSpec,
    query_expansion_spec: QueryExpansionSpec,
    spell_correction_spec: SpellCorrectionSpec,
    relevance_score_spec: RelevanceScoreSpec,
    user_info: UserInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FacetSpec {
    facet_key: FacetKey,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct FacetKey {
    key: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentSearchSpec {
    snippet_spec: SnippetSpec,
    summary_spec: SummarySpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnippetSpec {
    return_snippet: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarySpec {
    summary_result_count: u32,
    include_citations: bool,
    ignore_adversarial_query: bool,
    ignore_non_summary_seeking_query: bool,
    model_prompt_spec: ModelPromptSpec,
    model_spec: ModelSpec,
}

#[derive(Debug, Serialize)]
struct ModelPromptSpec {
    preamble: &'static str,
}

#[derive(Debug, Serialize)]
struct ModelSpec {
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct QueryExpansionSpec {
    condition: &'static str,
}

#[derive(Debug, Serialize)]
struct SpellCorrectionSpec {
    mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelevanceScoreSpec {
    return_relevance_score: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo<'a> {
    time_zone: &'a str,
}

impl DiscoveryClient {
    pub fn from_config(
        gcp: &GcpConfig,
        search: &SearchConfig,
        auth: Arc<TokenProvider>,
    ) -> DiscoveryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(DiscoveryError::Http)?;

        let base_url = if gcp.location == "global" {
            "https://discoveryengine.googleapis.com".to_string()
        } else {
            format!("https://{}-discoveryengine.googleapis.com", gcp.location)
        };

        Ok(Self {
            client,
            base_url,
            project_id: gcp.project_id.clone(),
            location: gcp.location.clone(),
            data_store_id: search.data_store_id.clone(),
            engine_id: search.engine_id.clone(),
            page_size: search.page_size,
            summary_result_count: search.summary_result_count,
            time_zone: search.time_zone.clone(),
            auth,
        })
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create the data store that receives document imports.
    ///
    /// Returns `false` when the store already exists, which is not an error:
    /// setup is safe to re-run.
    pub async fn create_data_store(&self) -> DiscoveryResult<bool> {
        let token = self.auth.token().await?;
        let url = format!(
            "{}/v1/projects/{}/locations/{}/collections/default_collection/dataStores",
            self.base_url, self.project_id, self.location
        );

        let body = CreateDataStoreBody {
            display_name: "Video Search Datastore",
            industry_vertical: "GENERIC",
            solution_types: vec!["SOLUTION_TYPE_SEARCH"],
            content_config: "CONTENT_REQUIRED",
        };

        debug!("Creating data store {}", self.data_store_id);
        let response = self
            .client
            .post(&url)
            .query(&[("dataStoreId", self.data_store_id.as_str())])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            info!("Data store {} already exists", self.data_store_id);
            return Ok(false);
        }
        error_for_status(response).await?;
        info!("Created data store {}", self.data_store_id);
        Ok(true)
    }

    /// Start an incremental import of a JSONL file already in the bucket.
    ///
    /// Returns the long-running operation name; completion is monitored in
    /// the console, not polled here.
    pub async fn import_documents(&self, jsonl: &GcsUri) -> DiscoveryResult<String> {
        let token = self.auth.token().await?;
        let url = format!(
            "{}/v1/projects/{}/locations/{}/dataStores/{}/branches/default_branch/documents:import",
            self.base_url, self.project_id, self.location, self.data_store_id
        );

        let body = ImportDocumentsBody {
            gcs_source: GcsSource {
                input_uris: vec![jsonl.to_string()],
                data_schema: "document",
            },
            reconciliation_mode: "INCREMENTAL",
        };

        debug!("Importing {} into {}", jsonl, self.data_store_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let operation: OperationResponse = response.json().await?;
        info!("Started document import operation: {}", operation.name);
        Ok(operation.name)
    }

    /// Run a search query against the engine's default serving config.
    ///
    /// `facet_filters` restricts results to documents matching every listed
    /// facet value, e.g. `persons.name -> ["Bruno Moreira"]`.
    pub async fn search(
        &self,
        query: &str,
        facet_filters: &BTreeMap<String, Vec<String>>,
    ) -> DiscoveryResult<SearchResponse> {
        let token = self.auth.token().await?;
        let url = format!(
            "{}/v1/projects/{}/locations/{}/collections/default_collection/engines/{}/servingConfigs/default_config:search",
            self.base_url, self.project_id, self.location, self.engine_id
        );

        let request = SearchRequest {
            query,
            page_size: self.page_size,
            filter: build_filter(facet_filters),
            facet_specs: vec![
                FacetSpec {
                    facet_key: FacetKey {
                        key: "persons.name",
                    },
                    limit: 20,
                },
                FacetSpec {
                    facet_key: FacetKey {
                        key: "organizations.name",
                    },
                    limit: 20,
                },
                FacetSpec {
                    facet_key: FacetKey { key: "hash_tags" },
                    limit: 50,
                },
            ],
            content_search_spec: ContentSearchSpec {
                snippet_spec: SnippetSpec {
                    return_snippet: true,
                },
                summary_spec: SummarySpec {
                    summary_result_count: self.summary_result_count,
                    include_citations: true,
                    ignore_adversarial_query: true,
                    ignore_non_summary_seeking_query: true,
                    model_prompt_spec: ModelPromptSpec {
                        preamble: SUMMARY_PREAMBLE,
                    },
                    model_spec: ModelSpec { version: "stable" },
                },
            },
            query_expansion_spec: QueryExpansionSpec { condition: "AUTO" },
            spell_correction_spec: SpellCorrectionSpec { mode: "AUTO" },
            relevance_score_spec: RelevanceScoreSpec {
                return_relevance_score: true,
            },
            user_info: UserInfo {
                time_zone: &self.time_zone,
            },
        };

        debug!("Searching for {:?}", query);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let page: SearchResponse = response.json().await?;
        debug!(
            "Search returned {} of {} results",
            page.results.len(),
            page.total_size
        );
        Ok(page)
    }
}

/// Build the `key: ANY("value")` filter expression, AND-joining every value.
fn build_filter(facet_filters: &BTreeMap<String, Vec<String>>) -> String {
    facet_filters
        .iter()
        .map(|(key, values)| {
            values
                .iter()
                .map(|value| format!("{}: ANY(\"{}\")", key, value))
                .collect::<Vec<_>>()
                .join(" AND ")
        })
        .filter(|clause| !clause.is_empty())
        .collect::<Vec<_>>()
        .join(" AND ")
}

async fn error_for_status(response: reqwest::Response) -> DiscoveryResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(DiscoveryError::ApiError {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> DiscoveryClient {
        std::env::set_var("GOOGLE_ACCESS_TOKEN", "test-token");
        let gcp = GcpConfig {
            project_id: "proj".to_string(),
            location: "global".to_string(),
        };
        let search = SearchConfig {
            data_store_id: "videos-ds".to_string(),
            engine_id: "videos-engine".to_string(),
            ..Default::default()
        };
        DiscoveryClient::from_config(&gcp, &search, Arc::new(TokenProvider::new().unwrap()))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_create_data_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/proj/locations/global/collections/default_collection/dataStores",
            ))
            .and(query_param("dataStoreId", "videos-ds"))
            .and(body_partial_json(serde_json::json!({
                "displayName": "Video Search Datastore",
                "industryVertical": "GENERIC",
                "solutionTypes": ["SOLUTION_TYPE_SEARCH"],
                "contentConfig": "CONTENT_REQUIRED"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "operations/create-123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(client.create_data_store().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_data_store_already_exists_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/proj/locations/global/collections/default_collection/dataStores",
            ))
            .respond_with(ResponseTemplate::new(409).set_body_string("already exists"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(!client.create_data_store().await.unwrap());
    }

    #[tokio::test]
    async fn test_import_documents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/proj/locations/global/dataStores/videos-ds/branches/default_branch/documents:import",
            ))
            .and(body_partial_json(serde_json::json!({
                "gcsSource": {
                    "inputUris": ["gs://bkt/discovery-engine-data/match_abc.jsonl"],
                    "dataSchema": "document"
                },
                "reconciliationMode": "INCREMENTAL"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/proj/operations/import-42"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let operation = client
            .import_documents(&GcsUri::new("bkt", "discovery-engine-data/match_abc.jsonl"))
            .await
            .unwrap();
        assert_eq!(operation, "projects/proj/operations/import-42");
    }

    #[tokio::test]
    async fn test_search_sends_spec_and_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/proj/locations/global/collections/default_collection/engines/videos-engine/servingConfigs/default_config:search",
            ))
            .and(body_partial_json(serde_json::json!({
                "query": "long shot",
                "pageSize": 10,
                "facetSpecs": [
                    {"facetKey": {"key": "persons.name"}, "limit": 20},
                    {"facetKey": {"key": "organizations.name"}, "limit": 20},
                    {"facetKey": {"key": "hash_tags"}, "limit": 50}
                ],
                "contentSearchSpec": {
                    "snippetSpec": {"returnSnippet": true},
                    "summarySpec": {
                        "summaryResultCount": 5,
                        "includeCitations": true,
                        "modelSpec": {"version": "stable"}
                    }
                },
                "queryExpansionSpec": {"condition": "AUTO"},
                "spellCorrectionSpec": {"mode": "AUTO"},
                "relevanceScoreSpec": {"returnRelevanceScore": true},
                "userInfo": {"timeZone": "Asia/Jakarta"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "id": "doc-1",
                    "document": {
                        "id": "doc-1",
                        "structData": {"title": "A long shot #LongShot"}
                    }
                }],
                "totalSize": 37,
                "summary": {"summaryText": "One long shot."},
                "facets": [{"key": "hash_tags", "values": [{"value": "#LongShot", "count": 3}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let page = client.search("long shot", &BTreeMap::new()).await.unwrap();
        assert_eq!(page.total_size, 37);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.summary.unwrap().summary_text, "One long shot.");
        assert_eq!(page.facets[0].values[0].count, 3);

        let document = page.results[0].document.as_ref().unwrap();
        assert_eq!(document.struct_data["title"], "A long shot #LongShot");
    }

    #[tokio::test]
    async fn test_search_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .search("anything", &BTreeMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::ApiError { status: 403, .. }));
    }

    #[test]
    fn test_build_filter() {
        let mut filters = BTreeMap::new();
        assert_eq!(build_filter(&filters), "");

        filters.insert(
            "persons.name".to_string(),
            vec!["Bruno Moreira".to_string()],
        );
        assert_eq!(
            build_filter(&filters),
            "persons.name: ANY(\"Bruno Moreira\")"
        );

        filters.insert(
            "hash_tags".to_string(),
            vec!["#LongShot".to_string(), "#Rebound".to_string()],
        );
        assert_eq!(
            build_filter(&filters),
            "hash_tags: ANY(\"#LongShot\") AND hash_tags: ANY(\"#Rebound\") AND persons.name: ANY(\"Bruno Moreira\")"
        );
    }
}
