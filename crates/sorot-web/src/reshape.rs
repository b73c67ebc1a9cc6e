//! Flatten Discovery Engine responses into the fields the page renders.

use serde::Serialize;
use serde_json::Value;
use sorot_discovery::{SearchResponse, SearchResult};

/// Snippet text Discovery returns when it has nothing useful to show.
const NO_SNIPPET_PLACEHOLDER: &str = "No snippet is available for this page.";

/// Response body of `GET /api/search`.
#[derive(Debug, Serialize)]
pub struct ApiSearchResponse {
    pub results: Vec<SearchHit>,
    pub summary: Option<String>,
    pub total_results: u64,
    pub page_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiSearchResponse {
    /// Empty response carrying a backend error for the page to display.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            summary: None,
            total_results: 0,
            page_results: 0,
            error: Some(message.into()),
        }
    }
}

/// One rendered search hit.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub uri: String,
    pub snippet: String,
    pub thumbnail: String,
}

/// Reshape a raw search response for the page.
pub fn reshape(page: SearchResponse) -> ApiSearchResponse {
    let results: Vec<SearchHit> = page.results.iter().map(reshape_hit).collect();
    ApiSearchResponse {
        page_results: results.len(),
        total_results: page.total_size,
        summary: page.summary.map(|s| s.summary_text),
        results,
        error: None,
    }
}

fn reshape_hit(result: &SearchResult) -> SearchHit {
    let document = match &result.document {
        Some(document) => document,
        None => {
            return SearchHit {
                id: result.id.clone(),
                title: "Untitled Video".to_string(),
                uri: String::new(),
                snippet: String::new(),
                thumbnail: String::new(),
            }
        }
    };

    let id = if document.id.is_empty() {
        result.id.clone()
    } else {
        document.id.clone()
    };

    let title = first_string(&document.struct_data, &["video_title", "title", "name"])
        .unwrap_or_else(|| "Untitled Video".to_string());

    let uri = first_string(&document.struct_data, &["video_src", "uri", "url", "link"])
        .map(|u| public_url(&u))
        .unwrap_or_default();

    let snippet = first_string(
        &document.struct_data,
        &[
            "video_desc",
            "document_description",
            "description",
            "snippet",
            "document_transcript",
        ],
    )
    .or_else(|| derived_snippet(&document.derived_struct_data))
    .unwrap_or_default();

    SearchHit {
        id,
        title,
        uri,
        snippet,
        // The page shows a placeholder tile when this is empty
        thumbnail: String::new(),
    }
}

/// First non-empty string among `keys` in a struct_data object.
fn first_string(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        data.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First usable snippet Discovery derived for the document.
fn derived_snippet(derived: &Value) -> Option<String> {
    derived
        .get("snippets")?
        .as_array()?
        .iter()
        .filter_map(|s| s.get("snippet").and_then(Value::as_str))
        .find(|s| !s.is_empty() && *s != NO_SNIPPET_PLACEHOLDER)
        .map(str::to_string)
}

/// Convert a `gs://` URI into its public HTTPS form.
fn public_url(uri: &str) -> String {
    match uri.strip_prefix("gs://") {
        Some(rest) => format!("https://storage.googleapis.com/{}", rest),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sorot_discovery::Document;

    fn hit_with(struct_data: Value, derived: Value) -> SearchResult {
        SearchResult {
            id: "r1".to_string(),
            document: Some(Document {
                id: "d1".to_string(),
                name: "projects/p/dataStores/s/branches/0/documents/d1".to_string(),
                struct_data,
                derived_struct_data: derived,
            }),
        }
    }

    #[test]
    fn test_title_prefers_video_title() {
        let hit = reshape_hit(&hit_with(
            json!({ "video_title": "Derby Highlights", "title": "fallback" }),
            json!({}),
        ));
        assert_eq!(hit.title, "Derby Highlights");

        let hit = reshape_hit(&hit_with(json!({ "name": "last resort" }), json!({})));
        assert_eq!(hit.title, "last resort");

        let hit = reshape_hit(&hit_with(json!({}), json!({})));
        assert_eq!(hit.title, "Untitled Video");
    }

    #[test]
    fn test_uri_converted_to_public_url() {
        let hit = reshape_hit(&hit_with(
            json!({ "uri": "gs://media/processed-segments/match_000.mp4" }),
            json!({}),
        ));
        assert_eq!(
            hit.uri,
            "https://storage.googleapis.com/media/processed-segments/match_000.mp4"
        );

        let hit = reshape_hit(&hit_with(
            json!({ "url": "https://example.com/clip.mp4" }),
            json!({}),
        ));
        assert_eq!(hit.uri, "https://example.com/clip.mp4");
    }

    #[test]
    fn test_snippet_falls_back_to_derived() {
        let derived = json!({
            "snippets": [
                { "snippet": "No snippet is available for this page." },
                { "snippet": "A late goal seals the match." }
            ]
        });
        let hit = reshape_hit(&hit_with(json!({}), derived));
        assert_eq!(hit.snippet, "A late goal seals the match.");
    }

    #[test]
    fn test_struct_data_snippet_wins_over_derived() {
        let hit = reshape_hit(&hit_with(
            json!({ "description": "Segment from match.mp4 at 15s" }),
            json!({ "snippets": [{ "snippet": "derived" }] }),
        ));
        assert_eq!(hit.snippet, "Segment from match.mp4 at 15s");
    }

    #[test]
    fn test_missing_document_keeps_result_id() {
        let result = SearchResult {
            id: "r9".to_string(),
            document: None,
        };
        let hit = reshape_hit(&result);
        assert_eq!(hit.id, "r9");
        assert_eq!(hit.title, "Untitled Video");
        assert!(hit.uri.is_empty());
    }

    #[test]
    fn test_reshape_counts_and_summary() {
        let page = SearchResponse {
            results: vec![hit_with(json!({ "title": "A" }), json!({}))],
            total_size: 42,
            facets: Vec::new(),
            summary: Some(sorot_discovery::Summary {
                summary_text: "One clip matched.".to_string(),
            }),
        };

        let shaped = reshape(page);
        assert_eq!(shaped.page_results, 1);
        assert_eq!(shaped.total_results, 42);
        assert_eq!(shaped.summary.as_deref(), Some("One clip matched."));
        assert!(shaped.error.is_none());
    }
}
