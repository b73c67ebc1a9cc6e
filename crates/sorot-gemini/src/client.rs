//! Vertex AI `generateContent` client.

use crate::error::{GeminiError, GeminiResult};
use crate::prompts;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sorot_auth::TokenProvider;
use sorot_config::{GcpConfig, GeminiConfig};
use sorot_core::{GcsUri, GlobalContext, SegmentAnalysis, VideoKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for multimodal video analysis.
///
/// Videos are passed by `gs://` URI, so the model reads them straight from
/// the bucket and nothing is re-uploaded here.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    project_id: String,
    location: String,
    model: String,
    timeout_seconds: u64,
    auth: Arc<TokenProvider>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct FileData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "fileUri")]
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiClient {
    pub fn from_config(
        gcp: &GcpConfig,
        gemini: &GeminiConfig,
        auth: Arc<TokenProvider>,
    ) -> GeminiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(gemini.timeout_seconds))
            .build()
            .map_err(GeminiError::Http)?;

        let base_url = if gcp.location == "global" {
            "https://aiplatform.googleapis.com".to_string()
        } else {
            format!("https://{}-aiplatform.googleapis.com", gcp.location)
        };

        Ok(Self {
            client,
            base_url,
            project_id: gcp.project_id.clone(),
            location: gcp.location.clone(),
            model: gemini.model.clone(),
            timeout_seconds: gemini.timeout_seconds,
            auth,
        })
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Classify a stored video as sports or soap-opera content.
    ///
    /// Any API failure or unrecognized reply maps to [`VideoKind::Unknown`]
    /// so the pipeline can keep going.
    pub async fn classify(&self, video: &GcsUri) -> VideoKind {
        debug!("Determining video type for {}", video);
        let parts = vec![text_part(prompts::CLASSIFY), video_part(video)];

        match self.generate(parts, false).await {
            Ok(reply) => {
                let kind = VideoKind::from_str(reply.trim()).unwrap_or(VideoKind::Unknown);
                info!("Video type for {} is {}", video, kind);
                kind
            }
            Err(e) => {
                warn!("Failed to determine video type for {}: {}", video, e);
                VideoKind::Unknown
            }
        }
    }

    /// Extract whole-video context: team rosters for sports, character
    /// casts for soap operas.
    ///
    /// Returns `None` for unclassified videos and on any API or parse
    /// failure; segment analysis then runs without a context block.
    pub async fn global_context(&self, video: &GcsUri, kind: VideoKind) -> Option<GlobalContext> {
        let prompt = prompts::context_prompt(kind)?;

        debug!("Generating global context for {}", video);
        let parts = vec![text_part(prompt), video_part(video)];

        match self.generate(parts, true).await {
            Ok(reply) => match serde_json::from_str(strip_fences(&reply)) {
                Ok(context) => {
                    info!("Generated global context for {}", video);
                    Some(context)
                }
                Err(e) => {
                    warn!("Failed to parse global context for {}: {}", video, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to generate global context for {}: {}", video, e);
                None
            }
        }
    }

    /// Analyze one segment clip.
    ///
    /// Errors propagate so the caller can drop just that segment. A clip
    /// from an unclassified video yields an empty analysis without a call.
    pub async fn analyze_segment(
        &self,
        clip: &GcsUri,
        kind: VideoKind,
        context: Option<&GlobalContext>,
    ) -> GeminiResult<SegmentAnalysis> {
        let prompt = match prompts::segment_prompt(kind, context)? {
            Some(prompt) => prompt,
            None => return Ok(SegmentAnalysis::default()),
        };

        debug!("Analyzing {} with model {}", clip, self.model);
        let parts = vec![text_part(&prompt), video_part(clip)];
        let reply = self.generate(parts, true).await?;

        serde_json::from_str(strip_fences(&reply))
            .map_err(|e| GeminiError::ParseError(format!("segment analysis: {}", e)))
    }

    async fn generate(&self, parts: Vec<Part>, json_response: bool) -> GeminiResult<String> {
        let token = self.auth.token().await?;
        let url = format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.base_url, self.project_id, self.location, self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: if json_response {
                Some(GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                })
            } else {
                None
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeminiError::Timeout {
                        seconds: self.timeout_seconds,
                    }
                } else {
                    GeminiError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .find_map(|part| match part {
                        Part::Text { text } => Some(text),
                        _ => None,
                    })
            })
            .ok_or_else(|| GeminiError::ParseError("no text in model response".to_string()))
    }
}

fn text_part(text: &str) -> Part {
    Part::Text {
        text: text.to_string(),
    }
}

fn video_part(uri: &GcsUri) -> Part {
    Part::File {
        file_data: FileData {
            mime_type: "video/mp4".to_string(),
            file_uri: uri.to_string(),
        },
    }
}

/// Strip the markdown code fences models sometimes wrap around JSON.
fn strip_fences(reply: &str) -> &str {
    reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str =
        "/v1/projects/proj/locations/global/publishers/google/models/gemini-2.5-pro:generateContent";

    fn test_client(server: &MockServer) -> GeminiClient {
        std::env::set_var("GOOGLE_ACCESS_TOKEN", "test-token");
        let gcp = GcpConfig {
            project_id: "proj".to_string(),
            location: "global".to_string(),
        };
        let gemini = GeminiConfig {
            model: "gemini-2.5-pro".to_string(),
            timeout_seconds: 30,
        };
        GeminiClient::from_config(&gcp, &gemini, Arc::new(TokenProvider::new().unwrap()))
            .unwrap()
            .with_base_url(server.uri())
    }

    fn text_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]}
            }]
        })
    }

    #[tokio::test]
    async fn test_classify_normalizes_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Sports\n")))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let kind = client
            .classify(&GcsUri::new("bkt", "videos/match.mp4"))
            .await;
        assert_eq!(kind, VideoKind::Sports);
    }

    #[tokio::test]
    async fn test_classify_failure_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let kind = client
            .classify(&GcsUri::new("bkt", "videos/match.mp4"))
            .await;
        assert_eq!(kind, VideoKind::Unknown);
    }

    #[tokio::test]
    async fn test_global_context_parses_fenced_json() {
        let server = MockServer::start().await;
        let fenced =
            "```json\n{\"teams\": [{\"name\": \"Persebaya Surabaya\", \"short_name\": \"PBY\"}]}\n```";
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(fenced)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let context = client
            .global_context(&GcsUri::new("bkt", "videos/match.mp4"), VideoKind::Sports)
            .await
            .unwrap();
        match context {
            GlobalContext::Sports { teams } => {
                assert_eq!(teams.len(), 1);
                assert_eq!(teams[0].short_name, "PBY");
            }
            other => panic!("expected sports context, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_global_context_unknown_kind_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("{}")))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let context = client
            .global_context(&GcsUri::new("bkt", "videos/v.mp4"), VideoKind::Unknown)
            .await;
        assert!(context.is_none());
    }

    #[tokio::test]
    async fn test_global_context_bad_json_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("not json")))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let context = client
            .global_context(&GcsUri::new("bkt", "videos/v.mp4"), VideoKind::Sports)
            .await;
        assert!(context.is_none());
    }

    #[tokio::test]
    async fn test_analyze_segment() {
        let server = MockServer::start().await;
        let analysis = r##"{"description": "A long shot on goal.",
            "persons": [{"name": "Bruno Moreira", "role": "player"}],
            "organizations": [], "hash_tags": ["#LongShot"]}"##;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(analysis)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let analysis = client
            .analyze_segment(
                &GcsUri::new("bkt", "processed-segments/clip_0001.mp4"),
                VideoKind::Sports,
                None,
            )
            .await
            .unwrap();
        assert_eq!(analysis.description, "A long shot on goal.");
        assert_eq!(analysis.persons[0].role, "player");
        assert_eq!(analysis.hash_tags, vec!["#LongShot"]);
    }

    #[tokio::test]
    async fn test_analyze_segment_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .analyze_segment(
                &GcsUri::new("bkt", "processed-segments/clip_0001.mp4"),
                VideoKind::Sports,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::ApiError { status: 429, .. }));
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_fences("```\n{}\n```"), "{}");
    }
}
