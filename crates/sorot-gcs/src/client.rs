//! Cloud Storage JSON API client.

use crate::error::{StorageError, StorageResult};
use futures_util::StreamExt;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use sorot_auth::TokenProvider;
use sorot_core::GcsUri;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";

/// Client for the Cloud Storage JSON API.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    auth: Arc<TokenProvider>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectResource>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectResource {
    name: String,
}

impl StorageClient {
    pub fn new(auth: Arc<TokenProvider>) -> StorageResult<Self> {
        // No overall timeout: video uploads and downloads can run long.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(StorageError::Http)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            auth,
        })
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Upload a local file as `gs://{bucket}/{object}`.
    pub async fn upload_file(
        &self,
        bucket: &str,
        object: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<GcsUri> {
        let token = self.auth.token().await?;
        let url = self.upload_url(bucket, object)?;

        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        debug!(
            "Uploading {} ({} bytes) to gs://{}/{}",
            path.display(),
            len,
            bucket,
            object
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CONTENT_LENGTH, len)
            .body(body)
            .send()
            .await?;

        let uri = GcsUri::new(bucket, object);
        error_for_status(response, &uri.to_string()).await?;
        info!("Uploaded {}", uri);
        Ok(uri)
    }

    /// Download an object to a local path, streaming chunk by chunk.
    pub async fn download_to_path(&self, uri: &GcsUri, dest: &Path) -> StorageResult<()> {
        let token = self.auth.token().await?;
        let mut url = self.object_url(uri.bucket(), uri.object())?;
        url.set_query(Some("alt=media"));

        debug!("Downloading {} to {}", uri, dest.display());

        let response = self.client.get(url).bearer_auth(&token).send().await?;
        let response = error_for_status(response, &uri.to_string()).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        info!("Downloaded {} to {}", uri, dest.display());
        Ok(())
    }

    /// List object names under a prefix, following pagination.
    pub async fn list_objects(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        let token = self.auth.token().await?;
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.base(&["storage", "v1", "b", bucket, "o"])?;
            {
                let mut pairs = url.query_pairs_mut();
                if !prefix.is_empty() {
                    pairs.append_pair("prefix", prefix);
                }
                if let Some(ref tok) = page_token {
                    pairs.append_pair("pageToken", tok);
                }
            }

            let response = self.client.get(url).bearer_auth(&token).send().await?;
            let response = error_for_status(response, bucket).await?;
            let page: ListResponse = response.json().await?;

            for item in page.items {
                names.push(item.name);
            }
            match page.next_page_token {
                Some(tok) => page_token = Some(tok),
                None => break,
            }
        }

        debug!("Listed {} objects under gs://{}/{}", names.len(), bucket, prefix);
        Ok(names)
    }

    /// Delete an object.
    pub async fn delete_object(&self, uri: &GcsUri) -> StorageResult<()> {
        let token = self.auth.token().await?;
        let url = self.object_url(uri.bucket(), uri.object())?;

        let response = self.client.delete(url).bearer_auth(&token).send().await?;
        error_for_status(response, &uri.to_string()).await?;
        debug!("Deleted {}", uri);
        Ok(())
    }

    fn base(&self, segments: &[&str]) -> StorageResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidUrl(self.base_url.clone()))?
            .extend(segments);
        Ok(url)
    }

    /// Object URL with the object name encoded as a single path segment.
    fn object_url(&self, bucket: &str, object: &str) -> StorageResult<Url> {
        self.base(&["storage", "v1", "b", bucket, "o", object])
    }

    fn upload_url(&self, bucket: &str, object: &str) -> StorageResult<Url> {
        let mut url = self.base(&["upload", "storage", "v1", "b", bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object);
        Ok(url)
    }
}

async fn error_for_status(response: Response, what: &str) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(StorageError::NotFound(what.to_string()));
    }
    let message = response.text().await.unwrap_or_default();
    Err(StorageError::ApiError {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> StorageClient {
        std::env::set_var("GOOGLE_ACCESS_TOKEN", "test-token");
        StorageClient::new(Arc::new(TokenProvider::new().unwrap()))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[test]
    fn test_object_url_encodes_slashes() {
        std::env::set_var("GOOGLE_ACCESS_TOKEN", "test-token");
        let client = StorageClient::new(Arc::new(TokenProvider::new().unwrap()))
            .unwrap()
            .with_base_url("https://storage.googleapis.com");

        let url = client.object_url("bkt", "videos/match day.mp4").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/bkt/o/videos%2Fmatch%20day.mp4"
        );
    }

    #[tokio::test]
    async fn test_upload_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/bkt/o"))
            .and(query_param("uploadType", "media"))
            .and(query_param("name", "videos/match.mp4"))
            .and(body_string("fake video bytes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "videos/match.mp4"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "fake video bytes").unwrap();

        let client = test_client(&server);
        let uri = client
            .upload_file("bkt", "videos/match.mp4", file.path(), "video/mp4")
            .await
            .unwrap();
        assert_eq!(uri.to_string(), "gs://bkt/videos/match.mp4");
    }

    #[tokio::test]
    async fn test_download_to_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/bkt/o/clip.mp4"))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"segment bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.mp4");

        let client = test_client(&server);
        let uri = GcsUri::new("bkt", "clip.mp4");
        client.download_to_path(&uri, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"segment bytes");
    }

    #[tokio::test]
    async fn test_download_missing_object_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/bkt/o/missing.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server);
        let uri = GcsUri::new("bkt", "missing.mp4");
        let err = client
            .download_to_path(&uri, &dir.path().join("missing.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_objects_follows_pagination() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b/bkt/o"))
            .and(query_param("prefix", "videos/"))
            .and(query_param("pageToken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"name": "videos/b.mp4"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b/bkt/o"))
            .and(query_param("prefix", "videos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"name": "videos/a.mp4"}],
                "nextPageToken": "next"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let names = client.list_objects("bkt", "videos/").await.unwrap();
        assert_eq!(names, vec!["videos/a.mp4", "videos/b.mp4"]);
    }
}
