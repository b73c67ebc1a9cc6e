//! Access-token resolution for Google Cloud APIs.

use crate::error::{AuthError, AuthResult};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

const METADATA_HOST: &str = "http://metadata.google.internal";
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh cached tokens this long before they expire.
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// gcloud does not report an expiry; assume a conservative lifetime.
const GCLOUD_TOKEN_LIFETIME_SECONDS: i64 = 1800;

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + ChronoDuration::seconds(REFRESH_MARGIN_SECONDS) < self.expires_at
    }
}

/// Resolves OAuth2 bearer tokens for Google API calls.
///
/// Sources are tried in order: the `GOOGLE_ACCESS_TOKEN` environment
/// variable, the GCE metadata server, then the `gcloud` CLI. Tokens from
/// the latter two are cached until shortly before expiry.
pub struct TokenProvider {
    client: Client,
    metadata_host: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new() -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(AuthError::Http)?;

        Ok(Self {
            client,
            metadata_host: METADATA_HOST.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Override the metadata server address.
    pub fn with_metadata_host(mut self, host: impl Into<String>) -> Self {
        self.metadata_host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Return a bearer token, fetching or refreshing as needed.
    pub async fn token(&self) -> AuthResult<String> {
        if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }

        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh() {
                return Ok(entry.token.clone());
            }
        }

        let entry = match self.fetch_from_metadata().await {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Metadata server unavailable: {}", e);
                self.fetch_from_gcloud()?
            }
        };

        let token = entry.token.clone();
        *cached = Some(entry);
        Ok(token)
    }

    async fn fetch_from_metadata(&self) -> AuthResult<CachedToken> {
        let url = format!("{}{}", self.metadata_host, METADATA_TOKEN_PATH);
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::MetadataError { status, message });
        }

        let body: MetadataToken = response.json().await?;
        debug!(
            "Obtained token from metadata server, expires in {}s",
            body.expires_in
        );
        Ok(CachedToken {
            token: body.access_token,
            expires_at: Utc::now() + ChronoDuration::seconds(body.expires_in),
        })
    }

    fn fetch_from_gcloud(&self) -> AuthResult<CachedToken> {
        if which::which("gcloud").is_err() {
            return Err(AuthError::NoCredentials);
        }

        let output = std::process::Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AuthError::GcloudFailed(stderr.trim().to_string()));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(AuthError::GcloudFailed(
                "empty token from gcloud".to_string(),
            ));
        }

        info!("Obtained token from gcloud CLI");
        Ok(CachedToken {
            token,
            expires_at: Utc::now() + ChronoDuration::seconds(GCLOUD_TOKEN_LIFETIME_SECONDS),
        })
    }
}
