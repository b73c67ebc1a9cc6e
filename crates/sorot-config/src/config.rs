//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gcp: GcpConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&paths.config_file)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Sorot Configuration
# Broadcast video indexing and search

[gcp]
# Google Cloud project that owns the bucket, models and search engine
project_id = ""

# Location of the Vertex AI Search resources (e.g., "global" or "us")
location = "global"

[storage]
# GCS bucket holding source videos, segments and import files
bucket = ""

# Folder for uploaded source videos
video_prefix = "videos"

# Folder for processed video segments
segment_prefix = "processed-segments"

# Folder for the JSONL files handed to the import job
jsonl_prefix = "discovery-engine-data"

# Prefix prepended to uploaded video names (e.g., a library label)
title_prefix = ""

[gemini]
# Multimodal model for video analysis
model = "gemini-2.5-pro"

# Request timeout in seconds
timeout_seconds = 300

[search]
# Vertex AI Search data store that receives imports
data_store_id = ""

# Search engine serving the query frontend
engine_id = ""

# Results per page
page_size = 10

# Segments summarized per query
summary_result_count = 5

# Viewer time zone reported with each query
time_zone = "Asia/Jakarta"

[ingest]
# YouTube playlist to pull source videos from
playlist_id = ""

# How many playlist entries to ingest per run
num_videos = 5

# Local staging directory for downloads
download_dir = "downloads"

[pipeline]
# Nominal segment length in seconds
segment_duration_seconds = 15

[web]
# Bind address for the sorot-web frontend
host = "0.0.0.0"
port = 3000
"#
        .to_string()
    }

    /// Check that the values the indexing pipeline needs are present.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut missing = Vec::new();
        if self.gcp.project_id.is_empty() {
            missing.push("gcp.project_id");
        }
        if self.storage.bucket.is_empty() {
            missing.push("storage.bucket");
        }
        if self.search.data_store_id.is_empty() {
            missing.push("search.data_store_id");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "missing required values: {}",
                missing.join(", ")
            )))
        }
    }

    /// Check that the values the query frontend needs are present.
    pub fn validate_search(&self) -> ConfigResult<()> {
        let mut missing = Vec::new();
        if self.gcp.project_id.is_empty() {
            missing.push("gcp.project_id");
        }
        if self.search.engine_id.is_empty() {
            missing.push("search.engine_id");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "missing required values: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Google Cloud project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpConfig {
    pub project_id: String,
    pub location: String,
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: "global".to_string(),
        }
    }
}

/// Object storage layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    pub video_prefix: String,
    pub segment_prefix: String,
    pub jsonl_prefix: String,
    pub title_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            video_prefix: "videos".to_string(),
            segment_prefix: "processed-segments".to_string(),
            jsonl_prefix: "discovery-engine-data".to_string(),
            title_prefix: String::new(),
        }
    }
}

/// Multimodal analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Vertex AI Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub data_store_id: String,
    pub engine_id: String,
    pub page_size: u32,
    pub summary_result_count: u32,
    pub time_zone: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            data_store_id: String::new(),
            engine_id: String::new(),
            page_size: 10,
            summary_result_count: 5,
            time_zone: "Asia/Jakarta".to_string(),
        }
    }
}

/// Playlist ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub playlist_id: String,
    pub num_videos: u32,
    pub download_dir: String,
}

impl IngestConfig {
    /// Download directory with `~` expanded.
    pub fn download_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.download_dir).into_owned())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            playlist_id: String::new(),
            num_videos: 5,
            download_dir: "downloads".to_string(),
        }
    }
}

/// Segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub segment_duration_seconds: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segment_duration_seconds: 15,
        }
    }
}

/// Query frontend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gcp.location, "global");
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.pipeline.segment_duration_seconds, 15);
        assert_eq!(config.storage.segment_prefix, "processed-segments");
        assert_eq!(config.search.time_zone, "Asia/Jakarta");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.storage.bucket, deserialized.storage.bucket);
        assert_eq!(config.search.page_size, deserialized.search.page_size);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [gcp]
            project_id = "my-project"

            [storage]
            bucket = "my-bucket"
            "#
        )
        .unwrap();

        let path = temp_file.path().to_path_buf();
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.gcp.project_id, "my-project");
        assert_eq!(config.storage.bucket, "my-bucket");
        // Defaults should still work
        assert_eq!(config.gcp.location, "global");
        assert_eq!(config.storage.video_prefix, "videos");
    }

    #[test]
    fn test_validate_lists_missing_keys() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("gcp.project_id"));
        assert!(msg.contains("storage.bucket"));
        assert!(msg.contains("search.data_store_id"));

        let mut config = Config::default();
        config.gcp.project_id = "p".to_string();
        config.storage.bucket = "b".to_string();
        config.search.data_store_id = "d".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.search.page_size, 10);
        assert_eq!(config.web.port, 3000);
    }

    #[test]
    fn test_download_path_plain_dirs() {
        let ingest = IngestConfig {
            download_dir: "downloads".to_string(),
            ..Default::default()
        };
        assert_eq!(ingest.download_path(), PathBuf::from("downloads"));

        let ingest = IngestConfig {
            download_dir: "/tmp/stage".to_string(),
            ..Default::default()
        };
        assert_eq!(ingest.download_path(), PathBuf::from("/tmp/stage"));
    }
}
