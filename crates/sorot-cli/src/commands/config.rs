//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use sorot_config::Config;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'sorot init' first.");
    }

    let contents =
        std::fs::read_to_string(&paths.config_file).context("Failed to read config file")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config =
        Config::load_from(&paths.config_file).context("Failed to load config")?;

    // Parse key path (e.g., "gcp.project_id")
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["gcp", "project_id"] => config.gcp.project_id = value.to_string(),
        ["gcp", "location"] => config.gcp.location = value.to_string(),
        ["storage", "bucket"] => config.storage.bucket = value.to_string(),
        ["storage", "video_prefix"] => config.storage.video_prefix = value.to_string(),
        ["storage", "segment_prefix"] => config.storage.segment_prefix = value.to_string(),
        ["storage", "jsonl_prefix"] => config.storage.jsonl_prefix = value.to_string(),
        ["storage", "title_prefix"] => config.storage.title_prefix = value.to_string(),
        ["gemini", "model"] => config.gemini.model = value.to_string(),
        ["gemini", "timeout_seconds"] => {
            config.gemini.timeout_seconds = value.parse().context("Invalid timeout value")?;
        }
        ["search", "data_store_id"] => config.search.data_store_id = value.to_string(),
        ["search", "engine_id"] => config.search.engine_id = value.to_string(),
        ["search", "page_size"] => {
            config.search.page_size = value.parse().context("Invalid page_size value")?;
        }
        ["search", "summary_result_count"] => {
            config.search.summary_result_count =
                value.parse().context("Invalid summary_result_count value")?;
        }
        ["search", "time_zone"] => config.search.time_zone = value.to_string(),
        ["ingest", "playlist_id"] => config.ingest.playlist_id = value.to_string(),
        ["ingest", "num_videos"] => {
            config.ingest.num_videos = value.parse().context("Invalid num_videos value")?;
        }
        ["ingest", "download_dir"] => config.ingest.download_dir = value.to_string(),
        ["pipeline", "segment_duration_seconds"] => {
            config.pipeline.segment_duration_seconds = value
                .parse()
                .context("Invalid segment_duration_seconds value")?;
        }
        ["web", "host"] => config.web.host = value.to_string(),
        ["web", "port"] => {
            config.web.port = value.parse().context("Invalid port value")?;
        }
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    config
        .save_to(&paths.config_file)
        .context("Failed to save config")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}
