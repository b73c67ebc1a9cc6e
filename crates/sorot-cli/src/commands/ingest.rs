//! Playlist ingestion command.

use super::{load_validated_config, token_provider};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sorot_gcs::StorageClient;
use sorot_pipeline::{IngestOutcome, PlaylistIngestor};
use std::time::Duration;
use tokio::runtime::Runtime;

pub fn run(playlist: Option<String>, count: Option<u32>) -> Result<()> {
    let config = load_validated_config()?;

    let playlist_id = playlist.unwrap_or_else(|| config.ingest.playlist_id.clone());
    if playlist_id.is_empty() {
        anyhow::bail!("No playlist given. Pass --playlist <id> or set ingest.playlist_id.");
    }
    let count = count.unwrap_or(config.ingest.num_videos);

    let auth = token_provider()?;
    let storage = StorageClient::new(auth).context("Failed to create storage client")?;
    let ingestor = PlaylistIngestor::new(storage, &config);

    println!(
        "{} up to {} videos from playlist {}",
        "Ingesting:".cyan().bold(),
        count,
        playlist_id
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Downloading and uploading playlist entries...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let report = rt.block_on(ingestor.run(&playlist_id, count))?;
    pb.finish_and_clear();

    println!();
    for outcome in &report.outcomes {
        match outcome {
            IngestOutcome::Uploaded(uri) => {
                println!("  {} {}", "✓".green(), uri);
            }
            IngestOutcome::DownloadFailed { id, message } => {
                println!("  {} {}: {}", "✗".red(), id, message);
            }
            IngestOutcome::UploadFailed { path, message } => {
                println!(
                    "  {} {}: {} (local file kept)",
                    "✗".red(),
                    path.display(),
                    message
                );
            }
        }
    }

    println!();
    println!(
        "{} {} video{}",
        "Uploaded:".green().bold(),
        report.uploaded(),
        if report.uploaded() == 1 { "" } else { "s" }
    );
    if report.failed() > 0 {
        println!("{} {}", "Failed:".red().bold(), report.failed());
    }

    Ok(())
}
