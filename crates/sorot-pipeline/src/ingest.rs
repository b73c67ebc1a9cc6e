//! Playlist ingestion with yt-dlp.

use crate::error::{PipelineError, PipelineResult};
use sorot_config::Config;
use sorot_core::GcsUri;
use sorot_gcs::StorageClient;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Outcome of one playlist entry.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Downloaded and uploaded; the local copy was removed.
    Uploaded(GcsUri),
    /// The download failed; nothing was produced.
    DownloadFailed { id: String, message: String },
    /// The upload failed; the local file is kept for a retry.
    UploadFailed { path: PathBuf, message: String },
}

/// Summary of one ingest run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<IngestOutcome>,
}

impl IngestReport {
    pub fn uploaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, IngestOutcome::Uploaded(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.uploaded()
    }
}

/// Downloads the first entries of a YouTube playlist and stores them in
/// the video bucket.
pub struct PlaylistIngestor {
    storage: StorageClient,
    bucket: String,
    video_prefix: String,
    title_prefix: String,
    download_dir: PathBuf,
}

impl PlaylistIngestor {
    pub fn new(storage: StorageClient, config: &Config) -> Self {
        Self {
            storage,
            bucket: config.storage.bucket.clone(),
            video_prefix: config.storage.video_prefix.clone(),
            title_prefix: config.storage.title_prefix.clone(),
            download_dir: config.ingest.download_path(),
        }
    }

    /// Ingest up to `count` entries from the playlist.
    ///
    /// Each entry is downloaded, uploaded and removed locally before the
    /// next one starts, so the staging directory never holds more than one
    /// video at a time.
    pub async fn run(&self, playlist_id: &str, count: u32) -> PipelineResult<IngestReport> {
        which::which("yt-dlp").map_err(|_| PipelineError::ToolNotFound {
            tool: "yt-dlp".to_string(),
        })?;

        std::fs::create_dir_all(&self.download_dir)?;

        let url = playlist_url(playlist_id);
        info!("Listing the first {} entries of {}", count, url);
        let ids = list_entries(&url, count)?;
        info!("Found {} playlist entries", ids.len());

        let mut report = IngestReport::default();
        for id in ids {
            let path = match download_entry(&id, &self.download_dir) {
                Ok(path) => path,
                Err(e) => {
                    warn!("Download failed for {}: {}", id, e);
                    report.outcomes.push(IngestOutcome::DownloadFailed {
                        id,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            info!("Finished downloading {}", path.display());

            match self.upload(&path).await {
                Ok(uri) => {
                    if let Err(e) = std::fs::remove_file(&path) {
                        warn!("Could not remove local file {}: {}", path.display(), e);
                    }
                    report.outcomes.push(IngestOutcome::Uploaded(uri));
                }
                Err(e) => {
                    warn!(
                        "Upload failed for {}: {}. Keeping the local file.",
                        path.display(),
                        e
                    );
                    report.outcomes.push(IngestOutcome::UploadFailed {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        remove_dir_if_empty(&self.download_dir);
        Ok(report)
    }

    async fn upload(&self, path: &Path) -> PipelineResult<GcsUri> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let object = format!("{}/{}{}", self.video_prefix, self.title_prefix, name);
        let uri = self
            .storage
            .upload_file(&self.bucket, &object, path, "video/mp4")
            .await?;
        Ok(uri)
    }
}

fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

fn list_entries(playlist_url: &str, count: u32) -> PipelineResult<Vec<String>> {
    let output = Command::new("yt-dlp")
        .args(["--flat-playlist", "--print", "id"])
        .arg(playlist_url)
        .output()?;

    if !output.status.success() {
        return Err(tool_failed(&output.stderr));
    }

    let ids = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .take(count as usize)
        .collect();
    Ok(ids)
}

/// Download one video, letting yt-dlp name the file after the title, and
/// return the path it reports.
fn download_entry(id: &str, download_dir: &Path) -> PipelineResult<PathBuf> {
    let template = download_dir.join("%(title)s.%(ext)s");
    let output = Command::new("yt-dlp")
        .args(["-f", "best", "--no-playlist", "--no-simulate"])
        .args(["--print", "after_move:filepath"])
        .arg("-o")
        .arg(&template)
        .arg(format!("https://www.youtube.com/watch?v={}", id))
        .output()?;

    if !output.status.success() {
        return Err(tool_failed(&output.stderr));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| PipelineError::ToolFailed {
            tool: "yt-dlp".to_string(),
            message: "did not report a downloaded file".to_string(),
        })
}

fn tool_failed(stderr: &[u8]) -> PipelineError {
    PipelineError::ToolFailed {
        tool: "yt-dlp".to_string(),
        message: String::from_utf8_lossy(stderr).trim().to_string(),
    }
}

fn remove_dir_if_empty(dir: &Path) {
    let is_empty = std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if !is_empty {
        return;
    }
    match std::fs::remove_dir(dir) {
        Ok(()) => info!("Removed empty download directory {}", dir.display()),
        Err(e) => warn!("Could not remove {}: {}", dir.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_url() {
        assert_eq!(
            playlist_url("PLx123"),
            "https://www.youtube.com/playlist?list=PLx123"
        );
    }

    #[test]
    fn test_remove_dir_if_empty() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("downloads");
        std::fs::create_dir(&staging).unwrap();

        remove_dir_if_empty(&staging);
        assert!(!staging.exists());
    }

    #[test]
    fn test_remove_dir_if_empty_keeps_populated_dir() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("downloads");
        std::fs::create_dir(&staging).unwrap();
        std::fs::write(staging.join("video.mp4"), b"bytes").unwrap();

        remove_dir_if_empty(&staging);
        assert!(staging.exists());
    }

    #[test]
    fn test_report_counts() {
        let report = IngestReport {
            outcomes: vec![
                IngestOutcome::Uploaded(GcsUri::new("bkt", "videos/a.mp4")),
                IngestOutcome::DownloadFailed {
                    id: "x1".to_string(),
                    message: "unavailable".to_string(),
                },
                IngestOutcome::UploadFailed {
                    path: PathBuf::from("downloads/b.mp4"),
                    message: "denied".to_string(),
                },
            ],
        };
        assert_eq!(report.uploaded(), 1);
        assert_eq!(report.failed(), 2);
    }
}
