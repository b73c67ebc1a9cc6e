//! FFmpeg integration for video segmentation.

use crate::error::{MediaError, MediaResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Split a video into fixed-duration segments with the stream-copy muxer.
///
/// Segments land in `out_dir` as `{stem}_0000.mp4`, `{stem}_0001.mp4`, ...
/// The last segment is usually shorter than `segment_seconds`. Returns the
/// produced paths sorted by name.
pub fn split_into_segments(
    input: &Path,
    out_dir: &Path,
    segment_seconds: u32,
) -> MediaResult<Vec<PathBuf>> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    if which::which("ffmpeg").is_err() {
        return Err(MediaError::ToolNotFound {
            tool: "ffmpeg".to_string(),
        });
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("segment");
    let pattern = out_dir.join(format!("{}_%04d.mp4", stem));

    info!("Splitting {:?} into {}s segments", input, segment_seconds);

    let output = Command::new("ffmpeg")
        .args(["-i"])
        .arg(input)
        .args([
            "-f", "segment",
            "-segment_time", &segment_seconds.to_string(),
            "-reset_timestamps", "1",
            "-c", "copy",
        ])
        .arg(&pattern)
        .output()?;

    if !output.status.success() {
        return Err(MediaError::FfmpegError(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    // Collect the produced segments, never the input (it may share the dir).
    let prefix = format!("{}_", stem);
    let mut segments: Vec<PathBuf> = walkdir::WalkDir::new(out_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension().map(|e| e == "mp4").unwrap_or(false)
                && path != input
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&prefix))
                    .unwrap_or(false)
        })
        .collect();
    segments.sort();

    debug!("Produced {} segments", segments.len());
    Ok(segments)
}

/// Measure a media file's duration in seconds with ffprobe.
pub fn probe_duration(path: &Path) -> MediaResult<f64> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    if which::which("ffprobe").is_err() {
        return Err(MediaError::ToolNotFound {
            tool: "ffprobe".to_string(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
        ])
        .arg(path)
        .output()?;

    if !output.status.success() {
        return Err(MediaError::FfmpegError(
            String::from_utf8_lossy(&output.stderr).to_string(),
        ));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the `format.duration` field out of ffprobe's JSON output.
pub fn parse_probe_duration(json_str: &str) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_str(json_str)
        .map_err(|e| MediaError::ParseError(format!("Failed to parse ffprobe output: {}", e)))?;

    probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| {
            MediaError::ParseError("ffprobe output missing format.duration".to_string())
        })
}
