//! Sorot Media - Video segmentation via FFmpeg.
//!
//! This crate provides:
//! - Fixed-duration video segmentation (via FFmpeg CLI)
//! - Duration probing (via ffprobe CLI)
//!
//! These rely on external tools being installed on the system.

mod error;
mod ffmpeg;

pub use error::{MediaError, MediaResult};
pub use ffmpeg::{parse_probe_duration, probe_duration, split_into_segments};

/// Check if required external tools are available.
pub fn check_dependencies() -> Vec<(&'static str, bool)> {
    vec![
        ("ffmpeg", which::which("ffmpeg").is_ok()),
        ("ffprobe", which::which("ffprobe").is_ok()),
    ]
}

/// Check if all required tools are installed.
pub fn all_tools_available() -> bool {
    check_dependencies().iter().all(|(_, available)| *available)
}
