//! Indexing command - segment, analyze and publish stored videos.

use super::{load_validated_config, token_provider};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sorot_config::Config;
use sorot_core::GcsUri;
use sorot_discovery::DiscoveryClient;
use sorot_gcs::StorageClient;
use sorot_gemini::GeminiClient;
use sorot_pipeline::{DocumentBuilder, VideoIndexer};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

pub fn run(video_uri: Option<String>, all: bool) -> Result<()> {
    let config = load_validated_config()?;

    // ffmpeg and ffprobe have to be on PATH before anything is downloaded
    for (tool, available) in sorot_media::check_dependencies() {
        if !available {
            anyhow::bail!("'{}' not found in PATH. Install it and try again.", tool);
        }
    }

    let indexer = build_indexer(&config)?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    if all {
        return run_all(&rt, &indexer);
    }

    let uri = video_uri
        .context("Nothing to index. Pass --video-uri gs://bucket/videos/name.mp4 or --all.")?;
    let video = GcsUri::parse(&uri)?;
    run_single(&rt, &indexer, &video)
}

/// Index every video under the configured video prefix.
fn run_all(rt: &Runtime, indexer: &VideoIndexer) -> Result<()> {
    let videos = rt.block_on(indexer.list_videos())?;

    if videos.is_empty() {
        println!(
            "{}",
            "No videos found under the configured video prefix.".yellow()
        );
        return Ok(());
    }

    println!(
        "{} {} video{}",
        "Indexing:".cyan().bold(),
        videos.len(),
        if videos.len() == 1 { "" } else { "s" }
    );
    println!("{}", "─".repeat(70));

    let mut failed = 0;
    for video in &videos {
        match rt.block_on(indexer.index_video(video)) {
            Ok(outcome) => {
                let import = match &outcome.operation {
                    Some(operation) => format!("import {}", operation),
                    None => "nothing to import".to_string(),
                };
                println!(
                    "  {} {} ({}, {} segments, {} documents, {})",
                    "✓".green(),
                    video,
                    outcome.kind,
                    outcome.segments,
                    outcome.documents,
                    import
                );
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), video, e);
            }
        }
    }

    println!();
    println!(
        "{} {} of {} videos",
        "Indexed:".green().bold(),
        videos.len() - failed,
        videos.len()
    );
    if failed > 0 {
        println!("{} {}", "Failed:".red().bold(), failed);
    }

    Ok(())
}

/// Index a single video with per-stage progress output.
fn run_single(rt: &Runtime, indexer: &VideoIndexer, video: &GcsUri) -> Result<()> {
    println!("{} {}", "Indexing:".cyan().bold(), video);
    println!("{}", "─".repeat(70));

    let pb = spinner("Downloading and splitting into segments...")?;
    let clips = rt.block_on(indexer.prepare_segments(video))?;
    pb.finish_and_clear();
    println!(
        "  {} Prepared {} segment{}",
        "✓".green(),
        clips.len(),
        if clips.len() == 1 { "" } else { "s" }
    );

    if clips.is_empty() {
        println!("{}", "Nothing to analyze.".yellow());
        return Ok(());
    }

    let pb = spinner("Determining video type...")?;
    let kind = rt.block_on(indexer.classify(video));
    pb.finish_and_clear();
    println!("  {} Video type: {}", "✓".green(), kind.to_string().bold());

    let pb = spinner("Extracting global context...")?;
    let context = rt.block_on(indexer.global_context(video, kind));
    pb.finish_and_clear();
    match &context {
        Some(_) => println!("  {} Extracted global context", "✓".green()),
        None => println!("  {} No global context available", "Note:".yellow()),
    }

    println!();
    println!("{}", "Analyzing segments...".cyan().bold());
    let bar = ProgressBar::new(clips.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut builder = DocumentBuilder::new(video.file_name(), kind);
    for clip in &clips {
        bar.set_message(clip.uri.file_name().to_string());
        let analysis = rt.block_on(indexer.analyze_clip(clip, kind, context.as_ref()));
        builder.push(clip, analysis);
        bar.inc(1);
    }
    bar.finish_and_clear();
    println!(
        "  {} Described {} of {} segments",
        "✓".green(),
        builder.len(),
        clips.len()
    );

    println!();
    let pb = spinner("Publishing documents...")?;
    let operation = rt.block_on(indexer.publish(video, &builder))?;
    pb.finish_and_clear();

    match operation {
        Some(operation) => {
            debug!("Import operation: {}", operation);
            println!(
                "{} Import started for {} document{}",
                "✓".green(),
                builder.len(),
                if builder.len() == 1 { "" } else { "s" }
            );
            println!("  Operation: {}", operation.dimmed());
        }
        None => {
            println!(
                "{} No documents were generated. Nothing to import.",
                "Note:".yellow().bold()
            );
        }
    }

    Ok(())
}

fn build_indexer(config: &Config) -> Result<VideoIndexer> {
    let auth = token_provider()?;
    let storage = StorageClient::new(auth.clone()).context("Failed to create storage client")?;
    let analyzer = GeminiClient::from_config(&config.gcp, &config.gemini, auth.clone())
        .context("Failed to create analyzer client")?;
    let search = DiscoveryClient::from_config(&config.gcp, &config.search, auth)
        .context("Failed to create search client")?;
    Ok(VideoIndexer::new(storage, analyzer, search, config))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
