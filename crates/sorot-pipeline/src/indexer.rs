//! Per-video indexing stages.

use crate::documents::DocumentBuilder;
use crate::error::PipelineResult;
use sorot_config::Config;
use sorot_core::{new_id, GcsUri, GlobalContext, SegmentAnalysis, SegmentClip, VideoKind};
use sorot_discovery::DiscoveryClient;
use sorot_gcs::StorageClient;
use sorot_gemini::GeminiClient;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// What one indexing run produced.
#[derive(Debug)]
pub struct IndexOutcome {
    pub video: GcsUri,
    pub kind: VideoKind,
    pub segments: usize,
    pub documents: usize,
    /// Import operation name, `None` when nothing was published.
    pub operation: Option<String>,
}

/// Runs the indexing stages for one stored video.
///
/// The stages are public so the CLI can drive them with progress output;
/// [`VideoIndexer::index_video`] runs them all in order.
pub struct VideoIndexer {
    storage: StorageClient,
    analyzer: GeminiClient,
    search: DiscoveryClient,
    bucket: String,
    video_prefix: String,
    segment_prefix: String,
    jsonl_prefix: String,
    segment_seconds: u32,
}

impl VideoIndexer {
    pub fn new(
        storage: StorageClient,
        analyzer: GeminiClient,
        search: DiscoveryClient,
        config: &Config,
    ) -> Self {
        Self {
            storage,
            analyzer,
            search,
            bucket: config.storage.bucket.clone(),
            video_prefix: config.storage.video_prefix.clone(),
            segment_prefix: config.storage.segment_prefix.clone(),
            jsonl_prefix: config.storage.jsonl_prefix.clone(),
            segment_seconds: config.pipeline.segment_duration_seconds,
        }
    }

    /// List the source videos under the configured video prefix.
    pub async fn list_videos(&self) -> PipelineResult<Vec<GcsUri>> {
        let prefix = format!("{}/", self.video_prefix);
        let names = self.storage.list_objects(&self.bucket, &prefix).await?;
        Ok(names
            .into_iter()
            .filter(|name| !name.ends_with('/'))
            .map(|name| GcsUri::new(&self.bucket, name))
            .collect())
    }

    /// Download the video, split it into fixed-length clips, probe each
    /// clip's real duration and upload the clips for analysis.
    ///
    /// Clips come back in filename order, which is playback order. A probe
    /// failure falls back to the nominal segment length.
    pub async fn prepare_segments(&self, video: &GcsUri) -> PipelineResult<Vec<SegmentClip>> {
        let workdir = tempfile::tempdir()?;
        let local_video = workdir.path().join(video.file_name());
        self.storage.download_to_path(video, &local_video).await?;

        let segment_paths =
            sorot_media::split_into_segments(&local_video, workdir.path(), self.segment_seconds)?;
        info!("Split {} into {} segments", video, segment_paths.len());

        let mut clips = Vec::with_capacity(segment_paths.len());
        for path in &segment_paths {
            let duration = match sorot_media::probe_duration(path) {
                Ok(duration) => duration,
                Err(e) => {
                    warn!(
                        "Could not probe {}: {}. Using the nominal duration.",
                        path.display(),
                        e
                    );
                    f64::from(self.segment_seconds)
                }
            };
            let uri = self.upload_segment(path).await?;
            clips.push(SegmentClip::new(uri, duration));
        }
        Ok(clips)
    }

    /// Classify the source video.
    pub async fn classify(&self, video: &GcsUri) -> VideoKind {
        self.analyzer.classify(video).await
    }

    /// Extract the whole-video context for a classified video.
    pub async fn global_context(&self, video: &GcsUri, kind: VideoKind) -> Option<GlobalContext> {
        self.analyzer.global_context(video, kind).await
    }

    /// Analyze one clip. A failed call or an empty description skips the
    /// clip without stopping the run.
    pub async fn analyze_clip(
        &self,
        clip: &SegmentClip,
        kind: VideoKind,
        context: Option<&GlobalContext>,
    ) -> Option<SegmentAnalysis> {
        match self.analyzer.analyze_segment(&clip.uri, kind, context).await {
            Ok(analysis) if !analysis.description.is_empty() => Some(analysis),
            Ok(_) => {
                warn!("No description for {}, skipping segment", clip.uri);
                None
            }
            Err(e) => {
                warn!("Analysis failed for {}: {}. Skipping segment.", clip.uri, e);
                None
            }
        }
    }

    /// Upload the assembled documents as JSONL and start the import.
    ///
    /// Returns `None` without touching the bucket when there is nothing
    /// to import.
    pub async fn publish(
        &self,
        video: &GcsUri,
        builder: &DocumentBuilder,
    ) -> PipelineResult<Option<String>> {
        if builder.is_empty() {
            info!("No documents were generated for {}. Skipping import.", video);
            return Ok(None);
        }

        let jsonl = builder.to_jsonl()?;
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(jsonl.as_bytes())?;
        file.flush()?;

        let object = format!(
            "{}/{}_{}.jsonl",
            self.jsonl_prefix,
            video.file_name(),
            new_id()
        );
        let uploaded = self
            .storage
            .upload_file(&self.bucket, &object, file.path(), "application/json")
            .await?;
        info!("Uploaded {} documents to {}", builder.len(), uploaded);

        let operation = self.search.import_documents(&uploaded).await?;
        Ok(Some(operation))
    }

    /// Run every stage for one video and publish the result.
    pub async fn index_video(&self, video: &GcsUri) -> PipelineResult<IndexOutcome> {
        info!("Indexing {}", video);
        let clips = self.prepare_segments(video).await?;
        let kind = self.classify(video).await;
        let context = self.global_context(video, kind).await;

        let mut builder = DocumentBuilder::new(video.file_name(), kind);
        for clip in &clips {
            let analysis = self.analyze_clip(clip, kind, context.as_ref()).await;
            builder.push(clip, analysis);
        }

        let documents = builder.len();
        let operation = self.publish(video, &builder).await?;
        Ok(IndexOutcome {
            video: video.clone(),
            kind,
            segments: clips.len(),
            documents,
            operation,
        })
    }

    async fn upload_segment(&self, path: &Path) -> PipelineResult<GcsUri> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let object = format!("{}/{}", self.segment_prefix, name);
        let uri = self
            .storage
            .upload_file(&self.bucket, &object, path, "video/mp4")
            .await?;
        Ok(uri)
    }
}
