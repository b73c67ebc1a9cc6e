//! Assembly of searchable documents from analyzed segments.

use chrono::Utc;
use sorot_core::{DocumentData, MediaDocument, SegmentAnalysis, SegmentClip, VideoKind};

/// Builds the documents for one video, tracking the running start offset
/// across its clips.
pub struct DocumentBuilder {
    video_name: String,
    kind: VideoKind,
    elapsed_seconds: f64,
    documents: Vec<MediaDocument>,
}

impl DocumentBuilder {
    pub fn new(video_name: impl Into<String>, kind: VideoKind) -> Self {
        Self {
            video_name: video_name.into(),
            kind,
            elapsed_seconds: 0.0,
            documents: Vec::new(),
        }
    }

    /// Account for a clip and build its document.
    ///
    /// Every clip advances the start offset by its measured duration, so
    /// later segments keep their true position in the video even when
    /// earlier ones were skipped. A clip without an analysis, or with an
    /// empty description, produces no document.
    pub fn push(&mut self, clip: &SegmentClip, analysis: Option<SegmentAnalysis>) {
        let start = self.elapsed_seconds;
        self.elapsed_seconds += clip.duration;

        let analysis = match analysis {
            Some(analysis) if !analysis.description.is_empty() => analysis,
            _ => return,
        };

        let data = DocumentData {
            title: join_title(&analysis.description, &analysis.hash_tags),
            categories: to_strings(self.kind.categories()),
            uri: clip.uri.clone(),
            available_time: Utc::now(),
            description: format!(
                "Segment from {} at {}s",
                self.video_name,
                format_seconds(start)
            ),
            duration: format!("{}s", format_seconds(clip.duration)),
            in_languages: vec!["en".to_string()],
            media_type: self.kind.media_type().to_string(),
            persons: analysis.persons,
            organizations: analysis.organizations,
            hash_tags: analysis.hash_tags,
        };
        self.documents.push(MediaDocument::new(data));
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Serialize all documents as JSONL, one compact object per line.
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for doc in &self.documents {
            out.push_str(&serde_json::to_string(doc)?);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn into_documents(self) -> Vec<MediaDocument> {
        self.documents
    }
}

fn join_title(description: &str, hash_tags: &[String]) -> String {
    if hash_tags.is_empty() {
        description.to_string()
    } else {
        format!("{} {}", description, hash_tags.join(" "))
    }
}

/// Render a seconds value without float noise: two decimals, trailing
/// zeros trimmed (`0`, `15`, `15.04`).
fn format_seconds(seconds: f64) -> String {
    let rendered = format!("{:.2}", seconds);
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
