//! Core domain types for Sorot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gcs::GcsUri;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Kind of broadcast video, as classified by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoKind {
    Sports,
    SoapOpera,
    #[default]
    Unknown,
}

impl VideoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoKind::Sports => "sports",
            VideoKind::SoapOpera => "soap_opera",
            VideoKind::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sports" => Some(VideoKind::Sports),
            "soap_opera" => Some(VideoKind::SoapOpera),
            "unknown" => Some(VideoKind::Unknown),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, VideoKind::Unknown)
    }

    /// Document categories for this kind of broadcast.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            VideoKind::SoapOpera => &["Drama", "Soap Opera", "Episode"],
            _ => &["Sports", "Soccer", "Video Highlight"],
        }
    }

    /// Document media type for this kind of broadcast.
    pub fn media_type(&self) -> &'static str {
        match self {
            VideoKind::SoapOpera => "episode",
            _ => "sports-game",
        }
    }
}

impl std::fmt::Display for VideoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A player on a team roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub jersey_number: Option<u32>,
}

/// One team identified in a sports broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub jersey_color: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

/// A character identified in a soap opera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Whole-video context extracted before per-segment analysis.
///
/// The wire shape matches the analyzer's reply: `{"teams": [...]}` for
/// sports, `{"characters": [...]}` for soap operas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GlobalContext {
    Sports { teams: Vec<Team> },
    SoapOpera { characters: Vec<Character> },
}

/// A person or organization the analyzer identified in a clip.
///
/// The role is one of the search schema's supported values (`player`,
/// `team`, `character`, ...) and is carried as-is, not validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Structured analysis of a single segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub persons: Vec<EntityMention>,
    #[serde(default)]
    pub organizations: Vec<EntityMention>,
    #[serde(default)]
    pub hash_tags: Vec<String>,
}

/// An uploaded segment clip and its measured duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentClip {
    pub uri: GcsUri,
    pub duration: f64,
}

impl SegmentClip {
    pub fn new(uri: GcsUri, duration: f64) -> Self {
        Self { uri, duration }
    }
}

/// One searchable document, serialized as a JSONL line for import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDocument {
    pub id: String,
    pub struct_data: DocumentData,
}

impl MediaDocument {
    pub fn new(struct_data: DocumentData) -> Self {
        Self {
            id: new_id(),
            struct_data,
        }
    }
}

/// The data-store schema carried in `struct_data`.
///
/// Field names are the import contract and must not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentData {
    pub title: String,
    pub categories: Vec<String>,
    pub uri: GcsUri,
    pub available_time: DateTime<Utc>,
    pub description: String,
    pub duration: String,
    pub in_languages: Vec<String>,
    pub media_type: String,
    pub persons: Vec<EntityMention>,
    pub organizations: Vec<EntityMention>,
    pub hash_tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_kind_from_str() {
        assert_eq!(VideoKind::from_str("sports"), Some(VideoKind::Sports));
        assert_eq!(VideoKind::from_str("SOAP_OPERA"), Some(VideoKind::SoapOpera));
        assert_eq!(VideoKind::from_str("unknown"), Some(VideoKind::Unknown));
        assert_eq!(VideoKind::from_str("documentary"), None);
    }

    #[test]
    fn test_video_kind_document_fields() {
        assert_eq!(
            VideoKind::Sports.categories(),
            &["Sports", "Soccer", "Video Highlight"]
        );
        assert_eq!(VideoKind::SoapOpera.media_type(), "episode");
        assert_eq!(VideoKind::Unknown.media_type(), "sports-game");
    }

    #[test]
    fn test_global_context_wire_shapes() {
        let sports: GlobalContext = serde_json::from_str(
            r#"{"teams": [{"name": "Persebaya Surabaya", "short_name": "PBY",
                "jersey_color": "green", "players": [{"name": "A", "jersey_number": 10}]}]}"#,
        )
        .unwrap();
        match sports {
            GlobalContext::Sports { teams } => {
                assert_eq!(teams.len(), 1);
                assert_eq!(teams[0].short_name, "PBY");
                assert_eq!(teams[0].players[0].jersey_number, Some(10));
            }
            other => panic!("expected sports context, got {other:?}"),
        }

        let soap: GlobalContext =
            serde_json::from_str(r#"{"characters": [{"name": "Mira", "role": "mother"}]}"#)
                .unwrap();
        assert!(matches!(soap, GlobalContext::SoapOpera { .. }));
    }

    #[test]
    fn test_segment_analysis_tolerates_missing_fields() {
        let analysis: SegmentAnalysis =
            serde_json::from_str(r#"{"description": "A shot on goal"}"#).unwrap();
        assert_eq!(analysis.description, "A shot on goal");
        assert!(analysis.persons.is_empty());
        assert!(analysis.hash_tags.is_empty());
    }

    #[test]
    fn test_document_wire_field_names() {
        let doc = MediaDocument::new(DocumentData {
            title: "A header at the far post #Header".to_string(),
            categories: vec!["Sports".to_string()],
            uri: GcsUri::new("bucket", "processed-segments/clip_0000.mp4"),
            available_time: Utc::now(),
            description: "Segment from match.mp4 at 0s".to_string(),
            duration: "15.04s".to_string(),
            in_languages: vec!["en".to_string()],
            media_type: "sports-game".to_string(),
            persons: vec![],
            organizations: vec![],
            hash_tags: vec!["#Header".to_string()],
        });

        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("id").is_some());
        let data = value.get("struct_data").unwrap();
        for key in [
            "title",
            "categories",
            "uri",
            "available_time",
            "description",
            "duration",
            "in_languages",
            "media_type",
            "persons",
            "organizations",
            "hash_tags",
        ] {
            assert!(data.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(
            data["uri"],
            serde_json::json!("gs://bucket/processed-segments/clip_0000.mp4")
        );
    }
}
