//! Google Cloud Storage URI handling.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// A `gs://bucket/object` URI.
///
/// The object path is always non-empty; a bare bucket reference is not a
/// valid `GcsUri`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GcsUri {
    bucket: String,
    object: String,
}

impl GcsUri {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
        }
    }

    /// Parse a `gs://bucket/path/to/object` string.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("gs://")
            .ok_or_else(|| Error::InvalidUri(format!("must start with 'gs://': {s}")))?;
        let (bucket, object) = rest
            .split_once('/')
            .ok_or_else(|| Error::InvalidUri(format!("missing object path: {s}")))?;
        if bucket.is_empty() || object.is_empty() {
            return Err(Error::InvalidUri(format!("missing bucket or object: {s}")));
        }
        Ok(Self::new(bucket, object))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// Last path component of the object, e.g. `match.mp4` for
    /// `gs://bucket/videos/match.mp4`.
    pub fn file_name(&self) -> &str {
        self.object.rsplit('/').next().unwrap_or(&self.object)
    }

    /// The unauthenticated HTTPS URL for a publicly readable object.
    pub fn public_url(&self) -> String {
        format!("https://storage.googleapis.com/{}/{}", self.bucket, self.object)
    }
}

impl std::fmt::Display for GcsUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

impl std::str::FromStr for GcsUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for GcsUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GcsUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
