//! Multimodal video analysis through Vertex AI.
//!
//! The client covers the three analysis passes the indexing pipeline runs
//! over a video: classifying it as sports or soap-opera content, extracting
//! whole-video context (team rosters or character casts), and describing
//! each segment clip with its entities and hashtags.

mod client;
mod error;
mod prompts;

pub use client::GeminiClient;
pub use error::{GeminiError, GeminiResult};
