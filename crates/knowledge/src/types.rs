//! Core types for the clinic knowledge base.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One indexed chunk of a clinic web page.
///
/// Mirrors a row of the `site_pages` table; rows returned by the
/// similarity search also carry a `similarity` score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Page URL
    pub url: String,

    /// Position of this chunk within the page (0-based)
    #[serde(default)]
    pub chunk_number: i64,

    /// Chunk title
    #[serde(default)]
    pub title: String,

    /// Short summary, when the crawler produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Chunk text
    #[serde(default)]
    pub content: String,

    /// Free-form crawler metadata
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,

    /// Cosine similarity to the query (similarity search only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl DocumentRecord {
    /// Create a record for a page chunk.
    pub fn new(
        url: impl Into<String>,
        chunk_number: i64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            chunk_number,
            title: title.into(),
            summary: None,
            content: content.into(),
            metadata: Value::Null,
            similarity: None,
        }
    }
}

/// Result of importing a JSONL page dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Chunks written to the store
    pub chunks_imported: u32,

    /// Distinct page URLs among the imported chunks
    pub pages: u32,

    /// Lines skipped because they were malformed
    pub lines_skipped: u32,
}
