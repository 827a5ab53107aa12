//! Normalized web search records.

use serde::{Deserialize, Serialize};

/// One web search hit, whatever provider produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,

    /// Source url; may be a label such as "Multiple sources" or empty
    pub url: String,

    pub content: String,

    /// Provider relevance in `0.0..=1.0`
    pub score: f64,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score,
        }
    }
}
