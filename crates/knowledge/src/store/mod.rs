//! Document stores holding the indexed clinic pages.
//!
//! Two backends implement [`DocumentStore`]: Supabase over PostgREST for
//! the hosted `site_pages` table, and a local SQLite file with the same
//! columns for offline use and tests.

pub mod sqlite;
pub mod supabase;

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

use crate::types::DocumentRecord;
use clinic_core::AppResult;
use serde_json::Value;

/// Read access to indexed page chunks.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs ("supabase", "sqlite").
    fn store_name(&self) -> &str;

    /// Similarity search: the `match_count` chunks closest to `embedding`
    /// whose metadata contains every key/value of `filter`, best first.
    async fn match_documents(
        &self,
        embedding: &[f32],
        match_count: usize,
        filter: &Value,
    ) -> AppResult<Vec<DocumentRecord>>;

    /// Up to `limit` chunks whose url contains `pattern`.
    async fn select_by_url_pattern(
        &self,
        pattern: &str,
        limit: usize,
    ) -> AppResult<Vec<DocumentRecord>>;

    /// Urls (one per chunk, possibly repeated) containing `pattern`.
    async fn list_urls(&self, pattern: &str) -> AppResult<Vec<String>>;

    /// All chunks of one page ordered by `chunk_number`.
    async fn chunks_for_url(&self, url: &str) -> AppResult<Vec<DocumentRecord>>;
}
