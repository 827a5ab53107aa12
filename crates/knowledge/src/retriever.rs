//! Retrieval operations over the clinic's indexed website.
//!
//! These are the model-facing read paths: every failure is folded into the
//! returned text (or an empty list) so the answering agent can keep going.

use crate::embeddings::EmbeddingProvider;
use crate::store::DocumentStore;
use crate::types::DocumentRecord;
use clinic_core::ClinicProfile;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Chunks requested from the similarity search.
pub const MATCH_COUNT: usize = 5;

/// Separator between rendered chunks.
const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Read-only access to the clinic's pages, scoped to its domain.
#[derive(Clone)]
pub struct ClinicRetriever {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    clinic: ClinicProfile,
}

impl ClinicRetriever {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        clinic: ClinicProfile,
    ) -> Self {
        Self {
            store,
            embedder,
            clinic,
        }
    }

    pub fn clinic(&self) -> &ClinicProfile {
        &self.clinic
    }

    /// Text returned when nothing about the clinic matches.
    pub fn no_information_message(&self) -> String {
        format!(
            "No relevant clinic information found. Please contact the clinic directly at {}.",
            self.clinic.contact_line()
        )
    }

    /// Find the chunks most relevant to `query` and render them as markdown.
    #[instrument(skip(self), fields(store = self.store.store_name()))]
    pub async fn retrieve(&self, query: &str) -> String {
        let embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Embedding failed, searching with a zero vector: {}", e);
                vec![0.0; self.embedder.dimensions()]
            }
        };

        let matches = match self
            .store
            .match_documents(&embedding, MATCH_COUNT, &Value::Object(Default::default()))
            .await
        {
            Ok(records) => records,
            Err(e) => return format!("Error retrieving clinic information: {}", e),
        };

        let mut records: Vec<DocumentRecord> = matches
            .into_iter()
            .filter(|r| r.url.contains(&self.clinic.domain))
            .collect();

        if records.is_empty() {
            debug!("No similarity matches on {}, falling back to url selection", self.clinic.domain);
            records = match self
                .store
                .select_by_url_pattern(&self.clinic.domain, MATCH_COUNT)
                .await
            {
                Ok(records) => records,
                Err(e) => return format!("Error retrieving clinic information: {}", e),
            };
        }

        if records.is_empty() {
            info!("No clinic information found for query");
            return self.no_information_message();
        }

        info!("Retrieved {} clinic chunks", records.len());
        records
            .iter()
            .map(|r| format!("# {}\n**URL:** {}\n\n{}", r.title, r.url, r.content))
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR)
    }

    /// Sorted, de-duplicated urls of all indexed clinic pages.
    pub async fn list_documents(&self) -> Vec<String> {
        match self.store.list_urls(&self.clinic.domain).await {
            Ok(urls) => urls
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            Err(e) => {
                warn!("Error retrieving clinic pages: {}", e);
                Vec::new()
            }
        }
    }

    /// Full text of one page, chunks in order under the first chunk's title.
    pub async fn get_document(&self, url: &str) -> String {
        let chunks = match self.store.chunks_for_url(url).await {
            Ok(chunks) => chunks,
            Err(e) => return format!("Error retrieving page content: {}", e),
        };

        let Some(first) = chunks.first() else {
            return format!("No content found for URL: {}", url);
        };

        let mut parts = Vec::with_capacity(chunks.len() + 1);
        parts.push(format!("# {}", first.title));
        parts.extend(chunks.iter().map(|c| c.content.clone()));
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockProvider;
    use crate::store::SqliteStore;
    use clinic_core::{AppError, AppResult};
    use tempfile::TempDir;

    struct BrokenStore;

    #[async_trait::async_trait]
    impl DocumentStore for BrokenStore {
        fn store_name(&self) -> &str {
            "broken"
        }

        async fn match_documents(
            &self,
            _embedding: &[f32],
            _match_count: usize,
            _filter: &Value,
        ) -> AppResult<Vec<DocumentRecord>> {
            Err(AppError::Knowledge("connection refused".to_string()))
        }

        async fn select_by_url_pattern(
            &self,
            _pattern: &str,
            _limit: usize,
        ) -> AppResult<Vec<DocumentRecord>> {
            Err(AppError::Knowledge("connection refused".to_string()))
        }

        async fn list_urls(&self, _pattern: &str) -> AppResult<Vec<String>> {
            Err(AppError::Knowledge("connection refused".to_string()))
        }

        async fn chunks_for_url(&self, _url: &str) -> AppResult<Vec<DocumentRecord>> {
            Err(AppError::Knowledge("connection refused".to_string()))
        }
    }

    /// Embeds nothing; every call fails.
    #[derive(Debug)]
    struct FailingEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        fn provider_name(&self) -> &str {
            "failing"
        }

        fn model_name(&self) -> &str {
            "none"
        }

        fn dimensions(&self) -> usize {
            128
        }

        async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Err(AppError::Knowledge("embedding service down".to_string()))
        }
    }

    async fn store_with(pages: &[(&str, i64, &str, &str)]) -> (TempDir, Arc<SqliteStore>) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("pages.db")).unwrap();
        let embedder = MockProvider::new(128);
        for (url, n, title, content) in pages {
            let vector = embedder.embed(content).await.unwrap();
            store
                .insert_chunk(&DocumentRecord::new(*url, *n, *title, *content), &vector)
                .unwrap();
        }
        (dir, Arc::new(store))
    }

    async fn seeded(pages: &[(&str, i64, &str, &str)]) -> (TempDir, ClinicRetriever) {
        let (dir, store) = store_with(pages).await;
        let retriever = ClinicRetriever::new(
            store,
            Arc::new(MockProvider::new(128)),
            ClinicProfile::default(),
        );
        (dir, retriever)
    }

    fn broken() -> ClinicRetriever {
        ClinicRetriever::new(
            Arc::new(BrokenStore),
            Arc::new(MockProvider::new(8)),
            ClinicProfile::default(),
        )
    }

    #[tokio::test]
    async fn test_retrieve_renders_clinic_chunks() {
        let (_dir, retriever) = seeded(&[
            (
                "https://haut-labor.de/botox",
                0,
                "Botox",
                "Botox treatment smooths forehead wrinkles.",
            ),
            (
                "https://haut-labor.de/team",
                0,
                "Team",
                "Our clinic team and practice.",
            ),
        ])
        .await;

        let text = retriever.retrieve("botox wrinkles").await;

        assert!(text.starts_with("# Botox\n**URL:** https://haut-labor.de/botox\n\n"));
        assert!(text.contains("\n\n---\n\n# Team"));
    }

    #[tokio::test]
    async fn test_retrieve_drops_foreign_domains() {
        let (_dir, retriever) = seeded(&[
            ("https://haut-labor.de/faq", 0, "FAQ", "Opening hours"),
            ("https://example.com/botox", 0, "Elsewhere", "Botox wrinkles"),
        ])
        .await;

        let text = retriever.retrieve("botox wrinkles").await;
        assert!(text.contains("haut-labor.de/faq"));
        assert!(!text.contains("example.com"));
    }

    #[tokio::test]
    async fn test_retrieve_without_clinic_pages_returns_sentinel() {
        let (_dir, retriever) =
            seeded(&[("https://example.com/botox", 0, "Elsewhere", "Botox")]).await;

        assert_eq!(
            retriever.retrieve("botox").await,
            "No relevant clinic information found. Please contact the clinic directly at \
             +49 (0) 157 834 488 90 or info@haut-labor.de."
        );
    }

    #[tokio::test]
    async fn test_store_failures_become_text() {
        let retriever = broken();
        assert_eq!(
            retriever.retrieve("botox").await,
            "Error retrieving clinic information: Knowledge error: connection refused"
        );
        assert!(retriever
            .get_document("https://haut-labor.de/")
            .await
            .starts_with("Error retrieving page content:"));
        assert!(retriever.list_documents().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_documents_sorted_unique() {
        let (_dir, retriever) = seeded(&[
            ("https://haut-labor.de/z", 0, "Z", "z"),
            ("https://haut-labor.de/a", 1, "A", "a1"),
            ("https://haut-labor.de/a", 0, "A", "a0"),
            ("https://example.com/b", 0, "B", "b"),
        ])
        .await;

        assert_eq!(
            retriever.list_documents().await,
            vec!["https://haut-labor.de/a", "https://haut-labor.de/z"]
        );
    }

    #[tokio::test]
    async fn test_get_document_joins_chunks_in_order() {
        let (_dir, retriever) = seeded(&[
            ("https://haut-labor.de/filler", 1, "Filler (2)", "Second part."),
            ("https://haut-labor.de/filler", 0, "Filler", "First part."),
        ])
        .await;

        assert_eq!(
            retriever.get_document("https://haut-labor.de/filler").await,
            "# Filler\n\nFirst part.\n\nSecond part."
        );
        assert_eq!(
            retriever.get_document("https://haut-labor.de/none").await,
            "No content found for URL: https://haut-labor.de/none"
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_still_returns_clinic_chunks() {
        let (_dir, store) = store_with(&[
            ("https://haut-labor.de/laser", 0, "Laser", "CO2 laser resurfacing."),
            ("https://other-clinic.com/laser", 0, "Other", "Laser offers."),
        ])
        .await;
        let retriever = ClinicRetriever::new(
            store,
            Arc::new(FailingEmbedder),
            ClinicProfile::default(),
        );

        let text = retriever.retrieve("laser").await;

        assert!(text.starts_with("# Laser\n**URL:** https://haut-labor.de/laser"));
        assert!(!text.contains("other-clinic.com"));
    }

    #[tokio::test]
    async fn test_url_selection_when_foreign_chunks_outrank_the_clinic() {
        let mut pages = vec![(
            "https://haut-labor.de/hours",
            0,
            "Opening hours",
            "Opening hours and parking information.",
        )];
        let foreign: Vec<String> = (0..6)
            .map(|i| format!("https://other-clinic.com/botox-{}", i))
            .collect();
        for url in &foreign {
            pages.push((url.as_str(), 0, "Botox", "Botox wrinkles forehead"));
        }
        let (_dir, retriever) = seeded(&pages).await;

        let text = retriever.retrieve("Botox wrinkles forehead").await;

        assert_eq!(
            text,
            "# Opening hours\n**URL:** https://haut-labor.de/hours\n\n\
             Opening hours and parking information."
        );
    }
}
