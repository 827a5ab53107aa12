//! Import crawled page chunks into the local store.
//!
//! Input is JSON Lines, one chunk per line:
//! `{"url": "...", "chunk_number": 0, "title": "...", "content": "..."}`
//! with optional `summary` and `metadata`.

use crate::embeddings::EmbeddingProvider;
use crate::store::SqliteStore;
use crate::types::{DocumentRecord, ImportStats};
use clinic_core::{AppError, AppResult};
use std::collections::HashSet;
use std::path::Path;

/// Chunks embedded per provider call.
const EMBED_BATCH_SIZE: usize = 16;

/// Read `path`, embed every chunk and upsert it into `store`.
///
/// Malformed or empty lines are skipped with a warning; provider and store
/// failures abort the import.
pub async fn import_pages(
    path: &Path,
    store: &SqliteStore,
    embedder: &dyn EmbeddingProvider,
) -> AppResult<ImportStats> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    let mut stats = ImportStats::default();
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!("Skipping line {}: {}", index + 1, reason);
                stats.lines_skipped += 1;
            }
        }
    }

    tracing::info!(
        "Importing {} chunks from {:?} with {} ({})",
        records.len(),
        path,
        embedder.provider_name(),
        embedder.model_name()
    );

    let mut pages = HashSet::new();
    for batch in records.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(embedding_text).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                batch.len()
            )));
        }

        for (record, vector) in batch.iter().zip(vectors.iter()) {
            store.insert_chunk(record, vector)?;
            pages.insert(record.url.clone());
            stats.chunks_imported += 1;
        }
        tracing::debug!("Imported {} chunks so far", stats.chunks_imported);
    }

    stats.pages = pages.len() as u32;
    Ok(stats)
}

fn parse_line(line: &str) -> Result<DocumentRecord, String> {
    let record: DocumentRecord = serde_json::from_str(line).map_err(|e| e.to_string())?;
    if record.url.trim().is_empty() {
        return Err("empty url".to_string());
    }
    if record.content.trim().is_empty() {
        return Err("empty content".to_string());
    }
    Ok(DocumentRecord {
        similarity: None,
        ..record
    })
}

/// Title and content together, so page titles influence similarity.
fn embedding_text(record: &DocumentRecord) -> String {
    if record.title.is_empty() {
        record.content.clone()
    } else {
        format!("{}\n\n{}", record.title, record.content)
    }
}
