//! SQLite-backed `site_pages` store.

use super::DocumentStore;
use crate::types::DocumentRecord;
use chrono::Utc;
use clinic_core::{AppError, AppResult};
use rusqlite::{params, Connection, Row};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS site_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    chunk_number INTEGER NOT NULL,
    title TEXT NOT NULL,
    summary TEXT,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (url, chunk_number)
);

CREATE INDEX IF NOT EXISTS idx_site_pages_url ON site_pages(url);
"#;

const COLUMNS: &str = "url, chunk_number, title, summary, content, metadata";

/// Local copy of the clinic page index.
///
/// Similarity is brute-force cosine over every stored vector, which is
/// fine for a single clinic website.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and create if needed) the store at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create store directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite store: {}", e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Opened SQLite store at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("SQLite connection lock poisoned".to_string()))
    }

    /// Insert or replace the chunk identified by `(url, chunk_number)`.
    pub fn insert_chunk(&self, record: &DocumentRecord, embedding: &[f32]) -> AppResult<()> {
        let metadata = if record.metadata.is_null() {
            "{}".to_string()
        } else {
            serde_json::to_string(&record.metadata)?
        };

        self.lock()?
            .execute(
                "INSERT INTO site_pages
                    (url, chunk_number, title, summary, content, metadata, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (url, chunk_number) DO UPDATE SET
                    title = excluded.title,
                    summary = excluded.summary,
                    content = excluded.content,
                    metadata = excluded.metadata,
                    embedding = excluded.embedding,
                    created_at = excluded.created_at",
                params![
                    record.url,
                    record.chunk_number,
                    record.title,
                    record.summary,
                    record.content,
                    metadata,
                    embedding_to_bytes(embedding),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

        Ok(())
    }

    /// Number of stored chunks.
    pub fn count_chunks(&self) -> AppResult<u32> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM site_pages", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))
    }

    /// Delete every chunk.
    pub fn reset(&self) -> AppResult<()> {
        self.lock()?
            .execute("DELETE FROM site_pages", [])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;
        tracing::info!("Reset local page store");
        Ok(())
    }

    fn query_records(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> AppResult<Vec<DocumentRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params, read_record)
            .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    let metadata: String = row.get(5)?;
    Ok(DocumentRecord {
        url: row.get(0)?,
        chunk_number: row.get(1)?,
        title: row.get(2)?,
        summary: row.get(3)?,
        content: row.get(4)?,
        metadata: serde_json::from_str(&metadata).unwrap_or(Value::Null),
        similarity: None,
    })
}

/// Every key of `filter` must be present in `metadata` with an equal value.
fn metadata_matches(metadata: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        Some(wanted) => wanted
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value)),
        None => true,
    }
}

#[async_trait::async_trait]
impl DocumentStore for SqliteStore {
    fn store_name(&self) -> &str {
        "sqlite"
    }

    async fn match_documents(
        &self,
        embedding: &[f32],
        match_count: usize,
        filter: &Value,
    ) -> AppResult<Vec<DocumentRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {}, embedding FROM site_pages", COLUMNS))
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let record = read_record(row)?;
                let bytes: Vec<u8> = row.get(6)?;
                Ok((record, bytes))
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

        let mut scored = Vec::new();
        for row in rows {
            let (mut record, bytes) =
                row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))?;
            if !metadata_matches(&record.metadata, filter) {
                continue;
            }
            let stored = bytes_to_embedding(&bytes)?;
            record.similarity = Some(cosine_similarity(embedding, &stored));
            scored.push(record);
        }

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(match_count);

        tracing::debug!(
            "Matched {} chunks (requested top-{})",
            scored.len(),
            match_count
        );
        Ok(scored)
    }

    async fn select_by_url_pattern(
        &self,
        pattern: &str,
        limit: usize,
    ) -> AppResult<Vec<DocumentRecord>> {
        let limit = limit as i64;
        self.query_records(
            &format!(
                "SELECT {} FROM site_pages WHERE instr(url, ?1) > 0 ORDER BY id LIMIT ?2",
                COLUMNS
            ),
            &[&pattern, &limit],
        )
    }

    async fn list_urls(&self, pattern: &str) -> AppResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT url FROM site_pages WHERE instr(url, ?1) > 0")
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let urls = stmt
            .query_map([pattern], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::Knowledge(format!("Failed to query urls: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Knowledge(format!("Failed to read url: {}", e)))?;

        Ok(urls)
    }

    async fn chunks_for_url(&self, url: &str) -> AppResult<Vec<DocumentRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM site_pages WHERE url = ?1 ORDER BY chunk_number ASC",
                COLUMNS
            ),
            &[&url],
        )
    }
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
