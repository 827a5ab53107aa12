//! Ollama embeddings (`/api/embeddings`), e.g. `nomic-embed-text`.
//!
//! Ollama takes one prompt per request, so a batch is a sequence of calls.
//! Blank texts map to a zero vector without touching the server.

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use clinic_core::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 100;
const TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedPrompt<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Extract the vector from an `/api/embeddings` body.
///
/// Ollama reports failures as `{"error": "..."}`, sometimes with a 200.
fn parse_embedding(body: &Value, dimensions: usize) -> AppResult<Vec<f32>> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(AppError::Knowledge(format!("Ollama embedding failed: {}", message)));
    }

    let values = body
        .get("embedding")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::Knowledge("Ollama response has no embedding".to_string()))?;

    let vector: Vec<f32> = values
        .iter()
        .filter_map(Value::as_f64)
        .map(|v| v as f32)
        .collect();

    if vector.len() != dimensions {
        return Err(AppError::Knowledge(format!(
            "Ollama returned {} dimensions, store expects {}",
            vector.len(),
            dimensions
        )));
    }
    Ok(vector)
}

impl OllamaProvider {
    pub fn new(
        base_url: Option<&str>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Knowledge(format!("HTTP client for Ollama: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.into(),
            dimensions,
        })
    }

    async fn request(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        debug!(%url, "embedding request");

        let response = self
            .client
            .post(&url)
            .json(&EmbedPrompt {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("Ollama unreachable: {}", e)))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Knowledge(format!("Ollama returned {}: {}", status, e)))?;

        parse_embedding(&body, self.dimensions)
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_one(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut attempt = 1;
        loop {
            match self.request(text).await {
                Ok(vector) => return Ok(vector),
                Err(e) if attempt >= ATTEMPTS => return Err(e),
                Err(e) => {
                    let delay = Duration::from_millis(BACKOFF_BASE_MS << attempt);
                    warn!(attempt, error = %e, "Ollama embedding failed, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama"))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            if text.trim().is_empty() {
                vectors.push(vec![0.0; self.dimensions]);
            } else {
                vectors.push(self.embed_one(text).await?);
            }
        }
        Ok(vectors)
    }
}
