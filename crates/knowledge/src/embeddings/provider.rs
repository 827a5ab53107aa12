//! Embedding provider trait and factory.

use super::providers::{MockProvider, OllamaProvider, OpenAiProvider};
use clinic_core::config::EmbeddingSettings;
use clinic_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
///
/// # Arguments
/// * `settings` - Provider name, model and dimensionality
/// * `api_key` - Required for OpenAI
/// * `endpoint` - Optional base URL override
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
    endpoint: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if settings.dimensions == 0 {
        return Err(AppError::Knowledge(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    match settings.provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockProvider::new(settings.dimensions))),

        "openai" => {
            let key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                AppError::Knowledge("OpenAI embeddings require an API key".to_string())
            })?;
            let provider = OpenAiProvider::new(
                endpoint,
                key,
                settings.model.clone(),
                settings.dimensions,
            )?;
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider =
                OllamaProvider::new(endpoint, settings.model.clone(), settings.dimensions)?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: mock, openai, ollama",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str, dimensions: usize) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions,
        }
    }

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider(&settings("mock", 384), None, None).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&settings("openai", 1536), Some("sk-test"), None).unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "text-embedding-3-small");
        assert_eq!(provider.dimensions(), 1536);
    }

    #[test]
    fn test_openai_requires_key() {
        let result = create_provider(&settings("openai", 1536), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&settings("unknown", 384), None, None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(create_provider(&settings("mock", 0), None, None).is_err());
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&settings("mock", 64), None, None).unwrap();
        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 64);
    }
}
