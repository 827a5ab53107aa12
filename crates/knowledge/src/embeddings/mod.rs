//! Embedding providers for query and page vectors.
//!
//! Query vectors must come from the same model and dimensionality as the
//! vectors stored in `site_pages`, so one provider is built from the
//! configuration and shared by retrieval and import.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{MockProvider, OllamaProvider, OpenAiProvider};
