//! Clinic knowledge base.
//!
//! Retrieval over the clinic's crawled website: embeddings, the document
//! stores holding `site_pages` chunks, the retrieval operations and their
//! binding as model tools, and import of crawled pages into the local store.

pub mod embeddings;
pub mod import;
pub mod retriever;
pub mod store;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider, MockProvider};
pub use import::import_pages;
pub use retriever::ClinicRetriever;
pub use store::{DocumentStore, SqliteStore, SupabaseStore};
pub use tools::{ClinicTools, GET_PAGE_TOOL, LIST_PAGES_TOOL, RETRIEVE_TOOL};
pub use types::{DocumentRecord, ImportStats};
