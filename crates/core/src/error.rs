//! Error types for the clinic assistant.
//!
//! This module defines a unified error enum that covers all error categories
//! in the workspace: configuration, I/O, LLM, knowledge store, web search,
//! prompt and serialization errors.

use thiserror::Error;

/// Unified error type for the clinic assistant.
///
/// Library functions return `Result<T, AppError>`. Components that sit on a
/// containment boundary (search client, retrieval tools, answering agent)
/// turn these into fallback values instead of handing them to their callers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base, embedding and document store errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Web search provider errors
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
