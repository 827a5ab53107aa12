//! LLM integration crate for the clinic assistant.
//!
//! This crate provides a provider-agnostic abstraction for chat completions
//! with tool calling. Providers translate the shared request/response types
//! to their own wire formats.
//!
//! # Providers
//! - **OpenAI**: `/v1/chat/completions` (default)
//! - **Ollama**: local `/api/chat`
//!
//! # Example
//! ```no_run
//! use clinic_llm::{ChatMessage, LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = LlmRequest::new("gpt-4o-mini", vec![ChatMessage::user("Hello!")]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.message.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::{ChatMessage, ProviderType, Role, ToolCall, ToolDefinition};
