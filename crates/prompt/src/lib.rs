//! Prompt system for the clinic assistant.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions compiled into the binary
//! - Workspace overrides from `.clinic/prompts/<id>.yml`
//! - Handlebars template rendering with the clinic profile in scope

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, build_synthesis_prompt};
pub use loader::{
    builtin_prompt, list_prompts, load_prompt, resolve_prompt, SYNTHESIS_PROMPT_ID,
    SYSTEM_PROMPT_ID,
};
pub use types::{BuiltPrompt, PromptDefinition, PromptRole};
