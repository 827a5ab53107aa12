//! Prompt definitions as stored in YAML, and their rendered form.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One prompt file, built in or from `.clinic/prompts/<id>.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,

    pub title: String,

    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Chat role the rendered text is sent as
    #[serde(default)]
    pub role: PromptRole,

    /// Handlebars source
    pub template: String,

    /// Variables the caller must supply; `clinic` is always in scope
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    #[default]
    User,
}

/// Rendered prompt text plus the inputs that produced it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltPrompt {
    pub content: String,
    pub role: PromptRole,
    pub prompt_id: String,
    pub variables: HashMap<String, String>,
}
