//! Retrieval operations exposed to the model as callable tools.

use crate::retriever::ClinicRetriever;
use clinic_llm::ToolDefinition;
use serde_json::{json, Value};

pub const RETRIEVE_TOOL: &str = "retrieve_relevant_clinic_information";
pub const LIST_PAGES_TOOL: &str = "list_clinic_pages";
pub const GET_PAGE_TOOL: &str = "get_page_content";

/// Binds [`ClinicRetriever`] operations to tool names and JSON arguments.
#[derive(Clone)]
pub struct ClinicTools {
    retriever: ClinicRetriever,
}

impl ClinicTools {
    pub fn new(retriever: ClinicRetriever) -> Self {
        Self { retriever }
    }

    pub fn retriever(&self) -> &ClinicRetriever {
        &self.retriever
    }

    /// JSON-schema descriptions of the three tools.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let clinic = &self.retriever.clinic().name;
        vec![
            ToolDefinition {
                name: RETRIEVE_TOOL.to_string(),
                description: format!(
                    "Retrieve the most relevant passages from the {} website for a question \
                     about treatments, procedures or clinic services.",
                    clinic
                ),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "user_query": {
                            "type": "string",
                            "description": "The user's question or query"
                        }
                    },
                    "required": ["user_query"]
                }),
            },
            ToolDefinition {
                name: LIST_PAGES_TOOL.to_string(),
                description: format!("List the urls of all indexed {} pages.", clinic),
                parameters: json!({"type": "object", "properties": {}}),
            },
            ToolDefinition {
                name: GET_PAGE_TOOL.to_string(),
                description: "Get the full content of one clinic page by url.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "Page url as returned by list_clinic_pages"
                        }
                    },
                    "required": ["url"]
                }),
            },
        ]
    }

    /// Run a tool. Problems are reported to the model as text.
    pub async fn call(&self, name: &str, arguments: &Value) -> String {
        tracing::debug!("Tool call {} with {}", name, arguments);
        match name {
            RETRIEVE_TOOL => match string_argument(arguments, "user_query") {
                Ok(query) => self.retriever.retrieve(&query).await,
                Err(message) => message,
            },
            LIST_PAGES_TOOL => {
                let urls = self.retriever.list_documents().await;
                if urls.is_empty() {
                    "No clinic pages are indexed.".to_string()
                } else {
                    urls.join("\n")
                }
            }
            GET_PAGE_TOOL => match string_argument(arguments, "url") {
                Ok(url) => self.retriever.get_document(&url).await,
                Err(message) => message,
            },
            other => {
                tracing::warn!("Model requested unknown tool: {}", other);
                format!("Error: unknown tool '{}'", other)
            }
        }
    }
}

/// A bare string is accepted for single-argument tools.
fn string_argument(arguments: &Value, key: &str) -> Result<String, String> {
    match arguments {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::Object(map) => match map.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(format!("Error: missing string argument '{}'", key)),
        },
        _ => Err(format!("Error: missing string argument '{}'", key)),
    }
}
