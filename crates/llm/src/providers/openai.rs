//! OpenAI chat completion provider.
//!
//! Talks to `/v1/chat/completions` on api.openai.com or any compatible
//! endpoint, including function-style tool calls.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::types::{ChatMessage, Role, ToolCall, ToolDefinition};
use clinic_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OpenAiToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: OpenAiFunctionCall,
}

/// Arguments travel as a JSON-encoded string.
#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAiFunctionSpec,
}

#[derive(Debug, Serialize)]
struct OpenAiFunctionSpec {
    name: String,
    description: String,
    parameters: Value,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

fn function_type() -> String {
    "function".to_string()
}

/// OpenAI LLM client.
pub struct OpenAiClient {
    /// Base URL up to and including `/v1`
    base_url: String,

    /// Bearer token
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client against the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_OPENAI_URL, api_key)
    }

    /// Create a new client against a compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Convert LlmRequest to OpenAI format.
    fn to_openai_request(&self, request: &LlmRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(to_openai_message).collect(),
            tools: request.tools.iter().map(to_openai_tool).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert OpenAI response to LlmResponse.
    fn convert_response(&self, response: OpenAiResponse) -> AppResult<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("OpenAI response contained no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: parse_arguments(&call.function.arguments),
            })
            .collect();

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            message: ChatMessage::assistant_tool_calls(
                choice.message.content.unwrap_or_default(),
                tool_calls,
            ),
            model: response.model,
            usage,
        })
    }
}

fn to_openai_message(message: &ChatMessage) -> OpenAiMessage {
    let content = if message.content.is_empty() && !message.tool_calls.is_empty() {
        None
    } else {
        Some(message.content.clone())
    };

    OpenAiMessage {
        role: message.role,
        content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| OpenAiToolCall {
                id: call.id.clone(),
                kind: function_type(),
                function: OpenAiFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn to_openai_tool(tool: &ToolDefinition) -> OpenAiTool {
    OpenAiTool {
        kind: "function",
        function: OpenAiFunctionSpec {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

/// Models occasionally emit malformed JSON; keep the raw text so the tool
/// can report the problem back.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(
            "Sending chat completion to OpenAI ({} messages, {} tools)",
            request.messages.len(),
            request.tools.len()
        );
        tracing::debug!("Request: {:?}", request);

        let openai_request = self.to_openai_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

        tracing::debug!("Response: {:?}", openai_response);

        let converted = self.convert_response(openai_response)?;
        tracing::info!(
            "Received completion from OpenAI ({} tool calls, {} tokens)",
            converted.message.tool_calls.len(),
            converted.usage.total_tokens
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAiClient::with_base_url("http://localhost:8080/v1/", "sk-test");
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_request_conversion_with_tools() {
        let client = OpenAiClient::new("sk-test");
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "get_page_content".to_string(),
            arguments: json!({"url": "https://haut-labor.de/botox"}),
        };
        let mut request = LlmRequest::new(
            "gpt-4o-mini",
            vec![
                ChatMessage::system("You are helpful"),
                ChatMessage::user("Botox?"),
                ChatMessage::assistant_tool_calls("", vec![call]),
                ChatMessage::tool_result("call_1", "page text"),
            ],
        )
        .with_tools(vec![ToolDefinition {
            name: "get_page_content".to_string(),
            description: "Fetch a page".to_string(),
            parameters: json!({"type": "object"}),
        }]);
        request.temperature = Some(0.2);

        let body = serde_json::to_value(client.to_openai_request(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][2]["content"].is_null());
        assert_eq!(
            body["messages"][2]["tool_calls"][0]["function"]["arguments"],
            r#"{"url":"https://haut-labor.de/botox"}"#
        );
        assert_eq!(body["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "get_page_content");
    }

    #[test]
    fn test_response_conversion_with_tool_calls() {
        let client = OpenAiClient::new("sk-test");
        let raw = json!({
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "retrieve_relevant_clinic_information",
                            "arguments": "{\"user_query\": \"botox\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
        });

        let parsed: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let response = client.convert_response(parsed).unwrap();

        assert!(response.has_tool_calls());
        assert_eq!(response.message.content, "");
        assert_eq!(response.message.tool_calls[0].id, "call_abc");
        assert_eq!(response.message.tool_calls[0].arguments["user_query"], "botox");
        assert_eq!(response.usage.total_tokens, 120);
    }

    #[test]
    fn test_response_without_choices_is_error() {
        let client = OpenAiClient::new("sk-test");
        let parsed: OpenAiResponse =
            serde_json::from_value(json!({"model": "m", "choices": []})).unwrap();
        assert!(client.convert_response(parsed).is_err());
    }

    #[test]
    fn test_parse_arguments_keeps_malformed_text() {
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_arguments("{oops"), json!("{oops"));
    }
}
