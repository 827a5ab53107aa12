//! LLM answering agent with clinic retrieval tools.

use crate::answer::{Answer, AnswerProvider};
use clinic_core::{AppError, AppResult};
use clinic_knowledge::ClinicTools;
use clinic_llm::{ChatMessage, LlmClient, LlmRequest, LlmResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_MAX_TOOL_ROUNDS: usize = 6;
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Answers questions with a chat model that can call [`ClinicTools`].
pub struct ClinicAgent {
    client: Arc<dyn LlmClient>,
    model: String,
    system_prompt: String,
    tools: ClinicTools,
    max_tool_rounds: usize,
    retries: u32,
    retry_delay: Duration,
}

impl ClinicAgent {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        tools: ClinicTools,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            system_prompt: system_prompt.into(),
            tools,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Limit the number of tool-calling rounds before a final answer is forced.
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Extra attempts per model call, and the base delay between them.
    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    fn failure_message(&self) -> String {
        format!(
            "I'm sorry, an error occurred while processing your question. Please try again \
             later or contact the clinic directly at {}.",
            self.tools.retriever().clinic().contact_line()
        )
    }

    /// One model call with retries and exponential backoff.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let mut attempt = 0;
        loop {
            match self.client.complete(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retries => {
                    let delay = self.retry_delay.saturating_mul(2u32.saturating_pow(attempt));
                    warn!(
                        "Model call failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.retries + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn run_loop(&self, prompt: &str, history: &[ChatMessage]) -> AppResult<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(&self.system_prompt));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(prompt));

        let definitions = self.tools.definitions();

        for round in 0..=self.max_tool_rounds {
            let mut request = LlmRequest::new(&self.model, messages.clone());
            if round < self.max_tool_rounds {
                request = request.with_tools(definitions.clone());
            } else {
                debug!("Tool round limit reached, requesting a final answer");
            }

            let response = self.complete(&request).await?;
            if !response.has_tool_calls() {
                let text = response.message.content;
                if text.trim().is_empty() {
                    return Err(AppError::Llm("Model returned an empty answer".to_string()));
                }
                return Ok(text);
            }
            if round == self.max_tool_rounds {
                return Err(AppError::Llm(format!(
                    "Model still requested tools after {} rounds",
                    self.max_tool_rounds
                )));
            }

            let calls = response.message.tool_calls.clone();
            messages.push(response.message);
            for call in calls {
                info!("Calling tool {}", call.name);
                let output = self.tools.call(&call.name, &call.arguments).await;
                messages.push(ChatMessage::tool_result(call.id, output));
            }
        }

        Err(AppError::Llm("Tool loop ended without an answer".to_string()))
    }
}

#[async_trait::async_trait]
impl AnswerProvider for ClinicAgent {
    fn name(&self) -> &str {
        self.client.provider_name()
    }

    #[instrument(skip(self, prompt, history), fields(model = %self.model, history = history.len()))]
    async fn run(&self, prompt: &str, history: &[ChatMessage]) -> Answer {
        match self.run_loop(prompt, history).await {
            Ok(text) => Answer::complete(prompt, text),
            Err(e) => {
                error!("Answering agent failed: {}", e);
                Answer::failed(prompt, self.failure_message())
            }
        }
    }
}
