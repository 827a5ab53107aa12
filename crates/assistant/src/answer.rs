//! Answers produced by an answering agent.

use clinic_llm::ChatMessage;
use serde::{Deserialize, Serialize};

/// Whether the agent produced a real answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Complete,
    /// The agent gave up; `text` is an apology for the user
    Failed,
}

/// Outcome of one agent run.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub status: AnswerStatus,

    /// New history entries: the user prompt and the assistant text
    pub messages: Vec<ChatMessage>,
}

impl Answer {
    pub fn complete(prompt: &str, text: impl Into<String>) -> Self {
        Self::with_status(prompt, text.into(), AnswerStatus::Complete)
    }

    pub fn failed(prompt: &str, text: impl Into<String>) -> Self {
        Self::with_status(prompt, text.into(), AnswerStatus::Failed)
    }

    fn with_status(prompt: &str, text: String, status: AnswerStatus) -> Self {
        let messages = vec![ChatMessage::user(prompt), ChatMessage::assistant(&text)];
        Self {
            text,
            status,
            messages,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == AnswerStatus::Complete
    }
}

/// Something that answers a prompt given the conversation so far.
///
/// Implementations never fail; problems are reported through
/// [`AnswerStatus::Failed`].
#[async_trait::async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    async fn run(&self, prompt: &str, history: &[ChatMessage]) -> Answer;
}
