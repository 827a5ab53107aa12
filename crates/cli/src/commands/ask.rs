//! Ask command handler.
//!
//! Answers one question through the decision manager.

use clap::Args;
use clinic_assistant::{build_manager, AssistantReply};
use clinic_core::{config::AppConfig, AppError, AppResult};

/// Ask the clinic assistant a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Output as JSON with decision metadata
    #[arg(long)]
    pub json: bool,

    /// Answer with fixed responses instead of the LLM
    #[arg(long)]
    pub offline: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question.join(" ");
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let manager = build_manager(config, self.offline)?;
        let reply = manager.process(&question, &[]).await;

        if self.json {
            println!("{}", reply_json(&reply, config, manager.web_results())?);
        } else {
            println!("{}", reply.answer);
        }

        Ok(())
    }
}

fn reply_json(
    reply: &AssistantReply,
    config: &AppConfig,
    web_result_cap: usize,
) -> AppResult<String> {
    let output = serde_json::json!({
        "answer": reply.answer,
        "source": reply.source,
        "provider": config.provider,
        "model": config.model,
        "decision": {
            "needsWebSearch": reply.decision.needs_web_search,
            "keywords": reply.decision.matched_keywords,
            "indicators": reply.decision.matched_indicators,
            "shortAnswer": reply.decision.short_answer,
            "noInformation": reply.decision.no_information,
        },
        "searchQuery": reply.search_query,
        "webResultCap": web_result_cap,
        "webResults": reply.web_results,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}
