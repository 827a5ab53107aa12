//! Dry-run of the web search decision.

use clap::Args;
use clinic_assistant::build_manager;
use clinic_core::{config::AppConfig, AppResult};

/// Show how questions would be routed, using fixed answers
#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    /// Questions to analyze
    #[arg(required = true)]
    pub questions: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Analyzing {} questions", self.questions.len());

        let manager = build_manager(config, true)?;

        let mut reports = Vec::with_capacity(self.questions.len());
        for question in &self.questions {
            reports.push(manager.analyze(question).await);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
            return Ok(());
        }

        for report in &reports {
            println!("Query: {}", report.query);
            println!("  Knowledge answer: {}", report.rag_response);
            println!("  Needs web search: {}", report.needs_web_search);
            if let Some(ref query) = report.web_search_query {
                println!("  Web search query: {}", query);
            }
            if !report.decision_keywords.is_empty() {
                println!("  Keywords: {}", report.decision_keywords.join(", "));
            }
            println!();
        }

        Ok(())
    }
}
