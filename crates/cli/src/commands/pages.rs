//! Direct access to indexed clinic pages.

use clap::Args;
use clinic_assistant::build_retriever;
use clinic_core::{config::AppConfig, AppResult};

/// List indexed clinic page urls
#[derive(Args, Debug)]
pub struct PagesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PagesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let retriever = build_retriever(config)?;
        let urls = retriever.list_documents().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&urls)?);
        } else if urls.is_empty() {
            println!("No pages indexed for {}", config.clinic.domain);
        } else {
            for url in &urls {
                println!("{}", url);
            }
        }

        Ok(())
    }
}

/// Print the full content of one page
#[derive(Args, Debug)]
pub struct PageCommand {
    /// Page url
    pub url: String,
}

impl PageCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let retriever = build_retriever(config)?;
        println!("{}", retriever.get_document(&self.url).await);
        Ok(())
    }
}
