//! Prompt listing.

use clap::Args;
use clinic_core::{config::AppConfig, AppResult};
use clinic_prompt::{builtin_prompt, list_prompts, resolve_prompt};

/// List available prompts and where each one comes from
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut rows = Vec::new();
        for id in list_prompts(&config.workspace)? {
            let definition = resolve_prompt(&config.workspace, &id)?;
            let source = if config
                .clinic_dir()
                .join("prompts")
                .join(format!("{}.yml", id))
                .exists()
            {
                "workspace"
            } else if builtin_prompt(&id).is_ok() {
                "built-in"
            } else {
                "unknown"
            };
            rows.push((id, definition.title, source));
        }

        if self.json {
            let output: Vec<_> = rows
                .iter()
                .map(|(id, title, source)| {
                    serde_json::json!({"id": id, "title": title, "source": source})
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for (id, title, source) in &rows {
                println!("{:<20} {:<10} {}", id, source, title);
            }
        }

        Ok(())
    }
}
