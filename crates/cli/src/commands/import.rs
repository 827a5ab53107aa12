//! Import crawled pages into the local store.

use clap::Args;
use clinic_assistant::{open_embedder, open_local_store};
use clinic_core::{config::AppConfig, AppResult};
use clinic_knowledge::import_pages;
use std::path::PathBuf;

/// Load page chunks from a JSON Lines file into the local store
#[derive(Args, Debug)]
pub struct ImportCommand {
    /// JSON Lines file (url, chunk_number, title, content per line)
    pub file: PathBuf,

    /// Remove all stored chunks first
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ImportCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Importing {:?}", self.file);

        let store = open_local_store(config)?;
        if self.reset {
            store.reset()?;
        }
        let embedder = open_embedder(config)?;

        let stats = import_pages(&self.file, &store, embedder.as_ref()).await?;
        let total = store.count_chunks()?;

        if self.json {
            let output = serde_json::json!({
                "chunksImported": stats.chunks_imported,
                "pages": stats.pages,
                "linesSkipped": stats.lines_skipped,
                "totalChunks": total,
                "store": config.local_store_path(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Imported {} chunks from {} pages ({} lines skipped); {} chunks in store",
                stats.chunks_imported, stats.pages, stats.lines_skipped, total
            );
        }

        Ok(())
    }
}
