//! Clinic assistant CLI
//!
//! Main entry point for the clinic command-line tool: answers questions
//! about the clinic from its website content, supplemented by web search.

mod commands;

use clap::{Parser, Subcommand};
use clinic_core::{config::AppConfig, logging, AppError, AppResult};
use commands::{
    AnalyzeCommand, AskCommand, ChatCommand, ImportCommand, PageCommand, PagesCommand,
    PromptsCommand,
};
use std::path::PathBuf;

/// Clinic assistant - answers from clinic knowledge, supplemented by the web
#[derive(Parser, Debug)]
#[command(name = "clinic")]
#[command(about = "Aesthetic clinic Q&A assistant with RAG and web search", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CLINIC_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CLINIC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log line format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "CLINIC_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "CLINIC_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskCommand),

    /// Interactive conversation
    Chat(ChatCommand),

    /// Dry-run the web search decision with fixed answers
    Analyze(AnalyzeCommand),

    /// List indexed clinic pages
    Pages(PagesCommand),

    /// Print one clinic page
    Page(PageCommand),

    /// Import crawled page chunks into the local store
    Import(ImportCommand),

    /// List prompts and their overrides
    Prompts(PromptsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Ask(_) => "ask",
            Self::Chat(_) => "chat",
            Self::Analyze(_) => "analyze",
            Self::Pages(_) => "pages",
            Self::Page(_) => "page",
            Self::Import(_) => "import",
            Self::Prompts(_) => "prompts",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let log_format = match cli.log_format.as_deref() {
        Some(name) => Some(
            logging::LogFormat::parse(name)
                .ok_or_else(|| AppError::Config(format!("Unknown log format: {}", name)))?,
        ),
        None => None,
    };

    // The workspace and config file decide which YAML file is merged
    let mut config = AppConfig::load()?;
    if cli.workspace.is_some() || cli.config.is_some() {
        config = config.with_overrides(
            cli.workspace.clone(),
            cli.config.clone(),
            None,
            None,
            None,
            None,
            false,
            false,
        );
        config.load_file()?;
    }

    // Apply CLI overrides
    let config = config.with_overrides(
        None,
        None,
        cli.provider,
        cli.model,
        cli.log_level,
        log_format,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.log_format, config.no_color)?;

    tracing::info!("Clinic assistant starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Analyze(cmd) => cmd.execute(&config).await,
        Commands::Pages(cmd) => cmd.execute(&config).await,
        Commands::Page(cmd) => cmd.execute(&config).await,
        Commands::Import(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
