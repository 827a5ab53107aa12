//! Command handlers for the clinic CLI.

pub mod analyze;
pub mod ask;
pub mod chat;
pub mod import;
pub mod pages;
pub mod prompts;

pub use analyze::AnalyzeCommand;
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use import::ImportCommand;
pub use pages::{PageCommand, PagesCommand};
pub use prompts::PromptsCommand;
