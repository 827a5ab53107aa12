//! Interactive chat session.

use clap::Args;
use clinic_assistant::{build_manager, AnswerStatus, DecisionManager};
use clinic_core::{config::AppConfig, AppResult};
use clinic_llm::ChatMessage;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Chat with the clinic assistant
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Answer with fixed responses instead of the LLM
    #[arg(long)]
    pub offline: bool,
}

/// What to do with one line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Help,
    Quit,
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => Input::Empty,
        "help" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Question(line),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let manager = build_manager(config, self.offline)?;
        let clinic = manager.clinic().clone();

        println!("{} assistant. Type 'help' for commands, 'quit' to leave.", clinic.name);

        let mut history: Vec<ChatMessage> = Vec::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("\n> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match classify(&line) {
                Input::Empty => continue,
                Input::Quit => break,
                Input::Help => print_help(&manager),
                Input::Question(question) => {
                    let reply = manager.process(question, &history).await;
                    println!("\n{}", reply.answer);
                    if reply.knowledge_status == AnswerStatus::Failed {
                        println!(
                            "\nIf the problem persists, please contact us at {}.",
                            clinic.contact_line()
                        );
                    }
                    history.extend(reply.history_entries());
                    tracing::debug!("History now holds {} messages", history.len());
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }
}

fn print_help(manager: &DecisionManager) {
    let clinic = manager.clinic();
    println!("Ask any question about {} and its treatments.", clinic.name);
    println!("Questions about prices, studies or recent developments are");
    println!("supplemented with current web information.");
    println!();
    println!("  help              Show this message");
    println!("  quit, exit, q     End the session");
}
