//! Clinic question answering.
//!
//! Every query is first answered from the clinic's own website content. A
//! keyword and phrase heuristic then decides whether the answer needs
//! current information from the web; if so, web results are fetched and a
//! second pass merges both sources.

pub mod agent;
pub mod answer;
pub mod fixed;
pub mod manager;
pub mod policy;
pub mod setup;

#[cfg(test)]
mod testing;

pub use agent::ClinicAgent;
pub use answer::{Answer, AnswerProvider, AnswerStatus};
pub use fixed::FixedAnswerProvider;
pub use manager::{AnswerSource, AssistantReply, DecisionManager, DecisionReport};
pub use policy::{Decision, DecisionPolicy};
pub use setup::{build_manager, build_retriever, open_embedder, open_local_store, open_store};
