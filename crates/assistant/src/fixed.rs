//! Deterministic answering for dry runs and offline use.

use crate::answer::{Answer, AnswerProvider};
use clinic_core::ClinicProfile;
use clinic_llm::ChatMessage;

const RESEARCH_TERMS: [&str; 5] = ["study", "studies", "research", "clinical", "evidence"];
const PRICING_TERMS: [&str; 3] = ["price", "cost", "pricing"];

/// Heading that marks a prompt built from the synthesis template.
const WEB_SECTION_MARKER: &str = "CURRENT WEB INFORMATION:";
const INSTRUCTIONS_MARKER: &str = "CRITICAL INSTRUCTIONS:";

/// Answers from fixed text without calling any model.
#[derive(Debug, Clone)]
pub struct FixedAnswerProvider {
    clinic: ClinicProfile,
}

impl FixedAnswerProvider {
    pub fn new(clinic: ClinicProfile) -> Self {
        Self { clinic }
    }

    fn knowledge_answer(&self, prompt: &str) -> String {
        let query = prompt.to_lowercase();

        if RESEARCH_TERMS.iter().any(|t| query.contains(t)) {
            return "I don't have current information about recent studies on this topic. \
                    For the most up-to-date research, you may want to consult medical databases."
                .to_string();
        }

        if PRICING_TERMS.iter().any(|t| query.contains(t)) {
            return "I don't have current pricing information. Please contact the clinic \
                    directly for the most up-to-date pricing."
                .to_string();
        }

        format!(
            "Based on {}'s knowledge base, here is information about your question regarding \
             '{}'. {} and the team offer personal consultations covering suitable treatments, \
             expected results and aftercare, so this clinic-specific information should answer \
             your question fully. You can reach the clinic at {}.",
            self.clinic.name,
            prompt.trim(),
            self.clinic.doctor,
            self.clinic.contact_line()
        )
    }

    /// Combined answer quoting only the web block of the prompt.
    fn synthesis_answer(&self, prompt: &str) -> String {
        let web_section = prompt
            .split_once(WEB_SECTION_MARKER)
            .map(|(_, rest)| {
                rest.split_once(INSTRUCTIONS_MARKER)
                    .map_or(rest, |(section, _)| section)
            })
            .unwrap_or_default()
            .trim();

        format!(
            "Here is a summary combining {}'s clinic information with current web sources.\n\n\
             {}\n\n\
             Please discuss any treatment with a qualified medical professional. {} is \
             available at {}.",
            self.clinic.name,
            web_section,
            self.clinic.doctor,
            self.clinic.contact_line()
        )
    }
}

#[async_trait::async_trait]
impl AnswerProvider for FixedAnswerProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn run(&self, prompt: &str, _history: &[ChatMessage]) -> Answer {
        let text = if prompt.contains(WEB_SECTION_MARKER) {
            self.synthesis_answer(prompt)
        } else {
            self.knowledge_answer(prompt)
        };
        Answer::complete(prompt, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> FixedAnswerProvider {
        FixedAnswerProvider::new(ClinicProfile::default())
    }

    #[tokio::test]
    async fn test_research_wins_over_pricing() {
        let answer = provider()
            .run("Clinical studies on the cost of fillers", &[])
            .await;
        assert!(answer.text.starts_with("I don't have current information about recent studies"));
    }

    #[tokio::test]
    async fn test_pricing_answer() {
        let answer = provider().run("How much does Botox cost?", &[]).await;
        assert!(answer.text.starts_with("I don't have current pricing information"));
    }

    #[tokio::test]
    async fn test_general_answer_is_long() {
        let answer = provider().run("Hi", &[]).await;
        assert!(answer.is_complete());
        assert!(answer.text.trim().len() >= 200);
        assert!(answer.text.contains("'Hi'"));
    }

    #[tokio::test]
    async fn test_synthesis_quotes_web_block_only() {
        let prompt = "Based on the user's question: \"q\"\n\n\
                      1. CLINIC KNOWLEDGE:\nclinic text\n\n\
                      2. CURRENT WEB INFORMATION:\n## Web Search Results\n**Source:** https://who.int/x\n\n\
                      CRITICAL INSTRUCTIONS:\n- Do NOT create fake URLs";

        let answer = provider().run(prompt, &[]).await;

        assert!(answer.text.contains("**Source:** https://who.int/x"));
        assert!(!answer.text.contains("CRITICAL INSTRUCTIONS"));
        assert!(!answer.text.contains("clinic text"));
    }
}
