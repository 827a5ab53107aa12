//! Coordination of clinic knowledge, web search and answer synthesis.

use crate::answer::{AnswerProvider, AnswerStatus};
use crate::policy::{Decision, DecisionPolicy};
use clinic_core::ClinicProfile;
use clinic_llm::ChatMessage;
use clinic_prompt::{build_synthesis_prompt, PromptDefinition};
use clinic_search::{format_results, WebSearch};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default cap on web results for one query.
pub const WEB_RESULTS: usize = 3;

/// Where the final answer text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Knowledge-base answer returned as is
    Knowledge,
    /// Model answer combining knowledge and web results
    Synthesis,
    /// Knowledge answer with the web block appended
    Combined,
}

/// Final answer for one query, with the decision trail.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub query: String,
    pub answer: String,
    pub source: AnswerSource,

    /// Status of the knowledge-base pass
    pub knowledge_status: AnswerStatus,

    pub decision: Decision,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    /// Formatted web block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_results: Option<String>,
}

impl AssistantReply {
    /// Entries the caller appends to its conversation history.
    pub fn history_entries(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::user(&self.query),
            ChatMessage::assistant(&self.answer),
        ]
    }
}

/// Dry-run view of the decision for one query.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionReport {
    pub query: String,
    pub rag_response: String,
    pub needs_web_search: bool,
    pub web_search_query: Option<String>,
    pub decision_keywords: Vec<String>,
}

/// Answers clinic questions from the knowledge base first and falls back to
/// web search when the answer looks incomplete.
pub struct DecisionManager {
    agent: Arc<dyn AnswerProvider>,
    searcher: Arc<dyn WebSearch>,
    policy: DecisionPolicy,
    synthesis_prompt: PromptDefinition,
    clinic: ClinicProfile,
    web_results: usize,
}

impl DecisionManager {
    pub fn new(
        agent: Arc<dyn AnswerProvider>,
        searcher: Arc<dyn WebSearch>,
        policy: DecisionPolicy,
        synthesis_prompt: PromptDefinition,
        clinic: ClinicProfile,
    ) -> Self {
        Self {
            agent,
            searcher,
            policy,
            synthesis_prompt,
            clinic,
            web_results: WEB_RESULTS,
        }
    }

    /// Cap the web results fetched per query (at least one).
    pub fn with_web_results(mut self, max_results: usize) -> Self {
        self.web_results = max_results.max(1);
        self
    }

    pub fn clinic(&self) -> &ClinicProfile {
        &self.clinic
    }

    pub fn web_results(&self) -> usize {
        self.web_results
    }

    /// Answer one query.
    ///
    /// `history` is the caller's conversation so far; it is read, never
    /// modified. Use [`AssistantReply::history_entries`] to extend it.
    #[instrument(skip(self, history), fields(agent = self.agent.name()))]
    pub async fn process(&self, query: &str, history: &[ChatMessage]) -> AssistantReply {
        info!("Knowledge pass");
        let knowledge = self.agent.run(query, history).await;
        let decision = self.policy.decide(query, &knowledge.text);
        debug!("Decision: {:?}", decision);

        if !decision.needs_web_search {
            info!("Answering from clinic knowledge");
            return AssistantReply {
                query: query.to_string(),
                answer: knowledge.text,
                source: AnswerSource::Knowledge,
                knowledge_status: knowledge.status,
                decision,
                search_query: None,
                web_results: None,
            };
        }

        let search_query = self.policy.derive_search_query(query);
        info!("Web search pass: {}", search_query);
        let results = self.searcher.search(&search_query, self.web_results).await;
        let web_block = format_results(&results);

        info!("Synthesis pass");
        let (answer, source) = self
            .synthesize(query, &knowledge.text, &web_block, history)
            .await;

        AssistantReply {
            query: query.to_string(),
            answer,
            source,
            knowledge_status: knowledge.status,
            decision,
            search_query: Some(search_query),
            web_results: Some(web_block),
        }
    }

    async fn synthesize(
        &self,
        query: &str,
        knowledge: &str,
        web_block: &str,
        history: &[ChatMessage],
    ) -> (String, AnswerSource) {
        let combined = || {
            (
                format!(
                    "{}\n\n**Additional Current Information:**\n{}",
                    knowledge, web_block
                ),
                AnswerSource::Combined,
            )
        };

        let prompt = match build_synthesis_prompt(
            &self.synthesis_prompt,
            &self.clinic,
            query,
            knowledge,
            web_block,
        ) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Failed to build synthesis prompt: {}", e);
                return combined();
            }
        };

        let answer = self.agent.run(&prompt.content, history).await;
        if answer.is_complete() && !answer.text.trim().is_empty() {
            (answer.text, AnswerSource::Synthesis)
        } else {
            warn!("Synthesis failed, appending web results to the clinic answer");
            combined()
        }
    }

    /// Run the knowledge pass and the decision without searching.
    #[instrument(skip(self), fields(agent = self.agent.name()))]
    pub async fn analyze(&self, query: &str) -> DecisionReport {
        let knowledge = self.agent.run(query, &[]).await;
        let decision = self.policy.decide(query, &knowledge.text);
        let web_search_query = decision
            .needs_web_search
            .then(|| self.policy.derive_search_query(query));

        DecisionReport {
            query: query.to_string(),
            rag_response: knowledge.text,
            needs_web_search: decision.needs_web_search,
            web_search_query,
            decision_keywords: decision.matched_keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Answer;
    use crate::fixed::FixedAnswerProvider;
    use clinic_prompt::{builtin_prompt, SYNTHESIS_PROMPT_ID};
    use crate::testing::StaticSearch;
    use clinic_search::SearchResult;
    use std::sync::Mutex;

    /// Answers the first prompt, then repeats `later` for every other one.
    struct FirstThen {
        first: String,
        later: Answer,
        calls: Mutex<usize>,
    }

    impl FirstThen {
        fn new(first: &str, later: Answer) -> Arc<Self> {
            Arc::new(Self {
                first: first.to_string(),
                later,
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl AnswerProvider for FirstThen {
        fn name(&self) -> &str {
            "first-then"
        }

        async fn run(&self, prompt: &str, _history: &[ChatMessage]) -> Answer {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                Answer::complete(prompt, self.first.clone())
            } else {
                self.later.clone()
            }
        }
    }

    fn manager(agent: Arc<dyn AnswerProvider>, searcher: Arc<dyn WebSearch>) -> DecisionManager {
        DecisionManager::new(
            agent,
            searcher,
            DecisionPolicy::new("Germany").with_reference_year(2024),
            builtin_prompt(SYNTHESIS_PROMPT_ID).unwrap(),
            ClinicProfile::default(),
        )
    }

    fn fixed() -> Arc<dyn AnswerProvider> {
        Arc::new(FixedAnswerProvider::new(ClinicProfile::default()))
    }

    fn who_result() -> SearchResult {
        SearchResult::new(
            "Botox pricing",
            "https://www.who.int/botox",
            "Typical prices vary by region.",
            0.9,
        )
    }

    #[tokio::test]
    async fn test_knowledge_answer_returned_verbatim() {
        let search = StaticSearch::with(vec![who_result()]);
        let manager = manager(fixed(), search.clone());

        let reply = manager.process("Tell me about Dr. Pfahl", &[]).await;

        assert_eq!(reply.source, AnswerSource::Knowledge);
        assert!(!reply.decision.needs_web_search);
        assert!(reply.answer.contains("'Tell me about Dr. Pfahl'"));
        assert!(reply.search_query.is_none());
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_pricing_query_is_searched_and_synthesized() {
        let search = StaticSearch::with(vec![who_result()]);
        let manager = manager(fixed(), search.clone());

        let reply = manager
            .process("What is the latest price for Botox?", &[])
            .await;

        assert_eq!(reply.source, AnswerSource::Synthesis);
        assert_eq!(
            search.queries(),
            vec!["What is the latest price for Botox? Germany aesthetic clinic pricing 2024"]
        );
        assert!(reply.answer.contains("https://www.who.int/botox"));
        let web = reply.web_results.as_deref().unwrap();
        for word in reply.answer.split_whitespace() {
            if word.starts_with("http") {
                assert!(web.contains(word), "unexpected url {}", word);
            }
        }
    }

    #[tokio::test]
    async fn test_disclaimer_flows_into_synthesis() {
        let disclaimer = SearchResult::new(
            "Web Search Unavailable",
            "",
            "I cannot search the web right now.",
            0.1,
        );
        let manager = manager(fixed(), StaticSearch::with(vec![disclaimer]));

        let reply = manager.process("Any new clinical studies on HydraFacial?", &[]).await;

        assert_eq!(reply.source, AnswerSource::Synthesis);
        assert!(reply.answer.contains("Web Search Unavailable"));
        assert!(reply.answer.contains("Unknown source"));
    }

    #[tokio::test]
    async fn test_failed_synthesis_appends_web_block() {
        let agent = FirstThen::new("Short clinic answer.", Answer::failed("synthesis", "error"));
        let manager = manager(agent, StaticSearch::with(vec![who_result()]));

        let reply = manager.process("Opening hours", &[]).await;

        assert_eq!(reply.source, AnswerSource::Combined);
        assert!(reply.decision.short_answer);
        let web = reply.web_results.clone().unwrap();
        assert_eq!(
            reply.answer,
            format!("Short clinic answer.\n\n**Additional Current Information:**\n{}", web)
        );
    }

    #[tokio::test]
    async fn test_history_entries() {
        let manager = manager(fixed(), StaticSearch::with(vec![who_result()]));
        let reply = manager.process("Tell me about Dr. Pfahl", &[]).await;

        let entries = reply.history_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "Tell me about Dr. Pfahl");
        assert_eq!(entries[1].content, reply.answer);
    }

    #[tokio::test]
    async fn test_analyze_reports_decision() {
        let search = StaticSearch::with(Vec::new());
        let manager = manager(fixed(), search.clone());

        let report = manager.analyze("What are the latest botox studies?").await;

        assert!(report.needs_web_search);
        assert!(report.rag_response.contains("recent studies"));
        assert_eq!(
            report.web_search_query.as_deref(),
            Some("What are the latest botox studies? clinical studies pubmed research 2024")
        );
        assert_eq!(report.decision_keywords, vec!["latest", "studies"]);
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_synthesis_appends_web_block() {
        let agent = FirstThen::new("Short clinic answer.", Answer::complete("synthesis", " "));
        let manager = manager(agent, StaticSearch::with(vec![who_result()]));

        let reply = manager.process("Opening hours", &[]).await;

        assert_eq!(reply.source, AnswerSource::Combined);
        assert!(reply.answer.starts_with("Short clinic answer."));
        assert!(reply.answer.contains("https://www.who.int/botox"));
    }

    #[tokio::test]
    async fn test_search_uses_configured_cap() {
        let query = "What are the latest opening hours?";

        let search = StaticSearch::with(vec![who_result()]);
        manager(fixed(), search.clone()).process(query, &[]).await;
        assert_eq!(search.caps(), vec![WEB_RESULTS]);

        let search = StaticSearch::with(vec![who_result()]);
        manager(fixed(), search.clone())
            .with_web_results(5)
            .process(query, &[])
            .await;
        assert_eq!(search.caps(), vec![5]);
    }
}
