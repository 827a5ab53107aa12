//! Test doubles shared by the agent and manager tests.

use clinic_core::{AppError, AppResult};
use clinic_llm::{ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use clinic_search::{SearchResult, WebSearch};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned model replies and records every request.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<AppResult<ChatMessage>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<AppResult<ChatMessage>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("script exhausted".to_string())))?;
        Ok(LlmResponse {
            message: reply,
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
        })
    }
}

/// Returns fixed results and records each query with its result cap.
pub struct StaticSearch {
    results: Vec<SearchResult>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticSearch {
    pub fn with(results: Vec<SearchResult>) -> Arc<Self> {
        Arc::new(Self {
            results,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }

    pub fn caps(&self) -> Vec<usize> {
        self.queries.lock().unwrap().iter().map(|(_, cap)| *cap).collect()
    }
}

#[async_trait::async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        self.results.clone()
    }
}
