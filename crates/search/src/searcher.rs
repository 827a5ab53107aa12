//! Web search with provider fallback.

use crate::providers::{duckduckgo, tavily};
use crate::types::SearchResult;
use clinic_core::config::SearchSettings;
use clinic_core::{AppError, AppResult, ClinicProfile};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const PRIMARY_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of supplementary web information.
///
/// Implementations never fail and never return an empty list; when nothing
/// can be found they return a single disclaimer record instead.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult>;
}

/// HTTP searcher: Tavily first, DuckDuckGo instant answers second.
#[derive(Debug, Clone)]
pub struct WebSearcher {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    fallback_endpoint: String,
    include_domains: Vec<String>,
    clinic: ClinicProfile,
}

impl WebSearcher {
    pub fn new(
        settings: &SearchSettings,
        api_key: Option<String>,
        clinic: ClinicProfile,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("clinic-assistant/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Search(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            fallback_endpoint: settings.fallback_endpoint.trim_end_matches('/').to_string(),
            include_domains: settings.include_domains.clone(),
            clinic,
        })
    }

    /// Whether the primary provider will be tried.
    pub fn has_primary(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, api_key))]
    async fn search_tavily(
        &self,
        api_key: &str,
        query: &str,
        max_results: usize,
    ) -> AppResult<Vec<SearchResult>> {
        let body = tavily::TavilyRequest::new(api_key, query, max_results, &self.include_domains);
        let request = self
            .client
            .post(format!("{}/search", self.endpoint))
            .timeout(PRIMARY_TIMEOUT)
            .json(&body);
        let response = fetch_json(request, "Tavily").await?;
        Ok(tavily::parse_response(&response, max_results))
    }

    #[instrument(skip(self))]
    async fn search_duckduckgo(
        &self,
        query: &str,
        max_results: usize,
    ) -> AppResult<Vec<SearchResult>> {
        let request = self
            .client
            .get(format!("{}/", self.fallback_endpoint))
            .timeout(FALLBACK_TIMEOUT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ]);
        let response = fetch_json(request, "DuckDuckGo").await?;
        Ok(duckduckgo::parse_response(&response, query, max_results))
    }

    /// Record returned when no provider produced anything.
    pub fn unavailable_result(&self, query: &str) -> SearchResult {
        SearchResult::new(
            "Web Search Unavailable",
            "",
            format!(
                "I cannot search the web for current information about '{}' at the moment. \
                 For medical research, please consult official sources such as PubMed or the WHO, \
                 or contact the clinic directly for the most up-to-date information at {}.",
                query,
                self.clinic.contact_line()
            ),
            0.1,
        )
    }
}

async fn fetch_json(request: RequestBuilder, provider: &str) -> AppResult<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| AppError::Search(format!("{} request failed: {}", provider, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Search(format!(
            "{} returned status {}",
            provider, status
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Search(format!("Failed to parse {} response: {}", provider, e)))
}

#[async_trait::async_trait]
impl WebSearch for WebSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let max_results = max_results.max(1);
        let query = query.trim();

        if query.is_empty() {
            warn!("Empty search query");
            return vec![self.unavailable_result(query)];
        }

        if let Some(api_key) = &self.api_key {
            match self.search_tavily(api_key, query, max_results).await {
                Ok(results) if !results.is_empty() => {
                    info!("Tavily returned {} results", results.len());
                    return results;
                }
                Ok(_) => debug!("Tavily returned no results"),
                Err(e) => warn!("Tavily search failed: {}", e),
            }
        } else {
            debug!("No Tavily API key configured, using fallback search");
        }

        match self.search_duckduckgo(query, max_results).await {
            Ok(results) if !results.is_empty() => {
                info!("DuckDuckGo returned {} results", results.len());
                return results;
            }
            Ok(_) => debug!("DuckDuckGo returned no results"),
            Err(e) => warn!("DuckDuckGo search failed: {}", e),
        }

        warn!("All search providers failed for query");
        vec![self.unavailable_result(query)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_settings() -> SearchSettings {
        SearchSettings {
            endpoint: "http://127.0.0.1:1".to_string(),
            fallback_endpoint: "http://127.0.0.1:1/".to_string(),
            ..SearchSettings::default()
        }
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let searcher = WebSearcher::new(
            &SearchSettings::default(),
            Some("  ".to_string()),
            ClinicProfile::default(),
        )
        .unwrap();
        assert!(!searcher.has_primary());
    }

    #[tokio::test]
    async fn test_unreachable_providers_yield_disclaimer() {
        let searcher = WebSearcher::new(
            &unreachable_settings(),
            Some("tvly-test".to_string()),
            ClinicProfile::default(),
        )
        .unwrap();

        let results = searcher.search("botox studies", 3).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Web Search Unavailable");
        assert_eq!(results[0].url, "");
        assert_eq!(results[0].score, 0.1);
        assert!(results[0].content.contains("botox studies"));
        assert!(results[0].content.contains("info@haut-labor.de"));
    }

    #[tokio::test]
    async fn test_empty_query_yields_disclaimer() {
        let searcher =
            WebSearcher::new(&unreachable_settings(), None, ClinicProfile::default()).unwrap();

        let results = searcher.search("   ", 0).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Web Search Unavailable");
    }
}
