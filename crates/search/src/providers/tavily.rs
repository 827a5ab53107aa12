//! Tavily search API (`POST /search`).

use crate::types::SearchResult;
use serde::Serialize;
use serde_json::Value;

/// Score for hits that arrive without one.
const DEFAULT_SCORE: f64 = 0.5;

#[derive(Debug, Serialize)]
pub struct TavilyRequest<'a> {
    pub api_key: &'a str,
    pub query: &'a str,
    pub search_depth: &'static str,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub max_results: usize,
    pub include_domains: &'a [String],
    pub exclude_domains: Vec<String>,
}

impl<'a> TavilyRequest<'a> {
    pub fn new(
        api_key: &'a str,
        query: &'a str,
        max_results: usize,
        include_domains: &'a [String],
    ) -> Self {
        Self {
            api_key,
            query,
            search_depth: "basic",
            include_answer: true,
            include_raw_content: false,
            max_results,
            include_domains,
            exclude_domains: Vec::new(),
        }
    }
}

/// Direct answer first, then hits in provider order, capped at `max_results`.
pub fn parse_response(body: &Value, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if let Some(answer) = body.get("answer").and_then(|v| v.as_str()) {
        if !answer.trim().is_empty() {
            results.push(SearchResult::new(
                "Direct Answer",
                "Multiple sources",
                answer,
                1.0,
            ));
        }
    }

    for item in body
        .get("results")
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or_default()
    {
        let field = |key: &str| item.get(key).and_then(|v| v.as_str()).unwrap_or("");
        let (title, url, content) = (field("title"), field("url"), field("content"));
        if title.is_empty() && content.is_empty() {
            continue;
        }
        let score = item
            .get("score")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_SCORE);
        results.push(SearchResult::new(title, url, content, score));
    }

    results.truncate(max_results);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let domains = vec!["pubmed.ncbi.nlm.nih.gov".to_string()];
        let body =
            serde_json::to_value(TavilyRequest::new("tvly-key", "botox study", 3, &domains))
                .unwrap();

        assert_eq!(body["search_depth"], "basic");
        assert_eq!(body["include_answer"], true);
        assert_eq!(body["include_raw_content"], false);
        assert_eq!(body["max_results"], 3);
        assert_eq!(body["include_domains"][0], "pubmed.ncbi.nlm.nih.gov");
        assert_eq!(body["exclude_domains"], json!([]));
    }

    #[test]
    fn test_answer_first_and_default_score() {
        let body = json!({
            "answer": "Botox lasts 3-4 months.",
            "results": [
                {"title": "Duration", "url": "https://a.org", "content": "3-4 months", "score": 0.91},
                {"title": "No score", "url": "https://b.org", "content": "text"}
            ]
        });

        let results = parse_response(&body, 5);

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            SearchResult::new("Direct Answer", "Multiple sources", "Botox lasts 3-4 months.", 1.0)
        );
        assert_eq!(results[1].score, 0.91);
        assert_eq!(results[2].score, 0.5);
    }

    #[test]
    fn test_cap_includes_direct_answer() {
        let body = json!({
            "answer": "A",
            "results": [
                {"title": "1", "url": "u1", "content": "c1"},
                {"title": "2", "url": "u2", "content": "c2"},
                {"title": "3", "url": "u3", "content": "c3"}
            ]
        });
        let results = parse_response(&body, 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].title, "2");
    }

    #[test]
    fn test_empty_body_yields_nothing() {
        assert!(parse_response(&json!({"answer": null, "results": []}), 3).is_empty());
        assert!(parse_response(&json!({}), 3).is_empty());
    }
}
