//! DuckDuckGo instant answers (`GET /?format=json`).

use crate::types::SearchResult;
use serde_json::Value;

/// Url label used when the instant answer carries no source link.
const FALLBACK_SOURCE: &str = "DuckDuckGo";

/// Abstract, then definition, then related topics, until `max_results`.
pub fn parse_response(body: &Value, query: &str, max_results: usize) -> Vec<SearchResult> {
    let text = |key: &str| {
        body.get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    };
    let source = |key: &str| text(key).unwrap_or(FALLBACK_SOURCE).to_string();

    let mut results = Vec::new();

    if let Some(abstract_text) = text("Abstract") {
        results.push(SearchResult::new(
            format!("Information about: {}", query),
            source("AbstractURL"),
            abstract_text,
            0.8,
        ));
    }

    if let Some(definition) = text("Definition") {
        results.push(SearchResult::new(
            format!("Definition: {}", query),
            source("DefinitionURL"),
            definition,
            0.7,
        ));
    }

    if let Some(topics) = body.get("RelatedTopics").and_then(|v| v.as_array()) {
        collect_topics(topics, max_results, &mut results);
    }

    results.truncate(max_results);
    results
}

/// Related topics may be grouped under `Topics`; groups are flattened.
fn collect_topics(items: &[Value], max_results: usize, results: &mut Vec<SearchResult>) {
    for item in items {
        if results.len() >= max_results {
            return;
        }
        if let Some(group) = item.get("Topics").and_then(|v| v.as_array()) {
            collect_topics(group, max_results, results);
            continue;
        }
        let Some(text) = item
            .get("Text")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
        else {
            continue;
        };
        let url = item.get("FirstURL").and_then(|v| v.as_str()).unwrap_or("");
        results.push(SearchResult::new("Related Information", url, text, 0.6));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_order() {
        let body = json!({
            "Abstract": "Botulinum toxin is a neurotoxic protein.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Botulinum_toxin",
            "Definition": "A toxin produced by Clostridium botulinum.",
            "DefinitionURL": "",
            "RelatedTopics": [
                {"Text": "Cosmetic use", "FirstURL": "https://duckduckgo.com/Cosmetic"},
                {"Name": "Group", "Topics": [
                    {"Text": "Migraine", "FirstURL": "https://duckduckgo.com/Migraine"}
                ]}
            ]
        });

        let results = parse_response(&body, "botox", 10);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].title, "Information about: botox");
        assert_eq!(results[0].score, 0.8);
        assert_eq!(results[1].title, "Definition: botox");
        assert_eq!(results[1].url, "DuckDuckGo");
        assert_eq!(results[2].title, "Related Information");
        assert_eq!(results[3].content, "Migraine");
    }

    #[test]
    fn test_cap_applies_across_sources() {
        let body = json!({
            "Abstract": "a",
            "RelatedTopics": [
                {"Text": "t1", "FirstURL": "u1"},
                {"Text": "t2", "FirstURL": "u2"},
                {"Text": "t3", "FirstURL": "u3"}
            ]
        });
        let results = parse_response(&body, "q", 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].content, "t2");
    }

    #[test]
    fn test_topics_without_text_are_ignored() {
        let body = json!({"Abstract": "", "RelatedTopics": [{"FirstURL": "u"}]});
        assert!(parse_response(&body, "q", 3).is_empty());
    }
}
