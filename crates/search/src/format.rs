//! Markdown rendering of search results for model prompts.

use crate::types::SearchResult;

const CONTENT_LIMIT: usize = 300;

const DISCLAIMER: &str = "*The following information comes from external web sources and is \
provided for general reference only. It is not medical advice.*";

/// Render results as a markdown block, keeping their order.
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No search results found.".to_string();
    }

    let mut out = format!("## Web Search Results\n\n{}\n\n", DISCLAIMER);
    for (i, result) in results.iter().enumerate() {
        let source = if result.url.is_empty() {
            "Unknown source"
        } else {
            result.url.as_str()
        };
        out.push_str(&format!("### Result {}: {}\n", i + 1, result.title));
        out.push_str(&format!("**Source:** {}\n", source));
        out.push_str(&format!("**Content:** {}\n\n", truncate(&result.content)));
        out.push_str("---\n\n");
    }
    out.trim_end().to_string()
}

fn truncate(content: &str) -> String {
    if content.chars().count() <= CONTENT_LIMIT {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(CONTENT_LIMIT).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_results() {
        assert_eq!(format_results(&[]), "No search results found.");
    }

    #[test]
    fn test_layout() {
        let results = vec![
            SearchResult::new("Direct Answer", "Multiple sources", "Short answer", 1.0),
            SearchResult::new("Web Search Unavailable", "", "Please call", 0.1),
        ];

        let text = format_results(&results);

        assert!(text.starts_with("## Web Search Results\n"));
        assert!(text.contains("not medical advice"));
        assert!(text.contains("### Result 1: Direct Answer\n**Source:** Multiple sources\n"));
        assert!(text.contains("### Result 2: Web Search Unavailable\n**Source:** Unknown source\n"));
        assert!(text.find("Result 1").unwrap() < text.find("Result 2").unwrap());
        assert!(text.ends_with("---"));
    }

    #[test]
    fn test_long_content_truncated() {
        let long = "ä".repeat(400);
        let text = format_results(&[SearchResult::new("t", "u", long, 0.5)]);
        let expected = format!("**Content:** {}...", "ä".repeat(300));
        assert!(text.contains(&expected));
        assert!(!text.contains(&"ä".repeat(301)));
    }
}
