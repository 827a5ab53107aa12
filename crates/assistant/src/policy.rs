//! Heuristics deciding when clinic knowledge needs web supplementation.
//!
//! All matching is case-insensitive substring matching on the raw query and
//! the knowledge-base answer. Short keywords therefore also match inside
//! longer words ("now" in "know", "vs" in "obvs").

use chrono::{Datelike, Utc};
use serde::Serialize;

/// Query terms suggesting current or external information is wanted.
pub const CURRENT_INFO_KEYWORDS: &[&str] = &[
    "latest",
    "recent",
    "current",
    "new",
    "updated",
    "2024",
    "2025",
    "now",
    "today",
    "this year",
    "trending",
    "modern",
    "newest",
    "price",
    "cost",
    "availability",
    "schedule",
    "appointment",
    "comparison",
    "versus",
    "vs",
    "alternative",
    "competitor",
    "study",
    "studies",
    "research",
    "clinical trial",
    "evidence",
    "scientific",
    "pubmed",
    "journal",
    "publication",
    "findings",
];

/// Phrases in an answer that admit missing information.
pub const WEB_SEARCH_INDICATORS: &[&str] = &[
    "i don't have current information",
    "i cannot find specific information",
    "for the most up-to-date",
    "contact the clinic directly",
    "i don't have information about",
    "not available in my knowledge",
    "current pricing",
    "latest information",
    "recent developments",
];

/// Answers shorter than this (after trimming) are supplemented.
pub const SHORT_ANSWER_CHARS: usize = 200;

const NO_INFORMATION_SENTINEL: &str = "no relevant clinic information found";

const RESEARCH_TERMS: &[&str] = &["study", "studies", "research", "clinical trial"];
const PRICING_TERMS: &[&str] = &["price", "cost"];
const RECENCY_TERMS: &[&str] = &["latest", "new", "recent"];
const TREATMENT_TERMS: &[&str] = &["botox", "filler", "laser", "treatment"];

/// Outcome of the web search decision, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub needs_web_search: bool,

    /// Current-info keywords found in the query
    pub matched_keywords: Vec<String>,

    /// Indicator phrases found in the answer
    pub matched_indicators: Vec<String>,

    pub short_answer: bool,
    pub no_information: bool,
}

/// Keyword rules plus the values used to build search queries.
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    reference_year: i32,
    region: String,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new("Germany")
    }
}

impl DecisionPolicy {
    /// Policy for a clinic region, dated to the current UTC year.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            reference_year: Utc::now().year(),
            region: region.into(),
        }
    }

    /// Pin the year appended to search queries.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Current-info keywords contained in `query`, in list order.
    pub fn matched_keywords(&self, query: &str) -> Vec<String> {
        matches(CURRENT_INFO_KEYWORDS, &query.to_lowercase())
    }

    /// Decide whether the knowledge-base answer needs web supplementation.
    pub fn decide(&self, query: &str, answer: &str) -> Decision {
        let answer_lower = answer.to_lowercase();

        let matched_keywords = self.matched_keywords(query);
        let matched_indicators = matches(WEB_SEARCH_INDICATORS, &answer_lower);
        let short_answer = answer.trim().chars().count() < SHORT_ANSWER_CHARS;
        let no_information = answer_lower.contains(NO_INFORMATION_SENTINEL);

        Decision {
            needs_web_search: !matched_keywords.is_empty()
                || !matched_indicators.is_empty()
                || short_answer
                || no_information,
            matched_keywords,
            matched_indicators,
            short_answer,
            no_information,
        }
    }

    /// Append the search suffix for the first matching query category.
    pub fn derive_search_query(&self, query: &str) -> String {
        let lower = query.to_lowercase();
        let has_any = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));
        let year = self.reference_year;

        let suffix = if has_any(RESEARCH_TERMS) {
            format!("clinical studies pubmed research {}", year)
        } else if has_any(PRICING_TERMS) {
            format!("{} aesthetic clinic pricing {}", self.region, year)
        } else if has_any(RECENCY_TERMS) {
            format!("latest developments research {}", year)
        } else if has_any(TREATMENT_TERMS) {
            format!("clinical evidence medical literature {}", year)
        } else {
            "aesthetic medicine research".to_string()
        };

        format!("{} {}", query, suffix)
    }
}

fn matches(terms: &[&str], haystack: &str) -> Vec<String> {
    terms
        .iter()
        .filter(|t| haystack.contains(*t))
        .map(|t| t.to_string())
        .collect()
}
