//! Supplementary web search for the clinic assistant.
//!
//! Tavily is queried first, DuckDuckGo instant answers second, and a
//! disclaimer record stands in when neither produces anything.

pub mod format;
pub mod providers;
pub mod searcher;
pub mod types;

pub use format::format_results;
pub use searcher::{WebSearch, WebSearcher};
pub use types::SearchResult;
