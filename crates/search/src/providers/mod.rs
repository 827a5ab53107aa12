//! Response parsing for the supported search providers.

pub mod duckduckgo;
pub mod tavily;
