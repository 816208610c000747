use serde::{Deserialize, Serialize};

/// Search depth mode. `Advanced` is the deep batch mode; `News` hits the
/// recent-news index for hotspot monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Advanced,
    News,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest {
    pub api_key: String,
    pub query: String,
    pub search_depth: SearchDepth,
    pub max_results: u32,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<TavilyResult>,
}

/// One ranked search result.
#[derive(Debug, Clone, Deserialize)]
pub struct TavilyResult {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}
