pub mod error;
pub mod types;

pub use error::{Result, TavilyError};
pub use types::{SearchDepth, TavilyResult};

use types::{SearchRequest, SearchResponse};

const BASE_URL: &str = "https://api.tavily.com";

pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Run one search request and return its ranked results.
    pub async fn search(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: u32,
    ) -> Result<Vec<TavilyResult>> {
        tracing::info!(query, ?depth, max_results, "Tavily search");

        let request = SearchRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            search_depth: depth,
            max_results,
            include_answer: true,
            include_raw_content: false,
        };

        let url = format!("{}/search", self.base_url);
        let resp = self.client.post(&url).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TavilyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: SearchResponse = resp.json().await?;

        tracing::info!(query, count = data.results.len(), "Tavily search complete");
        Ok(data.results)
    }
}
