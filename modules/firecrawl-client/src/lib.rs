pub mod error;

pub use error::{FirecrawlError, Result};

use serde::Deserialize;

const BASE_URL: &str = "https://api.firecrawl.dev";

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}

pub struct FirecrawlClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Scrape a URL and return its markdown rendering.
    pub async fn scrape(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}/v1/scrape", self.base_url);
        let body = serde_json::json!({ "url": url, "formats": ["markdown"] });

        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ScrapeResponse = resp.json().await?;
        parsed
            .data
            .and_then(|d| d.markdown)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| FirecrawlError::EmptyContent(url.to_string()))
    }
}
