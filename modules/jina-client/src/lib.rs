pub mod error;

pub use error::{JinaError, Result};

use std::time::Duration;

const BASE_URL: &str = "https://r.jina.ai";

pub struct JinaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl JinaClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
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

    /// Fetch the rendered plain-text content of a page via the Reader endpoint.
    pub async fn read(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}/{}", self.base_url, url);

        let resp = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Return-Format", "text")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(JinaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
