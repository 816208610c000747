use reqwest::header::{HeaderValue, CONTENT_TYPE};
use tracing::debug;

use super::types::*;
use crate::error::{AiError, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Substrings in a provider error body that signal quota or rate exhaustion.
/// This classification lives here and nowhere else; everything downstream
/// matches on `AiError::RateLimited` instead of error text.
const RATE_LIMIT_TOKENS: &[&str] = &["quota", "rate", "429", "exceeded", "limit"];

pub struct GeminiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn classify(status: u16, message: String) -> AiError {
        let lower = message.to_lowercase();
        if status == 429 || RATE_LIMIT_TOKENS.iter().any(|t| lower.contains(t)) {
            AiError::RateLimited(message)
        } else {
            AiError::Api { status, message }
        }
    }

    /// Single-turn text generation against one named model.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        debug!(model, "Gemini generateContent request");

        let request = GenerateContentRequest::user_text(prompt);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Self::classify(status, message));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(AiError::EmptyCompletion("gemini"));
        }
        Ok(text)
    }
}
