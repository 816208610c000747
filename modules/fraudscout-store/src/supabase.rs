use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use fraudscout_common::CaseRecord;

use crate::error::{Result, StoreError};
use crate::CaseStore;

const TABLE: &str = "fraud_cases";

/// Case store backed by a Supabase PostgREST table.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    #[serde(default)]
    event: String,
}

#[derive(Debug, Deserialize)]
struct SourceUrlRow {
    #[serde(default)]
    source_url: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: serde_json::Value,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.api_key).map_err(|e| StoreError::Network(e.to_string()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| StoreError::Network(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl CaseStore for SupabaseStore {
    async fn insert(&self, record: &CaseRecord) -> Result<()> {
        debug!(source_url = record.source_url.as_str(), "Inserting case record");

        let resp = self
            .client
            .post(self.table_url())
            .headers(self.headers()?)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            // PostgREST reports a unique-constraint violation as 409 with
            // Postgres error code 23505 in the body.
            if status.as_u16() == 409 || message.contains("23505") {
                return Err(StoreError::Conflict(record.source_url.clone()));
            }
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    async fn source_exists(&self, url: &str) -> Result<bool> {
        let resp = self
            .client
            .get(self.table_url())
            .headers(self.headers()?)
            .query(&[
                ("select", "id"),
                ("source_url", &format!("eq.{url}")),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<IdRow> = resp.json().await?;
        Ok(!rows.is_empty())
    }

    async fn recent_events(&self, limit: u32) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(self.table_url())
            .headers(self.headers()?)
            .query(&[
                ("select", "event"),
                ("order", "created_at.desc"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<EventRow> = resp.json().await?;
        Ok(rows.into_iter().map(|r| r.event).collect())
    }

    async fn source_urls(&self, limit: u32) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(self.table_url())
            .headers(self.headers()?)
            .query(&[
                ("select", "source_url"),
                ("order", "created_at.desc"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<SourceUrlRow> = resp.json().await?;
        Ok(rows.into_iter().map(|r| r.source_url).collect())
    }
}
