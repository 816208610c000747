use async_trait::async_trait;
use tracing::warn;

use fraudscout_common::SearchHit;
use tavily_client::{SearchDepth, TavilyClient};

use crate::sources::{HOTSPOT_QUERIES, HOTSPOT_SCORE_FLOOR};

/// Seam for the search stage.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// One deep-mode search. Returns an empty list on provider failure;
    /// callers cannot distinguish zero matches from a failed request.
    async fn search(&self, query: &str, max_results: u32) -> Vec<SearchHit>;

    /// News-mode pass over the hotspot phrases. High-relevance hits only.
    async fn hotspots(&self) -> Vec<SearchHit>;
}

pub struct TavilySearchProvider {
    client: TavilyClient,
}

impl TavilySearchProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: TavilyClient::new(api_key.to_string()),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearchProvider {
    async fn search(&self, query: &str, max_results: u32) -> Vec<SearchHit> {
        match self.client.search(query, SearchDepth::Advanced, max_results).await {
            Ok(results) => results
                .into_iter()
                .map(|r| SearchHit {
                    url: r.url,
                    title: r.title,
                    content: r.content,
                    score: r.score,
                    is_hotspot: false,
                })
                .collect(),
            Err(e) => {
                warn!(query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    async fn hotspots(&self) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        for &query in HOTSPOT_QUERIES {
            match self.client.search(query, SearchDepth::News, 5).await {
                Ok(results) => {
                    hits.extend(
                        results
                            .into_iter()
                            .filter(|r| r.score > HOTSPOT_SCORE_FLOOR)
                            .map(|r| SearchHit {
                                url: r.url,
                                title: r.title,
                                content: r.content,
                                score: r.score,
                                is_hotspot: true,
                            }),
                    );
                }
                Err(e) => {
                    warn!(query, error = %e, "Hotspot search failed");
                }
            }
        }
        hits
    }
}
