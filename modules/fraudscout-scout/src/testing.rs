// Test mocks for the pipeline's trait seams: search, fetch, analyze.
// HashMap-backed and deterministic; no network, no database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use fraudscout_common::SearchHit;

use crate::fetcher::{ContentFetcher, FetchedPage};
use crate::gateway::TextAnalyst;
use crate::search::SearchProvider;

/// Canned model output with the six baseline keys.
pub fn sample_case_json(process: &str) -> String {
    serde_json::json!({
        "Time": "2026-01-15",
        "Region": "New York, USA",
        "Characters": "John Smith, ABC Insurance, XYZ Medical Center",
        "Event": "health insurance fraud",
        "Process": process,
        "Result": "convicted, 5 years, $500,000 fine",
    })
    .to_string()
}

/// A process narrative that passes the quality gate.
pub fn passing_narrative() -> String {
    let mut s = String::from(
        "[Risk Profile]\nPolicy incepted three months before the claim.\n\n\
         [Modus Operandi (MO)]\nThe method was staged hospital stays with forged receipts.\n\n\
         [Red Flags]\nInvestigators detected billing anomalies; the red flag was a \
         diagnosis/symptom mismatch backed by evidence from claims data.\n\n\
         [Verification Recommendations]\nClaims-database cross-checks and record evasion review.\n\n\
         [Underwriting Implications]\nEarly-claim alerts for new policies.\n",
    );
    while s.chars().count() < 650 {
        s.push_str("Further verification confirmed the falsified records. ");
    }
    s
}

// ---------------------------------------------------------------------------
// MockAnalyst
// ---------------------------------------------------------------------------

/// Analyst that returns one canned response and counts calls.
pub struct MockAnalyst {
    response: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl MockAnalyst {
    pub fn returning(response: String) -> Self {
        Self {
            response: Ok(response),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the call counter; survives moving the mock into a
    /// `Box<dyn TextAnalyst>`.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl TextAnalyst for MockAnalyst {
    async fn analyze(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Fetcher that serves registered URLs and fails everything else.
/// Builder pattern: `.on_page(url, text)`.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        match self.pages.get(url) {
            Some(text) => Ok(FetchedPage {
                url: url.to_string(),
                text: text.clone(),
                fetched_via: "mock",
            }),
            None => bail!("no page registered for {url}"),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Search provider with fixed results.
pub struct MockSearcher {
    hits: Vec<SearchHit>,
    hotspot_hits: Vec<SearchHit>,
}

impl MockSearcher {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            hotspot_hits: Vec::new(),
        }
    }

    pub fn with_hotspots(mut self, hits: Vec<SearchHit>) -> Self {
        self.hotspot_hits = hits;
        self
    }
}

#[async_trait]
impl SearchProvider for MockSearcher {
    async fn search(&self, _query: &str, _max_results: u32) -> Vec<SearchHit> {
        self.hits.clone()
    }

    async fn hotspots(&self) -> Vec<SearchHit> {
        self.hotspot_hits.clone()
    }
}

/// A search hit that survives the source filters.
pub fn case_hit(url: &str, title: &str) -> SearchHit {
    SearchHit {
        url: url.to_string(),
        title: title.to_string(),
        content: format!("{title}: the defendant was convicted of fraud"),
        score: 0.9,
        is_hotspot: false,
    }
}
