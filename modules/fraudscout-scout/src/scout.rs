// Run orchestration: search → fetch → extract → gate → dedup → store.
//
// URLs are processed one at a time in queue order. Harvested links re-enter
// at the front of the queue and do not recurse further. All failures are
// contained at the per-URL level; one bad URL never aborts the batch.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use fraudscout_common::{Config, RejectPolicy, SearchHit};
use fraudscout_store::{CaseStore, StoreError};

use crate::dedup::DedupIndex;
use crate::extractor::{CaseExtractor, PromptFormat};
use crate::fetcher::{ContentFetcher, FetchChain};
use crate::gateway::AiGateway;
use crate::harvester::LinkHarvester;
use crate::quality;
use crate::search::{SearchProvider, TavilySearchProvider};
use crate::sources;

/// Results requested from the main search pass.
const MAX_SEARCH_RESULTS: u32 = 15;

/// Stored URLs scanned when seeding the watch-domain set.
const WATCH_SEED_LIMIT: u32 = 1000;

/// Stats from one scout run. The printed summary is the pipeline's only
/// outward signal.
#[derive(Debug, Default)]
pub struct RunStats {
    pub candidates: u32,
    pub stored: u32,
    pub stored_flagged: u32,
    pub skipped_duplicate: u32,
    pub rejected: u32,
    pub failed: u32,
    pub harvested: u32,
    pub watch_domains: u32,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Scout Run Complete ===")?;
        writeln!(f, "Candidates queued:   {}", self.candidates)?;
        writeln!(f, "Cases stored:        {}", self.stored)?;
        writeln!(f, "  flagged low-quality: {}", self.stored_flagged)?;
        writeln!(f, "Duplicates skipped:  {}", self.skipped_duplicate)?;
        writeln!(f, "Rejected by gate:    {}", self.rejected)?;
        writeln!(f, "Failed:              {}", self.failed)?;
        writeln!(f, "Links harvested:     {}", self.harvested)?;
        write!(f, "Watch domains:       {}", self.watch_domains)
    }
}

/// Terminal state for one URL. No retry transitions; a failure at any stage
/// ends processing for that URL in this run.
#[derive(Debug)]
enum UrlOutcome {
    Stored,
    StoredFlagged,
    Rejected,
    SkippedDuplicate,
    Failed(&'static str),
}

struct QueueItem {
    url: String,
    title: String,
    /// Search snippet, kept as the degraded extraction input when the fetch
    /// chain fails. Harvested links have none.
    snippet: Option<String>,
    /// Primary hits harvest their page text for outbound links; harvested
    /// links do not recurse further.
    harvest: bool,
}

pub struct Scout {
    searcher: Box<dyn SearchProvider>,
    fetcher: Box<dyn ContentFetcher>,
    extractor: CaseExtractor,
    store: Arc<dyn CaseStore>,
    harvester: LinkHarvester,
    pacing: Duration,
    reject_policy: RejectPolicy,
}

impl Scout {
    pub fn new(config: &Config, store: Arc<dyn CaseStore>) -> Self {
        let gateway =
            AiGateway::from_config(&config.gemini_api_key, config.deepseek_api_key.as_deref());

        Self {
            searcher: Box::new(TavilySearchProvider::new(&config.tavily_api_key)),
            fetcher: Box::new(FetchChain::from_config(
                config.firecrawl_api_key.as_deref(),
                config.jina_api_key.as_deref(),
            )),
            extractor: CaseExtractor::new(Box::new(gateway), PromptFormat::Siu),
            store,
            harvester: LinkHarvester::new(),
            pacing: config.pacing,
            reject_policy: config.reject_policy,
        }
    }

    /// Assemble a scout from explicit parts. Lets tests swap in mocks.
    pub fn with_parts(
        searcher: Box<dyn SearchProvider>,
        fetcher: Box<dyn ContentFetcher>,
        extractor: CaseExtractor,
        store: Arc<dyn CaseStore>,
        pacing: Duration,
        reject_policy: RejectPolicy,
    ) -> Self {
        Self {
            searcher,
            fetcher,
            extractor,
            store,
            harvester: LinkHarvester::new(),
            pacing,
            reject_policy,
        }
    }

    /// One run to completion.
    pub async fn run(&mut self) -> Result<RunStats> {
        let mut stats = RunStats::default();

        // Warm-start the watch set from stored source URLs.
        match self.store.source_urls(WATCH_SEED_LIMIT).await {
            Ok(urls) => self.harvester.seed_from_urls(&urls),
            Err(e) => warn!(error = %e, "Watch-domain seeding failed, starting empty"),
        }

        // Hotspot pass first, then the main advanced search.
        let mut queue: VecDeque<QueueItem> = VecDeque::new();
        for hit in self.searcher.hotspots().await {
            queue.push_back(queue_item(hit, true));
        }

        let query = sources::build_query();
        let hits = sources::filter_hits(self.searcher.search(&query, MAX_SEARCH_RESULTS).await);
        for hit in hits {
            queue.push_back(queue_item(hit, true));
        }

        stats.candidates = queue.len() as u32;
        if queue.is_empty() {
            info!("No candidates found, nothing to do");
            return Ok(stats);
        }

        info!(candidates = stats.candidates, "Processing candidates");

        let mut first = true;
        while let Some(item) = queue.pop_front() {
            // Inter-item delay honors the primary engine's per-minute limit.
            if !first && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            first = false;

            let (outcome, links) = self.process_item(&item).await;
            tally(&outcome, &mut stats);

            // Re-inject harvested links at the front, in discovery order.
            for link in links.into_iter().rev() {
                stats.harvested += 1;
                let title = link.rsplit('/').next().unwrap_or_default().to_string();
                queue.push_front(QueueItem {
                    url: link,
                    title,
                    snippet: None,
                    harvest: false,
                });
            }
        }

        stats.watch_domains = self.harvester.watched_domains().len() as u32;
        Ok(stats)
    }

    /// Dedup → fetch → extract → gate → store for one URL, then harvest the
    /// same text for outbound links when the item allows it.
    async fn process_item(&mut self, item: &QueueItem) -> (UrlOutcome, Vec<String>) {
        let url = item.url.as_str();

        if let Some(reason) = DedupIndex::new(self.store.as_ref())
            .is_duplicate(url, Some(&item.title))
            .await
        {
            info!(url, reason = reason.as_str(), "Skipping duplicate");
            return (UrlOutcome::SkippedDuplicate, Vec::new());
        }

        let text = match self.fetcher.fetch(url).await {
            Ok(page) => page.text,
            Err(e) => match item.snippet.as_deref() {
                Some(snippet) if !snippet.is_empty() => {
                    warn!(url, error = %e, "Fetch failed, degrading to the search snippet");
                    snippet.to_string()
                }
                _ => {
                    warn!(url, error = %e, "Fetch failed");
                    return (UrlOutcome::Failed("fetch"), Vec::new());
                }
            },
        };

        let mut record = match self.extractor.extract(url, &item.title, &text).await {
            Ok(record) => record,
            Err(e) => {
                warn!(url, error = %e, "Extraction failed");
                return (UrlOutcome::Failed("extract"), Vec::new());
            }
        };

        let validation = quality::validate(&record);
        let flagged = if validation.is_valid {
            false
        } else {
            for issue in &validation.issues {
                info!(url, issue = issue.as_str(), "Quality issue");
            }
            match self.reject_policy {
                RejectPolicy::Discard => {
                    info!(
                        url,
                        score = validation.overall_score,
                        "Record rejected by quality gate"
                    );
                    return (UrlOutcome::Rejected, Vec::new());
                }
                RejectPolicy::StoreFlagged => {
                    record
                        .process
                        .push_str(&format!("\n\n[quality score: {:.2}]", validation.overall_score));
                    true
                }
            }
        };

        match self.store.insert(&record).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                info!(url, "Store-layer conflict, counting as duplicate");
                return (UrlOutcome::SkippedDuplicate, Vec::new());
            }
            Err(e) => {
                warn!(url, error = %e, "Insert failed");
                return (UrlOutcome::Failed("store"), Vec::new());
            }
        }

        info!(url, event = record.event.as_str(), flagged, "Case stored");

        let links = if item.harvest {
            self.harvester.harvest(&text, url)
        } else {
            Vec::new()
        };

        let outcome = if flagged {
            UrlOutcome::StoredFlagged
        } else {
            UrlOutcome::Stored
        };
        (outcome, links)
    }
}

fn queue_item(hit: SearchHit, harvest: bool) -> QueueItem {
    QueueItem {
        title: hit.title,
        snippet: Some(hit.content).filter(|c| !c.is_empty()),
        url: hit.url,
        harvest,
    }
}

fn tally(outcome: &UrlOutcome, stats: &mut RunStats) {
    match outcome {
        UrlOutcome::Stored => stats.stored += 1,
        UrlOutcome::StoredFlagged => {
            stats.stored += 1;
            stats.stored_flagged += 1;
        }
        UrlOutcome::Rejected => stats.rejected += 1,
        UrlOutcome::SkippedDuplicate => stats.skipped_duplicate += 1,
        UrlOutcome::Failed(_) => stats.failed += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudscout_store::MemoryStore;

    use crate::testing::{case_hit, passing_narrative, sample_case_json, MockAnalyst, MockFetcher, MockSearcher};

    const CASE_URL: &str = "https://example.gov/case1";
    const CASE_TITLE: &str = "Man convicted of health insurance fraud";

    fn scout_with(
        searcher: MockSearcher,
        fetcher: MockFetcher,
        analyst: MockAnalyst,
        store: Arc<MemoryStore>,
        reject_policy: RejectPolicy,
    ) -> Scout {
        Scout::with_parts(
            Box::new(searcher),
            Box::new(fetcher),
            CaseExtractor::new(Box::new(analyst), PromptFormat::Siu),
            store,
            Duration::ZERO,
            reject_policy,
        )
    }

    fn page_text() -> String {
        "Full article text about the conviction. ".repeat(30)
    }

    #[tokio::test]
    async fn end_to_end_fresh_hit_is_stored() {
        let store = Arc::new(MemoryStore::new());
        let mut scout = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new().on_page(CASE_URL, &page_text()),
            MockAnalyst::returning(sample_case_json(&passing_narrative())),
            store.clone(),
            RejectPolicy::Discard,
        );

        let stats = scout.run().await.unwrap();

        assert_eq!(stats.candidates, 1);
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.failed, 0);
        let records = store.records();
        assert_eq!(records[0].source_url, CASE_URL);
        assert_eq!(records[0].event, "health insurance fraud");
    }

    #[tokio::test]
    async fn resubmitting_the_same_url_is_a_duplicate_skip() {
        let store = Arc::new(MemoryStore::new());

        let mut first_run = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new().on_page(CASE_URL, &page_text()),
            MockAnalyst::returning(sample_case_json(&passing_narrative())),
            store.clone(),
            RejectPolicy::Discard,
        );
        first_run.run().await.unwrap();
        assert_eq!(store.len(), 1);

        let mut second_run = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new().on_page(CASE_URL, &page_text()),
            MockAnalyst::returning(sample_case_json(&passing_narrative())),
            store.clone(),
            RejectPolicy::Discard,
        );
        let stats = second_run.run().await.unwrap();

        assert_eq!(stats.skipped_duplicate, 1);
        assert_eq!(stats.stored, 0);
        assert_eq!(store.len(), 1, "a resubmitted URL must never store twice");
    }

    #[tokio::test]
    async fn every_stored_record_has_all_baseline_fields() {
        let store = Arc::new(MemoryStore::new());
        // Model output missing most keys; the extractor backfills sentinels
        // and the StoreFlagged policy persists the low-quality record.
        let mut scout = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new().on_page(CASE_URL, &page_text()),
            MockAnalyst::returning(r#"{"Event": "health insurance fraud"}"#.to_string()),
            store.clone(),
            RejectPolicy::StoreFlagged,
        );

        let stats = scout.run().await.unwrap();
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.stored_flagged, 1);

        for record in store.records() {
            for (name, value) in record.baseline_fields() {
                assert!(!value.trim().is_empty(), "field {name} must be populated");
            }
        }
    }

    #[tokio::test]
    async fn discard_policy_drops_gate_rejections() {
        let store = Arc::new(MemoryStore::new());
        let mut scout = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new().on_page(CASE_URL, &page_text()),
            MockAnalyst::returning(sample_case_json("a bare account with no depth")),
            store.clone(),
            RejectPolicy::Discard,
        );

        let stats = scout.run().await.unwrap();

        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.stored, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_flagged_policy_annotates_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut scout = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new().on_page(CASE_URL, &page_text()),
            MockAnalyst::returning(sample_case_json("a bare account with no depth")),
            store.clone(),
            RejectPolicy::StoreFlagged,
        );

        let stats = scout.run().await.unwrap();

        assert_eq!(stats.stored, 1);
        assert_eq!(stats.stored_flagged, 1);
        assert!(store.records()[0].process.contains("[quality score:"));
    }

    #[tokio::test]
    async fn harvested_links_run_through_the_same_pipeline() {
        let store = Arc::new(MemoryStore::new());
        let page = format!(
            "{} Sources: https://justice.gov/press/case-a and https://fraud-watch.org/case-b",
            page_text()
        );
        let mut scout = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new()
                .on_page(CASE_URL, &page)
                .on_page("https://justice.gov/press/case-a", &page_text())
                .on_page("https://fraud-watch.org/case-b", &page_text()),
            MockAnalyst::returning(sample_case_json(&passing_narrative())),
            store.clone(),
            RejectPolicy::Discard,
        );

        let stats = scout.run().await.unwrap();

        assert_eq!(stats.harvested, 2);
        assert_eq!(stats.stored, 3);
        assert_eq!(store.len(), 3);
        assert_eq!(stats.watch_domains, 2);
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_the_search_snippet() {
        let store = Arc::new(MemoryStore::new());
        // No page registered: the fetch fails and the hit's snippet feeds
        // the extractor instead.
        let mut scout = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]),
            MockFetcher::new(),
            MockAnalyst::returning(sample_case_json(&passing_narrative())),
            store.clone(),
            RejectPolicy::Discard,
        );

        let stats = scout.run().await.unwrap();

        assert_eq!(stats.stored, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn extraction_failure_is_contained_to_its_url() {
        let store = Arc::new(MemoryStore::new());
        let other_url = "https://example.org/case2";
        let mut scout = scout_with(
            MockSearcher::new(vec![
                case_hit(CASE_URL, CASE_TITLE),
                case_hit(other_url, "Agent charged with fraud over fake policies"),
            ]),
            MockFetcher::new()
                .on_page(CASE_URL, &page_text())
                .on_page(other_url, &page_text()),
            MockAnalyst::returning("not json at all".to_string()),
            store.clone(),
            RejectPolicy::Discard,
        );

        let stats = scout.run().await.unwrap();

        // Both fail to extract, neither aborts the run.
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.candidates, 2);
    }

    #[tokio::test]
    async fn empty_search_results_end_the_run_quietly() {
        let store = Arc::new(MemoryStore::new());
        let mut scout = scout_with(
            MockSearcher::new(Vec::new()),
            MockFetcher::new(),
            MockAnalyst::returning(sample_case_json(&passing_narrative())),
            store.clone(),
            RejectPolicy::Discard,
        );

        let stats = scout.run().await.unwrap();

        assert_eq!(stats.candidates, 0);
        assert_eq!(stats.stored, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn hotspot_hits_queue_ahead_of_search_hits() {
        let store = Arc::new(MemoryStore::new());
        let hotspot_url = "https://example.org/hotspot";
        let mut hotspot = case_hit(hotspot_url, "Massive insurance fraud scheme exposed");
        hotspot.is_hotspot = true;

        let mut scout = scout_with(
            MockSearcher::new(vec![case_hit(CASE_URL, CASE_TITLE)]).with_hotspots(vec![hotspot]),
            MockFetcher::new()
                .on_page(CASE_URL, &page_text())
                .on_page(hotspot_url, &page_text()),
            MockAnalyst::returning(sample_case_json(&passing_narrative())),
            store.clone(),
            RejectPolicy::Discard,
        );

        let stats = scout.run().await.unwrap();

        assert_eq!(stats.candidates, 2);
        assert_eq!(store.records()[0].source_url, hotspot_url);
    }
}
