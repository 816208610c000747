// Duplicate detection against the stored corpus.
//
// Exact URL match first, then a fuzzy title scan over a bounded window of
// recent records. Store failures degrade to "not a duplicate"; the
// store-layer conflict on insert is the backstop.

use strsim::normalized_levenshtein;
use tracing::warn;

use fraudscout_store::CaseStore;

/// Max stored records scanned in the fuzzy-title pass.
const FUZZY_WINDOW: u32 = 100;

/// Similarity strictly above this counts as a duplicate.
const TITLE_SIMILARITY_THRESHOLD: f64 = 0.85;

pub struct DedupIndex<'a> {
    store: &'a dyn CaseStore,
}

impl<'a> DedupIndex<'a> {
    pub fn new(store: &'a dyn CaseStore) -> Self {
        Self { store }
    }

    /// Returns the reason when the candidate duplicates a stored record.
    pub async fn is_duplicate(&self, url: &str, title: Option<&str>) -> Option<String> {
        match self.store.source_exists(url).await {
            Ok(true) => return Some("URL exact match".to_string()),
            Ok(false) => {}
            Err(e) => {
                warn!(url, error = %e, "Duplicate URL check failed, proceeding");
                return None;
            }
        }

        let title = title?.trim();
        if title.is_empty() {
            return None;
        }

        let recent = match self.store.recent_events(FUZZY_WINDOW).await {
            Ok(events) => events,
            Err(e) => {
                warn!(url, error = %e, "Fuzzy title scan failed, proceeding");
                return None;
            }
        };

        for existing in &recent {
            let similarity = title_similarity(title, existing);
            if similarity > TITLE_SIMILARITY_THRESHOLD {
                return Some(format!("title similarity {similarity:.2} with \"{existing}\""));
            }
        }

        None
    }
}

/// Case-insensitive normalized similarity of two titles.
pub(crate) fn title_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.trim().to_lowercase(), &b.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fraudscout_common::CaseRecord;
    use fraudscout_store::MemoryStore;

    fn record(url: &str, event: &str) -> CaseRecord {
        CaseRecord {
            time: "2026-01-15".to_string(),
            region: "unknown".to_string(),
            characters: "unknown".to_string(),
            event: event.to_string(),
            process: "process".to_string(),
            result: "unknown".to_string(),
            source_url: url.to_string(),
            created_at: Utc::now(),
            line_of_business: None,
            fraud_type: None,
            modus_operandi: None,
            red_flags: None,
            investigative_tips: None,
            underwriting_advice: None,
            is_seed_case: false,
            last_shown_at: None,
        }
    }

    #[tokio::test]
    async fn exact_url_match_is_a_duplicate() {
        let store = MemoryStore::new();
        store
            .insert(&record("https://example.gov/case1", "health insurance fraud"))
            .await
            .unwrap();

        let reason = DedupIndex::new(&store)
            .is_duplicate("https://example.gov/case1", None)
            .await;

        assert_eq!(reason.as_deref(), Some("URL exact match"));
    }

    #[tokio::test]
    async fn fresh_url_and_title_pass() {
        let store = MemoryStore::new();
        store
            .insert(&record("https://example.gov/case1", "health insurance fraud"))
            .await
            .unwrap();

        let reason = DedupIndex::new(&store)
            .is_duplicate("https://example.org/other", Some("unrelated embezzlement verdict"))
            .await;

        assert!(reason.is_none());
    }

    #[tokio::test]
    async fn similarity_at_threshold_is_not_a_duplicate() {
        // 20 chars, 3 substitutions: similarity exactly 0.85. The threshold
        // is strictly greater-than, so this must pass.
        let stored_title = "insurance fraud ring";
        let candidate = "insurance fraud rxyz";
        assert!((title_similarity(candidate, stored_title) - 0.85).abs() < 1e-9);

        let store = MemoryStore::new();
        store
            .insert(&record("https://example.gov/case1", stored_title))
            .await
            .unwrap();

        let reason = DedupIndex::new(&store)
            .is_duplicate("https://example.org/other", Some(candidate))
            .await;

        assert!(reason.is_none());
    }

    #[tokio::test]
    async fn similarity_above_threshold_is_a_duplicate() {
        // 20 chars, 2 substitutions: similarity 0.90.
        let stored_title = "insurance fraud ring";
        let candidate = "insurance fraud rixy";
        assert!((title_similarity(candidate, stored_title) - 0.90).abs() < 1e-9);

        let store = MemoryStore::new();
        store
            .insert(&record("https://example.gov/case1", stored_title))
            .await
            .unwrap();

        let reason = DedupIndex::new(&store)
            .is_duplicate("https://example.org/other", Some(candidate))
            .await;

        let reason = reason.expect("0.90 similarity should be flagged");
        assert!(reason.contains("0.90"));
    }

    #[tokio::test]
    async fn comparison_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .insert(&record("https://example.gov/case1", "Health Insurance Fraud"))
            .await
            .unwrap();

        let reason = DedupIndex::new(&store)
            .is_duplicate("https://example.org/other", Some("HEALTH INSURANCE FRAUD"))
            .await;

        assert!(reason.is_some());
    }

    #[tokio::test]
    async fn missing_title_skips_the_fuzzy_pass() {
        let store = MemoryStore::new();
        store
            .insert(&record("https://example.gov/case1", "health insurance fraud"))
            .await
            .unwrap();

        let reason = DedupIndex::new(&store)
            .is_duplicate("https://example.org/other", None)
            .await;

        assert!(reason.is_none());
    }
}
