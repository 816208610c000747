// Query construction and hit filtering for the search pass.
//
// The goal is concrete enforcement stories about life, health, and accident
// insurance. Property and auto lines, and generic industry content, are
// filtered out before anything reaches the extractor.

use fraudscout_common::SearchHit;

/// Phrases that indicate a concrete case story rather than industry coverage.
pub const CASE_KEYWORDS: &[&str] = &[
    "charged with fraud",
    "convicted of fraud",
    "fraud case",
    "fraud scheme",
    "arrested for insurance fraud",
    "sentenced for insurance fraud",
];

/// Target lines of business.
pub const INSURANCE_LINES: &[&str] = &[
    "life insurance fraud",
    "health insurance fraud",
    "accident insurance fraud",
    "medical insurance fraud",
    "disability insurance fraud",
];

/// Markers for out-of-scope lines of business.
pub const EXCLUDED_LINES: &[&str] = &[
    "property insurance",
    "auto insurance fraud",
    "car insurance fraud",
    "vehicle insurance",
];

/// Markers for generic market/industry articles with no concrete case.
const GENERIC_MARKERS: &[&str] = &[
    "market report",
    "market size",
    "industry outlook",
    "forecast",
    "trends",
];

/// Phrases for the news-mode hotspot pass.
pub const HOTSPOT_QUERIES: &[&str] = &[
    "systemic insurance fraud",
    "massive insurance fraud scheme",
    "insurance fraud corruption",
    "widespread insurance fraud",
    "insurance fraud scandal",
];

/// Minimum relevance score for a news-mode hit to count as a hotspot.
pub const HOTSPOT_SCORE_FLOOR: f64 = 0.7;

/// The search API rejects queries longer than this.
const QUERY_CHAR_BUDGET: usize = 400;

/// Pre-shortened query used when the composed one exceeds the budget.
const FALLBACK_QUERY: &str = "life insurance fraud case OR health insurance fraud case \
    OR accident insurance fraud case -property -auto 2025 2026";

/// Compose the main search query: the leading case phrases OR-joined, the
/// leading insurance lines OR-joined, negative terms for excluded lines, and
/// a recency qualifier.
pub fn build_query() -> String {
    compose_query(&CASE_KEYWORDS[..3], &INSURANCE_LINES[..3])
}

fn compose_query(case_keywords: &[&str], insurance_lines: &[&str]) -> String {
    let case_clause = case_keywords.join(" OR ");
    let line_clause = insurance_lines.join(" OR ");
    let query =
        format!("{case_clause} {line_clause} -property insurance -auto insurance 2025 2026");

    if query.len() > QUERY_CHAR_BUDGET {
        FALLBACK_QUERY.to_string()
    } else {
        query
    }
}

/// Drop generic articles and excluded lines, require at least one case
/// phrase, and sort survivors by descending relevance.
pub fn filter_hits(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut kept: Vec<SearchHit> = hits
        .into_iter()
        .filter(|hit| {
            let haystack = format!("{} {}", hit.title, hit.content).to_lowercase();
            if GENERIC_MARKERS.iter().any(|m| haystack.contains(m)) {
                return false;
            }
            if EXCLUDED_LINES.iter().any(|m| haystack.contains(m)) {
                return false;
            }
            CASE_KEYWORDS.iter().any(|k| haystack.contains(k))
        })
        .collect();

    kept.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, content: &str, score: f64) -> SearchHit {
        SearchHit {
            url: "https://example.com/article".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            score,
            is_hotspot: false,
        }
    }

    #[test]
    fn composed_query_stays_within_budget() {
        let query = build_query();
        assert!(query.len() <= QUERY_CHAR_BUDGET);
        assert!(query.contains("charged with fraud"));
        assert!(query.contains("life insurance fraud"));
        assert!(query.contains("-property insurance"));
    }

    #[test]
    fn oversized_composition_falls_back_to_short_query() {
        let long: Vec<&str> = (0..40).map(|_| "a very long case indicating phrase").collect();
        let query = compose_query(&long, &INSURANCE_LINES[..3]);
        assert_eq!(query, FALLBACK_QUERY);
    }

    #[test]
    fn generic_market_content_is_dropped() {
        let hits = vec![hit(
            "Insurance fraud market report 2026",
            "convicted of fraud somewhere",
            0.9,
        )];
        assert!(filter_hits(hits).is_empty());
    }

    #[test]
    fn excluded_lines_are_dropped() {
        let hits = vec![hit(
            "Man convicted of fraud",
            "an auto insurance fraud ring was dismantled",
            0.9,
        )];
        assert!(filter_hits(hits).is_empty());
    }

    #[test]
    fn hits_without_case_phrases_are_dropped() {
        let hits = vec![hit(
            "Thoughts on health insurance pricing",
            "a general essay",
            0.9,
        )];
        assert!(filter_hits(hits).is_empty());
    }

    #[test]
    fn survivors_sort_by_descending_score() {
        let hits = vec![
            hit("A convicted of fraud", "health insurance fraud case", 0.4),
            hit("B charged with fraud", "life insurance fraud case", 0.8),
            hit("C fraud scheme", "accident insurance fraud case", 0.6),
        ];
        let kept = filter_hits(hits);
        let titles: Vec<_> = kept.iter().map(|h| h.title.chars().next().unwrap()).collect();
        assert_eq!(titles, vec!['B', 'C', 'A']);
    }
}
