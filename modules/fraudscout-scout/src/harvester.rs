// Recursive link harvesting.
//
// Source text is scanned for outbound links on allow-listed host suffixes.
// Newly seen domains join the watch set; output is capped per document to
// bound recursive fan-out. The watch set is owned here, seeded from the
// store at run start, and never persisted on its own.

use std::collections::HashSet;

use regex::Regex;
use tracing::info;
use url::Url;

/// Host suffixes eligible for recursive monitoring.
pub const DEFAULT_WATCH_SUFFIXES: &[&str] = &[".org", ".gov"];

/// Max links harvested from one source document.
const MAX_LINKS_PER_DOCUMENT: usize = 5;

const URL_PATTERN: &str = r#"https?://[^\s<>"{}|\\^`\[\]]+"#;

pub struct LinkHarvester {
    suffixes: Vec<String>,
    watched: HashSet<String>,
    url_re: Regex,
}

impl LinkHarvester {
    pub fn new() -> Self {
        Self::with_suffixes(DEFAULT_WATCH_SUFFIXES)
    }

    pub fn with_suffixes(suffixes: &[&str]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
            watched: HashSet::new(),
            url_re: Regex::new(URL_PATTERN).expect("valid regex"),
        }
    }

    /// Warm-start the watch set from already-stored source URLs.
    pub fn seed_from_urls(&mut self, urls: &[String]) {
        for url in urls {
            if let Some(domain) = self.eligible_domain(url) {
                self.watched.insert(domain);
            }
        }
        info!(domains = self.watched.len(), "Watch-domain set seeded");
    }

    /// Scan text for outbound links on allow-listed domains. Idempotently
    /// records each domain; returns at most the per-document cap of links.
    pub fn harvest(&mut self, text: &str, base_url: &str) -> Vec<String> {
        let mut links = Vec::new();
        let mut seen = HashSet::new();

        for m in self.url_re.find_iter(text) {
            let candidate = m.as_str();
            if candidate == base_url {
                continue;
            }
            let Some(domain) = self.eligible_domain(candidate) else {
                continue;
            };
            if !seen.insert(candidate.to_string()) {
                continue;
            }

            if self.watched.insert(domain.clone()) {
                info!(domain, "New watch domain discovered");
            }

            links.push(candidate.to_string());
            if links.len() >= MAX_LINKS_PER_DOCUMENT {
                break;
            }
        }

        links
    }

    pub fn watched_domains(&self) -> &HashSet<String> {
        &self.watched
    }

    /// The host of `url`, lowercased, when it matches an allow-listed suffix.
    fn eligible_domain(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        self.suffixes
            .iter()
            .any(|s| host.ends_with(s.as_str()))
            .then_some(host)
    }
}

impl Default for LinkHarvester {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://news.example.com/story";

    #[test]
    fn harvest_keeps_only_allowlisted_suffixes() {
        let mut harvester = LinkHarvester::new();
        let text = "see https://fraud-watch.org/report and https://cdn.example.com/img.png \
                    plus https://justice.gov/press/release";

        let links = harvester.harvest(text, BASE);

        assert_eq!(
            links,
            vec![
                "https://fraud-watch.org/report",
                "https://justice.gov/press/release"
            ]
        );
    }

    #[test]
    fn fan_out_is_capped_at_five() {
        let mut harvester = LinkHarvester::new();
        let text: String = (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    format!("https://agency{i}.gov/case{i} ")
                } else {
                    format!("https://group{i}.org/case{i} ")
                }
            })
            .collect();

        let links = harvester.harvest(&text, BASE);

        assert_eq!(links.len(), 5);
    }

    #[test]
    fn watch_domains_accumulate_idempotently() {
        let mut harvester = LinkHarvester::new();
        harvester.harvest("https://fraud-watch.org/a https://fraud-watch.org/b", BASE);
        harvester.harvest("https://fraud-watch.org/c", BASE);

        assert_eq!(harvester.watched_domains().len(), 1);
        assert!(harvester.watched_domains().contains("fraud-watch.org"));
    }

    #[test]
    fn duplicate_urls_in_one_document_count_once() {
        let mut harvester = LinkHarvester::new();
        let links = harvester.harvest(
            "https://justice.gov/a https://justice.gov/a https://justice.gov/a",
            BASE,
        );

        assert_eq!(links.len(), 1);
    }

    #[test]
    fn the_source_document_itself_is_not_requeued() {
        let mut harvester = LinkHarvester::new();
        let base = "https://justice.gov/press/release";
        let links = harvester.harvest("cited at https://justice.gov/press/release", base);

        assert!(links.is_empty());
    }

    #[test]
    fn seeding_extracts_domains_from_stored_urls() {
        let mut harvester = LinkHarvester::new();
        harvester.seed_from_urls(&[
            "https://justice.gov/press/1".to_string(),
            "https://news.example.com/2".to_string(),
            "https://fraud-watch.org/3".to_string(),
        ]);

        assert_eq!(harvester.watched_domains().len(), 2);
    }

    #[test]
    fn suffix_list_is_extensible() {
        let mut harvester = LinkHarvester::with_suffixes(&[".org", ".gov", ".edu"]);
        let links = harvester.harvest("https://university.edu/fraud-study", BASE);

        assert_eq!(links.len(), 1);
        assert!(harvester.watched_domains().contains("university.edu"));
    }
}
