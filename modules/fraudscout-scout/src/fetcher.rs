// Content fetching with an ordered fallback chain.
//
// Firecrawl gives the cleanest rendering when its credential is configured.
// Jina Reader is the second choice, and a plain HTTP GET with tag stripping
// is the floor. Each stage gets one attempt; a failure falls through to the
// next stage.

use anyhow::{bail, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use firecrawl_client::FirecrawlClient;
use jina_client::JinaClient;

/// Minimum usable text length from the raw-HTTP fallback.
const MIN_TEXT_CHARS: usize = 500;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A fetched page plus which fetcher produced it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub text: String,
    pub fetched_via: &'static str,
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
    fn name(&self) -> &'static str;
}

// --- Firecrawl fetcher ---

pub struct FirecrawlFetcher {
    client: FirecrawlClient,
}

impl FirecrawlFetcher {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: FirecrawlClient::new(api_key),
        }
    }
}

#[async_trait]
impl ContentFetcher for FirecrawlFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let markdown = self.client.scrape(url).await?;
        if markdown.len() < MIN_TEXT_CHARS {
            warn!(url, chars = markdown.len(), "Firecrawl content shorter than expected");
        }
        Ok(FetchedPage {
            url: url.to_string(),
            text: markdown,
            fetched_via: "firecrawl",
        })
    }

    fn name(&self) -> &'static str {
        "firecrawl"
    }
}

// --- Jina Reader fetcher ---

pub struct JinaFetcher {
    client: JinaClient,
}

impl JinaFetcher {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: JinaClient::new(api_key),
        }
    }
}

#[async_trait]
impl ContentFetcher for JinaFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let text = self.client.read(url).await?;
        if text.trim().is_empty() {
            bail!("Jina Reader returned empty content for {url}");
        }
        Ok(FetchedPage {
            url: url.to_string(),
            text,
            fetched_via: "jina",
        })
    }

    fn name(&self) -> &'static str {
        "jina"
    }
}

// --- Raw HTTP fetcher ---

/// Plain GET with a browser user agent, then tag stripping. The floor of the
/// chain: works without any credential but yields the roughest text.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let resp = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await?;

        if !resp.status().is_success() {
            bail!("HTTP status {} for {url}", resp.status());
        }

        let html = resp.text().await?;
        let text = strip_tags(&html);

        if text.len() <= MIN_TEXT_CHARS {
            bail!("Extracted text too short ({} chars) for {url}", text.len());
        }

        Ok(FetchedPage {
            url: url.to_string(),
            text,
            fetched_via: "http",
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Remove script and style blocks, drop remaining tags, collapse whitespace.
pub(crate) fn strip_tags(html: &str) -> String {
    let script_re = Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex");
    let style_re = Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex");
    let tag_re = Regex::new(r"<[^>]+>").expect("valid regex");

    let without_scripts = script_re.replace_all(html, "");
    let without_styles = style_re.replace_all(&without_scripts, "");
    let text = tag_re.replace_all(&without_styles, " ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// --- Ordered fallback chain ---

pub struct FetchChain {
    fetchers: Vec<Box<dyn ContentFetcher>>,
}

impl FetchChain {
    /// Build the chain from available credentials. The raw HTTP fetcher is
    /// always the last resort.
    pub fn from_config(firecrawl_api_key: Option<&str>, jina_api_key: Option<&str>) -> Self {
        let mut fetchers: Vec<Box<dyn ContentFetcher>> = Vec::new();
        if let Some(key) = firecrawl_api_key {
            fetchers.push(Box::new(FirecrawlFetcher::new(key)));
        }
        if let Some(key) = jina_api_key {
            fetchers.push(Box::new(JinaFetcher::new(key)));
        }
        fetchers.push(Box::new(HttpFetcher::new()));
        Self { fetchers }
    }

    pub fn new(fetchers: Vec<Box<dyn ContentFetcher>>) -> Self {
        Self { fetchers }
    }
}

#[async_trait]
impl ContentFetcher for FetchChain {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        for fetcher in &self.fetchers {
            match fetcher.fetch(url).await {
                Ok(page) => {
                    info!(
                        url,
                        fetcher = fetcher.name(),
                        chars = page.text.len(),
                        "Fetched page"
                    );
                    return Ok(page);
                }
                Err(e) => {
                    warn!(url, fetcher = fetcher.name(), error = %e, "Fetch failed, falling through");
                }
            }
        }
        bail!("All fetchers failed for {url}")
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
