use std::env;
use std::time::Duration;

/// What the run loop does with a record the quality gate rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectPolicy {
    /// Drop the record.
    Discard,
    /// Persist it anyway with a quality annotation appended to `process`.
    StoreFlagged,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Search
    pub tavily_api_key: String,

    // AI engines (Gemini primary, DeepSeek backup)
    pub gemini_api_key: String,
    pub deepseek_api_key: Option<String>,

    // Content fetching
    pub firecrawl_api_key: Option<String>,
    pub jina_api_key: Option<String>,

    // Case store
    pub supabase_url: String,
    pub supabase_key: String,

    /// Delay between successive extraction calls. Respects the primary
    /// engine's per-minute request limit; not a correctness requirement.
    pub pacing: Duration,
    pub reject_policy: RejectPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if a mandatory credential is missing.
    pub fn from_env() -> Self {
        Self {
            tavily_api_key: required_env("TAVILY_API_KEY"),
            gemini_api_key: required_env("GEMINI_API_KEY"),
            deepseek_api_key: optional_env("DEEPSEEK_API_KEY"),
            firecrawl_api_key: optional_env("FIRECRAWL_API_KEY"),
            jina_api_key: optional_env("JINA_API_KEY"),
            supabase_url: required_env("SUPABASE_URL"),
            supabase_key: required_env("SUPABASE_KEY"),
            pacing: Duration::from_secs(
                env::var("PACING_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            ),
            reject_policy: match env::var("ON_REJECT").as_deref() {
                Ok("discard") => RejectPolicy::Discard,
                _ => RejectPolicy::StoreFlagged,
            },
        }
    }

    /// Log which optional integrations are active, without leaking keys.
    pub fn log_redacted(&self) {
        tracing::info!(
            deepseek = self.deepseek_api_key.is_some(),
            firecrawl = self.firecrawl_api_key.is_some(),
            jina = self.jina_api_key.is_some(),
            pacing_secs = self.pacing.as_secs(),
            reject_policy = ?self.reject_policy,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
