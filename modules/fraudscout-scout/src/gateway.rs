// AI gateway with planned failover.
//
// The primary engine (Gemini) is tried over an ordered model list; the first
// non-empty response wins. A rate-limit error abandons the remaining models
// and hands the prompt to the backup engine (DeepSeek). Exhausting the
// primary list for other reasons also falls through to the backup. One pass
// per engine, no retries, no backoff.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use ai_client::{AiError, DeepSeekClient, GeminiClient};
use fraudscout_common::FraudScoutError;

/// Ordered primary models. Earlier entries are cheaper and usually available.
const GEMINI_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-1.5-pro", "gemini-flash-latest"];

const BACKUP_MODEL: &str = "deepseek-chat";
const BACKUP_SYSTEM_ROLE: &str = "You are a senior insurance anti-fraud analyst, \
    expert at extracting strictly structured information from long documents.";
const BACKUP_TEMPERATURE: f32 = 0.3;
const BACKUP_MAX_TOKENS: u32 = 2000;

/// Seam for the text-analysis engine. The extractor depends on this trait so
/// tests run without network calls.
#[async_trait]
pub trait TextAnalyst: Send + Sync {
    /// Send one prompt and return the engine's raw text response.
    async fn analyze(&self, prompt: &str) -> Result<String>;
}

/// One attempt against a named primary model.
#[async_trait]
pub trait PrimaryEngine: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> ai_client::Result<String>;
}

/// One request against the backup engine.
#[async_trait]
pub trait BackupEngine: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> ai_client::Result<String>;
}

#[async_trait]
impl PrimaryEngine for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> ai_client::Result<String> {
        GeminiClient::generate(self, model, prompt).await
    }
}

#[async_trait]
impl BackupEngine for DeepSeekClient {
    async fn complete(&self, system: &str, prompt: &str) -> ai_client::Result<String> {
        DeepSeekClient::complete(
            self,
            BACKUP_MODEL,
            system,
            prompt,
            BACKUP_TEMPERATURE,
            BACKUP_MAX_TOKENS,
        )
        .await
    }
}

pub struct AiGateway<P, B> {
    primary: P,
    backup: Option<B>,
}

impl AiGateway<GeminiClient, DeepSeekClient> {
    pub fn from_config(gemini_api_key: &str, deepseek_api_key: Option<&str>) -> Self {
        if deepseek_api_key.is_none() {
            warn!("DEEPSEEK_API_KEY not set, running without a backup engine");
        }
        Self {
            primary: GeminiClient::new(gemini_api_key),
            backup: deepseek_api_key.map(DeepSeekClient::new),
        }
    }
}

impl<P: PrimaryEngine, B: BackupEngine> AiGateway<P, B> {
    pub fn new(primary: P, backup: Option<B>) -> Self {
        Self { primary, backup }
    }

    async fn try_primary(&self, prompt: &str) -> ai_client::Result<String> {
        let mut last_err = None;
        for &model in GEMINI_MODELS {
            match self.primary.generate(model, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_rate_limited() => {
                    warn!(model, "Primary engine rate limited, switching to backup");
                    return Err(e);
                }
                Err(e) => {
                    warn!(model, error = %e, "Primary attempt failed, trying next model");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or(AiError::EmptyCompletion("gemini")))
    }
}

#[async_trait]
impl<P: PrimaryEngine, B: BackupEngine> TextAnalyst for AiGateway<P, B> {
    async fn analyze(&self, prompt: &str) -> Result<String> {
        match self.try_primary(prompt).await {
            Ok(text) => return Ok(text),
            Err(e) => info!(error = %e, "Primary engine exhausted, trying backup"),
        }

        let Some(ref backup) = self.backup else {
            return Err(FraudScoutError::BackupUnavailable.into());
        };

        info!("Backup engine taking over");
        Ok(backup.complete(BACKUP_SYSTEM_ROLE, prompt).await?)
    }
}
