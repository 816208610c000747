use thiserror::Error;

pub type Result<T> = std::result::Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider signalled quota or rate exhaustion. Callers use this to
    /// decide failover instead of matching on error text themselves.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Empty completion from {0}")]
    EmptyCompletion(&'static str),
}

impl AiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AiError::RateLimited(_))
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Network(err.to_string())
    }
}
