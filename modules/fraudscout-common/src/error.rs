use thiserror::Error;

#[derive(Error, Debug)]
pub enum FraudScoutError {
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Backup engine unavailable (missing credential)")]
    BackupUnavailable,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
