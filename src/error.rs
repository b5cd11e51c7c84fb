use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid theme taxonomy: {0}")]
    Taxonomy(String),

    #[error("Sentiment inference failed: {0}")]
    Inference(String),

    #[error("Sentiment inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Failures of a single model call. The classifier absorbs these per batch.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Inference(_) | Error::Timeout(_) | Error::Network(_) | Error::ParseError(_)
        )
    }
}
