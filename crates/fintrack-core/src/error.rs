//! Error types for FinTrack

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dataset contract violation: {0}")]
    DatasetContract(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a narrative backend could not produce text
///
/// Every variant is recoverable: the report builder logs it and switches to
/// the rule-based narrator.
#[derive(Error, Debug)]
pub enum GenerationUnavailable {
    #[error("remote narrative disabled")]
    Disabled,

    #[error("no API key configured")]
    MissingCredential,

    #[error("API key is the placeholder value")]
    PlaceholderCredential,

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("prompt error: {0}")]
    Prompt(String),
}
