//! Error types for the scrape pipeline and remote gateway

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VimError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote fault: {0}")]
    Fault(String),

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("counter {0} not present in catalog")]
    CounterNotFound(i32),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("config document error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
}
