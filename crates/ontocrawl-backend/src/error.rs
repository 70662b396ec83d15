//! Backend error types

use std::time::Duration;
use thiserror::Error;

/// Result type alias for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Backend-specific error types
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Query cancelled")]
    Cancelled,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unexpected result shape: {0}")]
    UnexpectedResults(String),

    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<BackendError> for ontocrawl_core::Error {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Cancelled => Self::Cancelled,
            BackendError::Configuration(msg) => Self::Configuration(msg),
            other => Self::Query(other.to_string()),
        }
    }
}
