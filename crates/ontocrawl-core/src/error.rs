//! Error types for Ontocrawl Core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using Ontocrawl's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Ontocrawl error types
#[derive(Error, Debug)]
pub enum Error {
    /// Mutually exclusive, missing or malformed parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No format in the fallback list could parse a document
    #[error("Parse error: {0}")]
    Parse(LoadFailure),

    /// A backend query failed or timed out
    #[error("Query error: {0}")]
    Query(String),

    /// A query returned a result shape the caller cannot use
    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is governed by an [`ErrorPolicy`](crate::ErrorPolicy).
    ///
    /// Only document load failures may be ignored; everything else aborts.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// One format tried while loading a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatAttempt {
    pub format: String,
    pub message: String,
}

/// Why a document could not be loaded.
///
/// Either the bytes were never obtained (`fetch_error`), or every attempted
/// format rejected them (`attempts`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub locator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<FormatAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl LoadFailure {
    pub fn fetch(locator: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            attempts: Vec::new(),
            fetch_error: Some(error.into()),
        }
    }

    pub fn exhausted(locator: impl Into<String>, attempts: Vec<FormatAttempt>) -> Self {
        Self {
            locator: locator.into(),
            attempts,
            fetch_error: None,
        }
    }

    /// Names of the formats that were tried, in order
    pub fn attempted_formats(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.format.as_str()).collect()
    }
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(err) = &self.fetch_error {
            return write!(f, "could not fetch {}: {}", self.locator, err);
        }
        write!(
            f,
            "exhausted format list for {} (tried: {})",
            self.locator,
            self.attempted_formats().join(", ")
        )
    }
}

impl From<LoadFailure> for Error {
    fn from(failure: LoadFailure) -> Self {
        Self::Parse(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failure_display() {
        let failure = LoadFailure::exhausted(
            "http://example.org/onto",
            vec![
                FormatAttempt {
                    format: "rdfxml".to_string(),
                    message: "bad xml".to_string(),
                },
                FormatAttempt {
                    format: "turtle".to_string(),
                    message: "bad turtle".to_string(),
                },
            ],
        );
        let msg = failure.to_string();
        assert!(msg.contains("http://example.org/onto"));
        assert!(msg.contains("rdfxml, turtle"));

        let err = Error::from(failure);
        assert!(err.to_string().starts_with("Parse error"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_fetch_failure_display() {
        let failure = LoadFailure::fetch("file:///missing.owl", "not found");
        assert_eq!(
            failure.to_string(),
            "could not fetch file:///missing.owl: not found"
        );
        assert!(failure.attempted_formats().is_empty());
    }

    #[test]
    fn test_query_errors_are_not_recoverable() {
        assert!(!Error::Query("endpoint down".to_string()).is_recoverable());
        assert!(!Error::Configuration("bad".to_string()).is_recoverable());
        assert!(!Error::Cancelled.is_recoverable());
    }
}
