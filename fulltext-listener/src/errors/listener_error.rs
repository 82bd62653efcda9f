//! Listener error types.
//!
//! `is_fatal` separates errors the bootstrap must abort on from batch
//! failures the delivery side simply retries.

use std::path::PathBuf;

use fulltext_repository::SearchError;
use thiserror::Error;

/// Errors that can occur while running the CDC listener.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Init could not resolve its context from the catalog.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `apply` was called before a successful `init`.
    #[error("Listener not ready: {0}")]
    NotReady(String),

    /// The listener already failed and refuses further work.
    #[error("Listener failed: {0}")]
    Fatal(String),

    /// The apply offset could not be written.
    #[error("Failed to write apply offset to {}: {source}", path.display())]
    OffsetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The batch did not reach the search engine.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl ListenerError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a not-ready error.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Create a fatal error.
    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    /// True when the process should stop instead of retrying the batch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Fatal(_) | Self::OffsetWrite { .. }
        )
    }
}

/// A schema catalog lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CatalogError(pub String);

impl CatalogError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fatal() {
        assert!(ListenerError::configuration("no vid length").is_fatal());
        assert!(ListenerError::fatal("failed").is_fatal());
        assert!(ListenerError::OffsetWrite {
            path: PathBuf::from("/tmp/offset"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        }
        .is_fatal());

        assert!(!ListenerError::not_ready("init first").is_fatal());
        assert!(!ListenerError::from(SearchError::transport(None, "refused")).is_fatal());
    }

    #[test]
    fn test_search_error_display() {
        let err = ListenerError::from(SearchError::response(500, "boom"));
        assert!(err.to_string().starts_with("Search error:"));
    }
}
