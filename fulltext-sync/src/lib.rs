//! # Full-text Sync
//!
//! Bootstrap for the graph full-text sync components.
//!
//! This crate reads the process configuration and wires the search adapter,
//! the rewriter settings and the CDC listener together. The binary exposes
//! index administration and text search on top of it.

pub mod config;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during bootstrap or a CLI command.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] fulltext_repository::SearchError),

    /// Listener error.
    #[error("Listener error: {0}")]
    ListenerError(#[from] fulltext_listener::ListenerError),

    /// Rewrite error.
    #[error("Rewrite error: {0}")]
    RewriteError(#[from] fulltext_rewriter::RewriteError),

    /// Output serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SyncError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
