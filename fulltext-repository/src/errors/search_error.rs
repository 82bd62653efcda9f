//! Search error types.
//!
//! This module defines the errors that can occur while talking to the
//! external search engine. Transport failures and application failures share
//! one type but stay distinguishable by variant.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The request never produced an HTTP response.
    #[error("Transport error ({}): {message}", display_code(.code))]
    TransportError { code: Option<u16>, message: String },

    /// The engine answered with a non-success status.
    #[error("Response error (status {status}): {body}")]
    ResponseError { status: u16, body: String },

    /// The engine answered 2xx but the body reports a failure.
    #[error("Engine error: {0}")]
    EngineError(String),

    /// Some actions of a bulk request were rejected.
    #[error("Bulk error: {failed} of {total} actions failed, first reason: {reason}")]
    BulkItemError {
        failed: usize,
        total: usize,
        reason: String,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No usable endpoint or an invalid endpoint description.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

fn display_code(code: &Option<u16>) -> String {
    code.map_or_else(|| "no status".to_string(), |c| c.to_string())
}

impl SearchError {
    /// Create a transport error.
    pub fn transport(code: Option<u16>, msg: impl Into<String>) -> Self {
        Self::TransportError {
            code,
            message: msg.into(),
        }
    }

    /// Create a response error.
    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self::ResponseError {
            status,
            body: body.into(),
        }
    }

    /// Create an engine error.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::EngineError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// True when the request failed below the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError { .. })
    }
}
