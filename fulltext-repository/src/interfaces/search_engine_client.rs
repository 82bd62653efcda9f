//! Search engine client trait definition.
//!
//! This module defines the request/response interface to a single search
//! engine node. The adapter owns a pool of these and decides which one
//! serves each call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use fulltext_shared::ServiceEndpoint;

/// Raw request/response operations against one search engine node.
///
/// Every method returns the parsed JSON body of a 2xx response. A request
/// that never reached the node maps to `SearchError::TransportError`; a
/// non-2xx response maps to `SearchError::ResponseError` carrying the body.
/// Interpreting the body is the adapter's job.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so the adapter can be shared
/// across concurrent callers.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// The node this client talks to.
    fn endpoint(&self) -> &ServiceEndpoint;

    /// `PUT /{name}` with the given settings/mappings body.
    async fn create_index(&self, name: &str, body: &Value) -> Result<Value, SearchError>;

    /// `DELETE /{name}`.
    async fn drop_index(&self, name: &str) -> Result<Value, SearchError>;

    /// `POST /{name}/_delete_by_query?refresh` with a match-all query.
    async fn clear_index(&self, name: &str) -> Result<Value, SearchError>;

    /// `GET /{name}`.
    async fn get_index(&self, name: &str) -> Result<Value, SearchError>;

    /// `POST /{index}/_delete_by_query`.
    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<Value, SearchError>;

    /// `POST /{index}/_update_by_query`.
    async fn update_by_query(&self, index: &str, query: &Value) -> Result<Value, SearchError>;

    /// `POST /{index}/_search`.
    async fn search(&self, index: &str, query: &Value) -> Result<Value, SearchError>;

    /// `POST /_bulk` with one JSON document per line.
    async fn bulk(&self, lines: &[Value]) -> Result<Value, SearchError>;
}

/// Builds a client for an endpoint.
///
/// The listener and the query side resolve endpoints from the catalog at
/// runtime, so client construction goes through this seam.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, endpoint: &ServiceEndpoint)
        -> Result<Arc<dyn SearchEngineClient>, SearchError>;
}
