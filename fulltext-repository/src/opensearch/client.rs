//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client, one instance per node.

use std::sync::Arc;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesGetParts},
    BulkParts, DeleteByQueryParts, OpenSearch, SearchParts, UpdateByQueryParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::{ClientFactory, SearchEngineClient};
use fulltext_shared::ServiceEndpoint;

/// OpenSearch client bound to a single node.
///
/// # Example
///
/// ```ignore
/// let endpoint = ServiceEndpoint::parse("http://localhost:9200");
/// let client = OpenSearchClient::new(endpoint)?;
/// let body = client.get_index("idx_person").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    endpoint: ServiceEndpoint,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the given endpoint.
    ///
    /// No request is issued; an unreachable node only shows up on the first call.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError::ConfigurationError)` - If the endpoint URL is invalid
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self, SearchError> {
        let url = endpoint.url();
        let parsed_url = Url::parse(&url)
            .map_err(|e| SearchError::configuration(format!("Invalid endpoint {}: {}", url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some((user, password)) = endpoint.credentials() {
            builder = builder.auth(Credentials::Basic(user.to_string(), password.to_string()));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchError::configuration(e.to_string()))?;

        info!(url = %url, "Created OpenSearch client");

        Ok(Self {
            client: OpenSearch::new(transport),
            endpoint,
        })
    }

    fn transport_error(err: opensearch::Error) -> SearchError {
        SearchError::transport(err.status_code().map(|s| s.as_u16()), err.to_string())
    }

    /// Map a response to its JSON body, or to a `ResponseError` on a non-2xx status.
    async fn into_json(response: Response, operation: &str) -> Result<Value, SearchError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                operation = operation,
                status = %status,
                body = %error_body,
                "Search engine request failed"
            );
            return Err(SearchError::response(status.as_u16(), error_body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(format!("{} response: {}", operation, e)))
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    async fn create_index(&self, name: &str, body: &Value) -> Result<Value, SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(body.clone())
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "create_index").await
    }

    async fn drop_index(&self, name: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[name]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "drop_index").await
    }

    async fn clear_index(&self, name: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[name]))
            .refresh(true)
            .body(json!({
                "query": {
                    "match_all": {}
                }
            }))
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "clear_index").await
    }

    async fn get_index(&self, name: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .indices()
            .get(IndicesGetParts::Index(&[name]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "get_index").await
    }

    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<Value, SearchError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[index]))
            .body(query.clone())
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "delete_by_query").await
    }

    async fn update_by_query(&self, index: &str, query: &Value) -> Result<Value, SearchError> {
        let response = self
            .client
            .update_by_query(UpdateByQueryParts::Index(&[index]))
            .body(query.clone())
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "update_by_query").await
    }

    async fn search(&self, index: &str, query: &Value) -> Result<Value, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(query.clone())
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "search").await
    }

    async fn bulk(&self, lines: &[Value]) -> Result<Value, SearchError> {
        // The bulk API sends each body entry as its own ndjson line.
        let body: Vec<JsonBody<Value>> = lines.iter().cloned().map(JsonBody::from).collect();
        debug!(lines = body.len(), endpoint = %self.endpoint.address, "Sending bulk request");

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::into_json(response, "bulk").await
    }
}

/// Creates `OpenSearchClient`s.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSearchClientFactory;

impl ClientFactory for OpenSearchClientFactory {
    fn connect(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        Ok(Arc::new(OpenSearchClient::new(endpoint.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_endpoint() {
        let endpoint = ServiceEndpoint::parse("http://127.0.0.1:9200");
        let client = OpenSearchClient::new(endpoint.clone()).unwrap();
        assert_eq!(client.endpoint(), &endpoint);
    }

    #[test]
    fn test_new_with_credentials() {
        let endpoint =
            ServiceEndpoint::parse("https://search.local:9200").with_credentials("elastic", "pw");
        let client = OpenSearchClient::new(endpoint).unwrap();
        assert_eq!(client.endpoint().protocol, "https");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let endpoint = ServiceEndpoint::new("http", "bad host:9200");
        let result = OpenSearchClient::new(endpoint);
        assert!(matches!(result, Err(SearchError::ConfigurationError(_))));
    }

    #[test]
    fn test_factory_connects() {
        let factory = OpenSearchClientFactory;
        let client = factory
            .connect(&ServiceEndpoint::parse("localhost:9200"))
            .unwrap();
        assert_eq!(client.endpoint().address, "localhost:9200");
    }
}
