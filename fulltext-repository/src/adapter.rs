//! Search adapter.
//!
//! Holds the pool of engine nodes and turns raw engine responses into
//! typed outcomes. Every operation picks one node uniformly at random; there
//! is no affinity and no health tracking.

use std::sync::{Arc, PoisonError, RwLock};

use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::bulk::BulkRequest;
use crate::config::AdapterConfig;
use crate::errors::SearchError;
use crate::interfaces::{ClientFactory, SearchEngineClient};
use crate::opensearch::index_config::get_index_settings;
use crate::opensearch::queries::build_pattern_query;
use fulltext_shared::{QueryResult, QueryResultItem, ServiceClient, ServiceEndpoint, TextSearchKind};

type ClientPool = Arc<Vec<Arc<dyn SearchEngineClient>>>;

const INDEX_NOT_FOUND: &str = "index_not_found_exception";

/// Client-side entry point to the external search engine.
///
/// Safe to share between tasks. The pool is read on every call and only
/// ever replaced as a whole.
pub struct SearchAdapter {
    clients: RwLock<ClientPool>,
    config: AdapterConfig,
}

impl SearchAdapter {
    /// Create an adapter over the given clients with the default config.
    pub fn new(clients: Vec<Arc<dyn SearchEngineClient>>) -> Self {
        Self::with_config(clients, AdapterConfig::default())
    }

    /// Create an adapter with a custom config.
    pub fn with_config(clients: Vec<Arc<dyn SearchEngineClient>>, config: AdapterConfig) -> Self {
        Self {
            clients: RwLock::new(Arc::new(clients)),
            config,
        }
    }

    /// Connect to every endpoint through `factory`.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchAdapter)` - One client per endpoint
    /// * `Err(SearchError::ConfigurationError)` - If `endpoints` is empty or an endpoint is invalid
    pub fn from_endpoints(
        endpoints: &[ServiceEndpoint],
        factory: &dyn ClientFactory,
        config: AdapterConfig,
    ) -> Result<Self, SearchError> {
        let clients = connect_all(endpoints, factory)?;
        Ok(Self::with_config(clients, config))
    }

    /// Build an adapter from catalog service records.
    pub fn from_service_clients(
        records: &[ServiceClient],
        factory: &dyn ClientFactory,
        config: AdapterConfig,
    ) -> Result<Self, SearchError> {
        let endpoints: Vec<ServiceEndpoint> = records.iter().map(ServiceEndpoint::from).collect();
        Self::from_endpoints(&endpoints, factory, config)
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Replace the whole pool.
    pub fn set_clients(&self, clients: Vec<Arc<dyn SearchEngineClient>>) {
        let pool = Arc::new(clients);
        *self.clients.write().unwrap_or_else(PoisonError::into_inner) = pool;
    }

    /// Reconnect to a new endpoint list and replace the pool.
    ///
    /// The old pool stays in place if any endpoint fails to connect.
    pub fn set_endpoints(
        &self,
        endpoints: &[ServiceEndpoint],
        factory: &dyn ClientFactory,
    ) -> Result<(), SearchError> {
        let clients = connect_all(endpoints, factory)?;
        info!(count = clients.len(), "Replacing search endpoints");
        self.set_clients(clients);
        Ok(())
    }

    /// Endpoints of the current pool.
    pub fn endpoints(&self) -> Vec<ServiceEndpoint> {
        self.pool().iter().map(|c| c.endpoint().clone()).collect()
    }

    fn pool(&self) -> ClientPool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn random_client(&self) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        let pool = self.pool();
        let client = pool
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| SearchError::configuration("no text search client found"))?;
        Ok(client.clone())
    }

    /// Create `name` with the document mapping.
    #[instrument(skip(self))]
    pub async fn create_index(&self, name: &str) -> Result<(), SearchError> {
        let client = self.random_client()?;
        let body = client.create_index(name, &get_index_settings()).await?;
        check_acknowledged(&body, "create_index")?;
        info!(index = %name, "Created index");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn drop_index(&self, name: &str) -> Result<(), SearchError> {
        let client = self.random_client()?;
        let body = client.drop_index(name).await?;
        check_acknowledged(&body, "drop_index")?;
        info!(index = %name, "Dropped index");
        Ok(())
    }

    /// Delete every document of `name`, keeping the index.
    #[instrument(skip(self))]
    pub async fn clear_index(&self, name: &str) -> Result<(), SearchError> {
        let client = self.random_client()?;
        let body = client.clear_index(name).await?;
        if body.get("deleted").is_none() {
            return Err(engine_error(&body, "clear_index"));
        }
        info!(index = %name, deleted = %body["deleted"], "Cleared index");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn index_exists(&self, name: &str) -> Result<bool, SearchError> {
        let client = self.random_client()?;
        match client.get_index(name).await {
            Ok(body) if body.get(name).is_some() => Ok(true),
            Ok(body) if is_index_not_found(&body) => Ok(false),
            Ok(body) => Err(engine_error(&body, "index_exists")),
            Err(SearchError::ResponseError { status: 404, .. }) => Ok(false),
            Err(SearchError::ResponseError { body, .. })
                if body.contains(INDEX_NOT_FOUND) =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the number of deleted documents.
    pub async fn delete_by_query(&self, index: &str, query: &Value) -> Result<u64, SearchError> {
        let client = self.random_client()?;
        let body = client.delete_by_query(index, query).await?;
        body.get("deleted")
            .and_then(Value::as_u64)
            .ok_or_else(|| engine_error(&body, "delete_by_query"))
    }

    /// Returns the number of updated documents.
    pub async fn update_by_query(&self, index: &str, query: &Value) -> Result<u64, SearchError> {
        let client = self.random_client()?;
        let body = client.update_by_query(index, query).await?;
        body.get("updated")
            .and_then(Value::as_u64)
            .ok_or_else(|| engine_error(&body, "update_by_query"))
    }

    /// Submit every action of `bulk`.
    ///
    /// An empty request is a no-op. A request larger than the configured
    /// batch size is sent as sequential chunks, each to its own random node;
    /// the first failing chunk fails the call.
    #[instrument(skip(self, bulk), fields(actions = bulk.len()))]
    pub async fn bulk(&self, bulk: &BulkRequest) -> Result<(), SearchError> {
        if bulk.is_empty() {
            debug!("Skipping empty bulk request");
            return Ok(());
        }

        match self.config.bulk_batch_size {
            Some(max) if bulk.len() > max => {
                for chunk in bulk.chunks(max) {
                    self.send_bulk(&chunk).await?;
                }
                Ok(())
            }
            _ => self.send_bulk(bulk).await,
        }
    }

    async fn send_bulk(&self, bulk: &BulkRequest) -> Result<(), SearchError> {
        let client = self.random_client()?;
        let body = client.bulk(&bulk.lines()).await?;
        check_bulk_response(&body, bulk.len())?;
        debug!(
            actions = bulk.len(),
            endpoint = %client.endpoint().address,
            "Bulk request applied"
        );
        Ok(())
    }

    pub async fn prefix(&self, index: &str, pattern: &str) -> Result<QueryResult, SearchError> {
        self.pattern_query(TextSearchKind::Prefix, index, pattern).await
    }

    pub async fn fuzzy(&self, index: &str, pattern: &str) -> Result<QueryResult, SearchError> {
        self.pattern_query(TextSearchKind::Fuzzy, index, pattern).await
    }

    pub async fn regexp(&self, index: &str, pattern: &str) -> Result<QueryResult, SearchError> {
        self.pattern_query(TextSearchKind::Regexp, index, pattern).await
    }

    pub async fn wildcard(&self, index: &str, pattern: &str) -> Result<QueryResult, SearchError> {
        self.pattern_query(TextSearchKind::Wildcard, index, pattern).await
    }

    /// Run a pattern query of the given kind.
    pub async fn pattern_query(
        &self,
        kind: TextSearchKind,
        index: &str,
        pattern: &str,
    ) -> Result<QueryResult, SearchError> {
        let body = build_pattern_query(kind, pattern, self.config.search_size);
        self.query(index, &body).await
    }

    /// Run a raw search body and decode the hits.
    #[instrument(skip(self, query))]
    pub async fn query(&self, index: &str, query: &Value) -> Result<QueryResult, SearchError> {
        let client = self.random_client()?;
        let body = client.search(index, query).await?;

        let hits = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .ok_or_else(|| engine_error(&body, "search"))?;

        let items: Vec<QueryResultItem> = hits
            .iter()
            .filter_map(|hit| {
                let item = parse_hit(hit);
                if item.is_none() {
                    warn!(index = %index, hit = %hit, "Skipping hit without text");
                }
                item
            })
            .collect();

        debug!(index = %index, count = items.len(), "Search completed");
        Ok(QueryResult { items })
    }
}

fn connect_all(
    endpoints: &[ServiceEndpoint],
    factory: &dyn ClientFactory,
) -> Result<Vec<Arc<dyn SearchEngineClient>>, SearchError> {
    if endpoints.is_empty() {
        return Err(SearchError::configuration("no text search client found"));
    }
    endpoints.iter().map(|e| factory.connect(e)).collect()
}

fn check_acknowledged(body: &Value, operation: &str) -> Result<(), SearchError> {
    if body.get("acknowledged").and_then(Value::as_bool) == Some(true) {
        Ok(())
    } else {
        Err(engine_error(body, operation))
    }
}

fn is_index_not_found(body: &Value) -> bool {
    body.pointer("/error/type").and_then(Value::as_str) == Some(INDEX_NOT_FOUND)
}

fn engine_error(body: &Value, operation: &str) -> SearchError {
    match body.get("error") {
        Some(error) => SearchError::engine(format!("{} failed: {}", operation, error)),
        None => SearchError::engine(format!("{} unexpected response: {}", operation, body)),
    }
}

/// Fails when the engine reports any rejected item.
fn check_bulk_response(body: &Value, total: usize) -> Result<(), SearchError> {
    match body.get("errors").and_then(Value::as_bool) {
        Some(false) => Ok(()),
        Some(true) => {
            // Each item is `{"<action>": {..., "error": {...}}}`.
            let failures: Vec<&Value> = body
                .get("items")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|item| item.as_object()?.values().next()?.get("error"))
                .collect();
            let reason = failures
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string());

            warn!(
                failed = failures.len(),
                total = total,
                reason = %reason,
                "Bulk request had item failures"
            );
            Err(SearchError::BulkItemError {
                failed: failures.len(),
                total,
                reason,
            })
        }
        None => Err(engine_error(body, "bulk")),
    }
}

fn string_field(source: &Value, name: &str) -> String {
    source
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_hit(hit: &Value) -> Option<QueryResultItem> {
    let source = hit.get("_source")?;
    let text = source.get("text")?.as_str()?.to_string();
    Some(QueryResultItem {
        text,
        vid: string_field(source, "vid"),
        src: string_field(source, "src"),
        dst: string_field(source, "dst"),
        rank: source.get("rank").and_then(Value::as_i64).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc_id::DocumentKey;
    use crate::testing::{ops, MockClientFactory, MockSearchClient};
    use serde_json::json;

    fn adapter_with(client: Arc<MockSearchClient>) -> SearchAdapter {
        SearchAdapter::new(vec![client])
    }

    #[tokio::test]
    async fn test_create_index_sends_mapping() {
        let client = Arc::new(MockSearchClient::new("n1:9200"));
        let adapter = adapter_with(client.clone());

        adapter.create_index("idx_person").await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, "idx_person");
        assert_eq!(calls[0].body["mappings"]["properties"]["rank"]["type"], "long");
    }

    #[tokio::test]
    async fn test_create_index_without_ack_fails() {
        let client = Arc::new(
            MockSearchClient::new("n1:9200")
                .respond(ops::CREATE_INDEX, Ok(json!({ "acknowledged": false }))),
        );
        let adapter = adapter_with(client);

        let err = adapter.create_index("idx").await.unwrap_err();
        assert!(matches!(err, SearchError::EngineError(_)));
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let client = Arc::new(MockSearchClient::new("n1:9200").respond(
            ops::DROP_INDEX,
            Err(SearchError::transport(None, "connection refused")),
        ));
        let adapter = adapter_with(client);

        let err = adapter.drop_index("idx").await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_clear_index_requires_deleted() {
        let client = Arc::new(MockSearchClient::new("n1:9200"));
        let adapter = adapter_with(client.clone());
        adapter.clear_index("idx").await.unwrap();

        client.set_response(ops::CLEAR_INDEX, Ok(json!({ "took": 3 })));
        assert!(adapter.clear_index("idx").await.is_err());
    }

    #[tokio::test]
    async fn test_index_exists() {
        let client = Arc::new(MockSearchClient::new("n1:9200"));
        let adapter = adapter_with(client.clone());
        assert!(adapter.index_exists("idx").await.unwrap());

        client.set_response(
            ops::GET_INDEX,
            Err(SearchError::response(
                404,
                r#"{"error":{"type":"index_not_found_exception"},"status":404}"#,
            )),
        );
        assert!(!adapter.index_exists("idx").await.unwrap());

        client.set_response(
            ops::GET_INDEX,
            Ok(json!({ "error": { "type": "index_not_found_exception" } })),
        );
        assert!(!adapter.index_exists("idx").await.unwrap());

        client.set_response(ops::GET_INDEX, Err(SearchError::response(500, "boom")));
        assert!(adapter.index_exists("idx").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_pool_is_configuration_error() {
        let adapter = SearchAdapter::new(Vec::new());
        let err = adapter.prefix("idx", "a").await.unwrap_err();
        assert_eq!(
            err,
            SearchError::configuration("no text search client found")
        );
    }

    #[tokio::test]
    async fn test_empty_bulk_sends_nothing() {
        let client = Arc::new(MockSearchClient::new("n1:9200"));
        let adapter = adapter_with(client.clone());

        adapter.bulk(&BulkRequest::new()).await.unwrap();
        assert_eq!(client.call_count(ops::BULK), 0);
    }

    #[tokio::test]
    async fn test_bulk_sends_all_lines() {
        let client = Arc::new(MockSearchClient::new("n1:9200"));
        let adapter = adapter_with(client.clone());

        let mut bulk = BulkRequest::new();
        bulk.put("idx_person", &DocumentKey::vertex("v1"), "alice");
        bulk.delete("idx_person", &DocumentKey::vertex("v2"));
        adapter.bulk(&bulk).await.unwrap();

        let requests = client.bulk_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], bulk.lines());
    }

    #[tokio::test]
    async fn test_bulk_is_chunked_by_batch_size() {
        let client = Arc::new(MockSearchClient::new("n1:9200"));
        let adapter = SearchAdapter::with_config(
            vec![client.clone()],
            AdapterConfig::with_bulk_batch_size(2),
        );

        let mut bulk = BulkRequest::new();
        for i in 0..5 {
            bulk.put("idx", &DocumentKey::vertex(format!("v{}", i)), "t");
        }
        adapter.bulk(&bulk).await.unwrap();

        let requests = client.bulk_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].len(), 4);
        assert_eq!(requests[2].len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_item_failure_fails_request() {
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "a", "status": 201 } },
                {
                    "index": {
                        "_id": "b",
                        "status": 400,
                        "error": { "type": "mapper_parsing_exception" }
                    }
                }
            ]
        });
        let client =
            Arc::new(MockSearchClient::new("n1:9200").respond(ops::BULK, Ok(response)));
        let adapter = adapter_with(client);

        let mut bulk = BulkRequest::new();
        bulk.put("idx", &DocumentKey::vertex("a"), "x");
        bulk.put("idx", &DocumentKey::vertex("b"), "y");

        match adapter.bulk(&bulk).await.unwrap_err() {
            SearchError::BulkItemError { failed, total, reason } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
                assert!(reason.contains("mapper_parsing_exception"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_query_parses_hits() {
        let response = json!({
            "hits": { "hits": [
                {
                    "_id": "1",
                    "_source": { "text": "alice", "vid": "v1", "src": "", "dst": "", "rank": 0 }
                },
                {
                    "_id": "2",
                    "_source": { "text": "alfa", "vid": "", "src": "a", "dst": "b", "rank": 4 }
                },
                { "_id": "3", "_source": { "vid": "v3" } }
            ] }
        });
        let client =
            Arc::new(MockSearchClient::new("n1:9200").respond(ops::SEARCH, Ok(response)));
        let adapter = adapter_with(client.clone());

        let result = adapter.prefix("idx", "al").await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.items[0].vid, "v1");
        assert_eq!(result.items[1].src, "a");
        assert_eq!(result.items[1].rank, 4);

        let calls = client.calls();
        assert_eq!(calls[0].body["query"]["prefix"]["text"], "al");
        assert_eq!(calls[0].body["size"], 10_000);
    }

    #[tokio::test]
    async fn test_query_without_hits_fails() {
        let client = Arc::new(
            MockSearchClient::new("n1:9200").respond(ops::SEARCH, Ok(json!({ "took": 1 }))),
        );
        let adapter = adapter_with(client);
        assert!(adapter.fuzzy("idx", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_by_query_counts() {
        let client = Arc::new(
            MockSearchClient::new("n1:9200")
                .respond(ops::DELETE_BY_QUERY, Ok(json!({ "deleted": 7 })))
                .respond(ops::UPDATE_BY_QUERY, Ok(json!({ "updated": 2 }))),
        );
        let adapter = adapter_with(client);
        let query = json!({ "query": { "match_all": {} } });

        assert_eq!(adapter.delete_by_query("idx", &query).await.unwrap(), 7);
        assert_eq!(adapter.update_by_query("idx", &query).await.unwrap(), 2);
    }

    #[test]
    fn test_from_service_clients() {
        let factory = MockClientFactory::new();
        let records = vec![
            ServiceClient {
                host: "n1:9200".to_string(),
                conn_type: None,
                user: None,
                pwd: None,
            },
            ServiceClient {
                host: "n2:9200".to_string(),
                conn_type: Some("https".to_string()),
                user: Some("u".to_string()),
                pwd: Some("p".to_string()),
            },
        ];

        let adapter =
            SearchAdapter::from_service_clients(&records, &factory, AdapterConfig::default())
                .unwrap();
        let addresses: Vec<String> = adapter.endpoints().into_iter().map(|e| e.address).collect();
        assert_eq!(addresses, vec!["n1:9200", "n2:9200"]);
        assert_eq!(factory.clients().len(), 2);
    }

    #[test]
    fn test_from_empty_service_clients_fails() {
        let factory = MockClientFactory::new();
        let result = SearchAdapter::from_service_clients(&[], &factory, AdapterConfig::default());
        assert!(matches!(result, Err(SearchError::ConfigurationError(_))));
    }

    #[test]
    fn test_set_endpoints_replaces_pool() {
        let factory = MockClientFactory::new();
        let adapter = SearchAdapter::from_endpoints(
            &[ServiceEndpoint::parse("n1:9200")],
            &factory,
            AdapterConfig::default(),
        )
        .unwrap();

        adapter
            .set_endpoints(
                &[
                    ServiceEndpoint::parse("n2:9200"),
                    ServiceEndpoint::parse("n3:9200"),
                ],
                &factory,
            )
            .unwrap();
        assert_eq!(adapter.endpoints().len(), 2);

        // A failed reconnect keeps the current pool.
        assert!(adapter.set_endpoints(&[], &factory).is_err());
        assert_eq!(adapter.endpoints().len(), 2);
    }

    #[tokio::test]
    async fn test_every_node_gets_traffic() {
        let factory = MockClientFactory::new();
        let endpoints: Vec<ServiceEndpoint> = ["n1:9200", "n2:9200"]
            .iter()
            .map(|a| ServiceEndpoint::parse(a))
            .collect();
        let adapter =
            SearchAdapter::from_endpoints(&endpoints, &factory, AdapterConfig::default()).unwrap();

        for _ in 0..64 {
            adapter.index_exists("idx").await.unwrap();
        }
        for client in factory.clients() {
            assert!(client.call_count(ops::GET_INDEX) > 0);
        }
    }
}
