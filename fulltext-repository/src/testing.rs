//! In-memory stand-ins for the search engine, for tests.
//!
//! Enabled for this crate's own tests and for dependents through the
//! `test-util` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::SearchError;
use crate::interfaces::{ClientFactory, SearchEngineClient};
use fulltext_shared::ServiceEndpoint;

/// Operation names used for canned responses and recorded calls.
pub mod ops {
    pub const CREATE_INDEX: &str = "create_index";
    pub const DROP_INDEX: &str = "drop_index";
    pub const CLEAR_INDEX: &str = "clear_index";
    pub const GET_INDEX: &str = "get_index";
    pub const DELETE_BY_QUERY: &str = "delete_by_query";
    pub const UPDATE_BY_QUERY: &str = "update_by_query";
    pub const SEARCH: &str = "search";
    pub const BULK: &str = "bulk";
}

type Responses = HashMap<&'static str, Result<Value, SearchError>>;

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: &'static str,
    /// Index name, or empty for bulk.
    pub target: String,
    /// Request body; bulk calls record their lines as an array.
    pub body: Value,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock node answering every operation with a canned response.
///
/// Unconfigured operations answer like a healthy engine.
pub struct MockSearchClient {
    endpoint: ServiceEndpoint,
    responses: Mutex<Responses>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockSearchClient {
    pub fn new(address: &str) -> Self {
        Self {
            endpoint: ServiceEndpoint::new("http", address),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Builder form of `set_response`.
    pub fn respond(self, operation: &'static str, result: Result<Value, SearchError>) -> Self {
        self.set_response(operation, result);
        self
    }

    pub fn set_response(&self, operation: &'static str, result: Result<Value, SearchError>) {
        lock(&self.responses).insert(operation, result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Lines of every bulk request, in call order.
    pub fn bulk_requests(&self) -> Vec<Vec<Value>> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == ops::BULK)
            .map(|c| c.body.as_array().cloned().unwrap_or_default())
            .collect()
    }

    fn default_response(operation: &str, target: &str) -> Value {
        match operation {
            ops::CREATE_INDEX | ops::DROP_INDEX => json!({ "acknowledged": true }),
            ops::CLEAR_INDEX | ops::DELETE_BY_QUERY => json!({ "deleted": 0 }),
            ops::UPDATE_BY_QUERY => json!({ "updated": 0 }),
            ops::GET_INDEX => json!({ target: {} }),
            ops::SEARCH => json!({ "hits": { "total": { "value": 0 }, "hits": [] } }),
            _ => json!({ "took": 1, "errors": false, "items": [] }),
        }
    }

    fn record(
        &self,
        operation: &'static str,
        target: &str,
        body: Value,
    ) -> Result<Value, SearchError> {
        lock(&self.calls).push(RecordedCall {
            operation,
            target: target.to_string(),
            body,
        });
        match lock(&self.responses).get(operation) {
            Some(result) => result.clone(),
            None => Ok(Self::default_response(operation, target)),
        }
    }
}

#[async_trait]
impl SearchEngineClient for MockSearchClient {
    fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    async fn create_index(&self, name: &str, body: &Value) -> Result<Value, SearchError> {
        self.record(ops::CREATE_INDEX, name, body.clone())
    }

    async fn drop_index(&self, name: &str) -> Result<Value, SearchError> {
        self.record(ops::DROP_INDEX, name, Value::Null)
    }

    async fn clear_index(&self, name: &str) -> Result<Value, SearchError> {
        self.record(ops::CLEAR_INDEX, name, Value::Null)
    }

    async fn get_index(&self, name: &str) -> Result<Value, SearchError> {
        self.record(ops::GET_INDEX, name, Value::Null)
    }

    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<Value, SearchError> {
        self.record(ops::DELETE_BY_QUERY, index, query.clone())
    }

    async fn update_by_query(&self, index: &str, query: &Value) -> Result<Value, SearchError> {
        self.record(ops::UPDATE_BY_QUERY, index, query.clone())
    }

    async fn search(&self, index: &str, query: &Value) -> Result<Value, SearchError> {
        self.record(ops::SEARCH, index, query.clone())
    }

    async fn bulk(&self, lines: &[Value]) -> Result<Value, SearchError> {
        self.record(ops::BULK, "", Value::Array(lines.to_vec()))
    }
}

/// Factory handing out `MockSearchClient`s that share the same canned responses.
#[derive(Default)]
pub struct MockClientFactory {
    responses: Mutex<Responses>,
    connect_error: Option<SearchError>,
    created: Mutex<Vec<Arc<MockSearchClient>>>,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned response installed on every client created afterwards.
    pub fn respond(self, operation: &'static str, result: Result<Value, SearchError>) -> Self {
        lock(&self.responses).insert(operation, result);
        self
    }

    /// Make every `connect` fail.
    pub fn failing(mut self, error: SearchError) -> Self {
        self.connect_error = Some(error);
        self
    }

    /// Clients created so far, in creation order.
    pub fn clients(&self) -> Vec<Arc<MockSearchClient>> {
        lock(&self.created).clone()
    }

    /// Every call made through any client of this factory.
    pub fn all_calls(&self) -> Vec<RecordedCall> {
        self.clients().iter().flat_map(|c| c.calls()).collect()
    }

    pub fn bulk_requests(&self) -> Vec<Vec<Value>> {
        self.clients().iter().flat_map(|c| c.bulk_requests()).collect()
    }
}

impl ClientFactory for MockClientFactory {
    fn connect(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<Arc<dyn SearchEngineClient>, SearchError> {
        if let Some(err) = &self.connect_error {
            return Err(err.clone());
        }
        let client = Arc::new(MockSearchClient::new(&endpoint.address));
        for (operation, result) in lock(&self.responses).iter() {
            client.set_response(operation, result.clone());
        }
        lock(&self.created).push(client.clone());
        Ok(client)
    }
}
