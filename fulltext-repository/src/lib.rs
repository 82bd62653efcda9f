//! # Full-text Repository
//!
//! This crate talks to the external search engine. It includes the error
//! type, the per-node client interface, a concrete implementation for
//! OpenSearch, and the `SearchAdapter` that spreads calls over a pool of
//! nodes.
//!
//! Document identity (`DocumentKey`) and the bulk accumulator
//! (`BulkRequest`) live here too, so the write path and the document ids it
//! produces stay in one place.

pub mod adapter;
pub mod bulk;
pub mod config;
pub mod doc_id;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use adapter::SearchAdapter;
pub use bulk::BulkRequest;
pub use config::{AdapterConfig, DEFAULT_SEARCH_SIZE};
pub use doc_id::DocumentKey;
pub use errors::SearchError;
pub use interfaces::{ClientFactory, SearchEngineClient};
pub use opensearch::{OpenSearchClient, OpenSearchClientFactory};
