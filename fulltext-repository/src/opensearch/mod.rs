//! OpenSearch implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! using OpenSearch as the backend, plus the index mapping and query bodies
//! shared by every node.

mod client;
pub mod index_config;
pub mod queries;

pub use client::{OpenSearchClient, OpenSearchClientFactory};
