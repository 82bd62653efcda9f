//! Process settings read from the environment.

use std::env;
use std::str::FromStr;

use fulltext_repository::{AdapterConfig, DEFAULT_SEARCH_SIZE};
use fulltext_rewriter::{RewriterConfig, DEFAULT_RETRY_COUNT};
use fulltext_shared::ServiceEndpoint;

use crate::SyncError;

/// Default search node.
const DEFAULT_SEARCH_ENDPOINT: &str = "http://localhost:9200";

/// Settings for the search side of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoints: Vec<ServiceEndpoint>,
    pub retry_count: u32,
    pub bulk_batch_size: Option<usize>,
    pub search_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoints: vec![ServiceEndpoint::parse(DEFAULT_SEARCH_ENDPOINT)],
            retry_count: DEFAULT_RETRY_COUNT,
            bulk_batch_size: None,
            search_size: DEFAULT_SEARCH_SIZE,
        }
    }
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FT_SEARCH_ENDPOINTS`: comma separated nodes (default: http://localhost:9200)
    /// - `FT_SEARCH_USER` / `FT_SEARCH_PASSWORD`: basic auth for every node
    /// - `FT_REQUEST_RETRY_TIMES`: attempts per text search (default: 3)
    /// - `FT_BULK_BATCH_SIZE`: max actions per bulk request (default: unlimited)
    /// - `FT_SEARCH_SIZE`: hits per pattern query (default: 10000)
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SyncError> {
        let defaults = Self::default();

        let endpoints = match lookup("FT_SEARCH_ENDPOINTS") {
            Some(list) => parse_endpoints(&list)?,
            None => defaults.endpoints,
        };
        let endpoints = match (lookup("FT_SEARCH_USER"), lookup("FT_SEARCH_PASSWORD")) {
            (Some(user), Some(password)) => endpoints
                .into_iter()
                .map(|e| e.with_credentials(user.clone(), password.clone()))
                .collect(),
            _ => endpoints,
        };

        Ok(Self {
            endpoints,
            retry_count: parse_var(&lookup, "FT_REQUEST_RETRY_TIMES")?
                .unwrap_or(defaults.retry_count),
            bulk_batch_size: parse_var(&lookup, "FT_BULK_BATCH_SIZE")?,
            search_size: parse_var(&lookup, "FT_SEARCH_SIZE")?.unwrap_or(defaults.search_size),
        })
    }

    /// Replace the endpoint list, keeping configured credentials.
    pub fn with_endpoints(mut self, specs: &[String]) -> Result<Self, SyncError> {
        let credentials = self
            .endpoints
            .first()
            .and_then(|e| e.credentials())
            .map(|(u, p)| (u.to_string(), p.to_string()));

        let mut endpoints = parse_endpoints(&specs.join(","))?;
        if let Some((user, password)) = credentials {
            endpoints = endpoints
                .into_iter()
                .map(|e| e.with_credentials(user.clone(), password.clone()))
                .collect();
        }
        self.endpoints = endpoints;
        Ok(self)
    }

    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            bulk_batch_size: self.bulk_batch_size,
            search_size: self.search_size,
        }
    }

    pub fn rewriter_config(&self) -> RewriterConfig {
        RewriterConfig::with_retry_count(self.retry_count)
    }
}

fn parse_endpoints(list: &str) -> Result<Vec<ServiceEndpoint>, SyncError> {
    let endpoints: Vec<ServiceEndpoint> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ServiceEndpoint::parse)
        .collect();
    if endpoints.is_empty() {
        return Err(SyncError::config("no search endpoint configured"));
    }
    Ok(endpoints)
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, SyncError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| SyncError::config(format!("{}={:?}: {}", key, raw, e))),
    }
}
