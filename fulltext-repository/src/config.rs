//! Configuration types for the SearchAdapter.

/// Default number of hits requested per pattern query.
pub const DEFAULT_SEARCH_SIZE: usize = 10_000;

/// Configuration for the SearchAdapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Maximum number of actions sent in a single bulk request.
    /// `None` sends every batch as one request.
    pub bulk_batch_size: Option<usize>,
    /// Number of hits requested by pattern queries.
    pub search_size: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            bulk_batch_size: None,
            search_size: DEFAULT_SEARCH_SIZE,
        }
    }
}

impl AdapterConfig {
    /// Create a config that splits bulk requests above `bulk_batch_size` actions.
    pub fn with_bulk_batch_size(bulk_batch_size: usize) -> Self {
        Self {
            bulk_batch_size: Some(bulk_batch_size),
            ..Self::default()
        }
    }
}
