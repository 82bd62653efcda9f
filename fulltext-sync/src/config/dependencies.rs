//! Dependency initialization and wiring for the full-text sync process.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::SyncError;
use fulltext_listener::{FtListener, ListenerConfig, SchemaProvider, SpaceId};
use fulltext_repository::{ClientFactory, OpenSearchClientFactory, SearchAdapter};
use fulltext_rewriter::RewriterConfig;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Adapter over the configured search nodes.
    pub adapter: Arc<SearchAdapter>,
    /// Retry policy for text searches.
    pub rewriter: RewriterConfig,
    factory: Arc<dyn ClientFactory>,
    settings: Settings,
}

impl Dependencies {
    /// Initialize dependencies against OpenSearch nodes.
    ///
    /// No request is sent; an unreachable node shows up on first use.
    pub fn new(settings: Settings) -> Result<Self, SyncError> {
        Self::with_factory(settings, Arc::new(OpenSearchClientFactory))
    }

    /// Initialize dependencies with a custom client factory.
    pub fn with_factory(
        settings: Settings,
        factory: Arc<dyn ClientFactory>,
    ) -> Result<Self, SyncError> {
        info!(
            endpoints = ?settings.endpoints.iter().map(|e| e.url()).collect::<Vec<_>>(),
            retry_count = settings.retry_count,
            bulk_batch_size = ?settings.bulk_batch_size,
            "Initializing dependencies"
        );

        let adapter = SearchAdapter::from_endpoints(
            &settings.endpoints,
            factory.as_ref(),
            settings.adapter_config(),
        )
        .map_err(|e| SyncError::config(format!("Failed to create search adapter: {}", e)))?;

        Ok(Self {
            adapter: Arc::new(adapter),
            rewriter: settings.rewriter_config(),
            factory,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build and initialize a listener for one space.
    ///
    /// Search nodes come from the catalog behind `schema`, not from the
    /// process settings; only the adapter tuning is shared.
    pub fn listener(
        &self,
        schema: Arc<dyn SchemaProvider>,
        space_id: SpaceId,
        offset_path: impl Into<PathBuf>,
    ) -> Result<FtListener, SyncError> {
        let config = ListenerConfig {
            space_id,
            offset_path: offset_path.into(),
            adapter: self.settings.adapter_config(),
        };
        let mut listener = FtListener::new(schema, self.factory.clone(), config);
        listener.init()?;
        Ok(listener)
    }
}
