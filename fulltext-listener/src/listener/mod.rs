//! Full-text listener.
//!
//! Consumes committed batches for one graph space in delivery order, sends
//! the indexable mutations to the search engine, and records how far it got.
//!
//! The offset is only persisted after the bulk request succeeded. A crash
//! in between redelivers the batch; document ids are derived from the graph
//! element, so the replayed upserts and deletes land on the same documents.

use std::path::PathBuf;
use std::sync::Arc;

use fulltext_repository::{AdapterConfig, ClientFactory, SearchAdapter};
use tracing::{debug, error, info, instrument};

use crate::batch::{LogBatch, LogRecord};
use crate::errors::ListenerError;
use crate::keys::{KeyDecoder, KeyLayout};
use crate::offset::{ApplyOffset, OffsetStore};
use crate::processor::{build_bulk, MutationProcessor};
use crate::schema::{ExternalServiceType, SchemaProvider, SpaceId};

/// Default name of the offset file.
pub const DEFAULT_OFFSET_FILE: &str = "last_apply_log";

/// Configuration for the listener.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerConfig {
    /// Space whose mutations are mirrored.
    pub space_id: SpaceId,
    /// File holding the apply offset.
    pub offset_path: PathBuf,
    /// Settings for the search adapter built at init.
    pub adapter: AdapterConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            space_id: 0,
            offset_path: PathBuf::from(DEFAULT_OFFSET_FILE),
            adapter: AdapterConfig::default(),
        }
    }
}

impl ListenerConfig {
    pub fn new(space_id: SpaceId, offset_path: impl Into<PathBuf>) -> Self {
        Self {
            space_id,
            offset_path: offset_path.into(),
            ..Self::default()
        }
    }
}

/// Lifecycle of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Uninitialized,
    Ready,
    FailedFatal,
}

/// Context resolved by `init`.
struct Runtime {
    space_name: String,
    processor: MutationProcessor,
    adapter: SearchAdapter,
}

/// CDC listener for one graph space.
///
/// Driven by a single caller. `apply` and `persist` are never called
/// concurrently on the same instance.
pub struct FtListener {
    config: ListenerConfig,
    schema: Arc<dyn SchemaProvider>,
    factory: Arc<dyn ClientFactory>,
    key_decoder: Option<Arc<dyn KeyDecoder>>,
    offsets: OffsetStore,
    state: ListenerState,
    runtime: Option<Runtime>,
}

impl FtListener {
    /// Create an uninitialized listener.
    pub fn new(
        schema: Arc<dyn SchemaProvider>,
        factory: Arc<dyn ClientFactory>,
        config: ListenerConfig,
    ) -> Self {
        let offsets = OffsetStore::new(config.offset_path.clone());
        Self {
            config,
            schema,
            factory,
            key_decoder: None,
            offsets,
            state: ListenerState::Uninitialized,
            runtime: None,
        }
    }

    /// Use `decoder` instead of the default key layout for the space.
    pub fn with_key_decoder(mut self, decoder: Arc<dyn KeyDecoder>) -> Self {
        self.key_decoder = Some(decoder);
        self
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Display name of the space, once initialized.
    pub fn space_name(&self) -> Option<&str> {
        self.runtime.as_ref().map(|r| r.space_name.as_str())
    }

    /// The search adapter, once initialized.
    pub fn adapter(&self) -> Option<&SearchAdapter> {
        self.runtime.as_ref().map(|r| &r.adapter)
    }

    /// Resolve the vertex id length, the search nodes and the space name.
    ///
    /// Any failure leaves the listener in `FailedFatal`; the caller is
    /// expected to stop and restart from the catalog.
    pub fn init(&mut self) -> Result<(), ListenerError> {
        if self.state == ListenerState::FailedFatal {
            return Err(ListenerError::fatal("listener has already failed"));
        }

        match self.resolve() {
            Ok(runtime) => {
                info!(
                    space_id = self.config.space_id,
                    space_name = %runtime.space_name,
                    endpoints = runtime.adapter.endpoints().len(),
                    "Full-text listener initialized"
                );
                self.runtime = Some(runtime);
                self.state = ListenerState::Ready;
                Ok(())
            }
            Err(e) => {
                error!(
                    space_id = self.config.space_id,
                    error = %e,
                    "Failed to initialize full-text listener"
                );
                self.runtime = None;
                self.state = ListenerState::FailedFatal;
                Err(e)
            }
        }
    }

    fn resolve(&self) -> Result<Runtime, ListenerError> {
        let space_id = self.config.space_id;

        let vid_len = self.schema.space_vid_len(space_id).map_err(|e| {
            ListenerError::configuration(format!("vid length of space {}: {}", space_id, e))
        })?;

        let clients = self
            .schema
            .service_clients(ExternalServiceType::Search)
            .map_err(|e| ListenerError::configuration(format!("search clients: {}", e)))?;
        let adapter = SearchAdapter::from_service_clients(
            &clients,
            self.factory.as_ref(),
            self.config.adapter.clone(),
        )
        .map_err(|e| ListenerError::configuration(e.to_string()))?;

        let space_name = self.schema.space_name(space_id).map_err(|e| {
            ListenerError::configuration(format!("name of space {}: {}", space_id, e))
        })?;

        let keys: Arc<dyn KeyDecoder> = match &self.key_decoder {
            Some(decoder) => decoder.clone(),
            None => Arc::new(KeyLayout::new(vid_len)),
        };
        let processor = MutationProcessor::new(space_id, self.schema.clone(), keys);

        Ok(Runtime {
            space_name,
            processor,
            adapter,
        })
    }

    fn runtime(&self) -> Result<&Runtime, ListenerError> {
        match (self.state, &self.runtime) {
            (ListenerState::Ready, Some(runtime)) => Ok(runtime),
            (ListenerState::FailedFatal, _) => {
                Err(ListenerError::fatal("listener has already failed"))
            }
            _ => Err(ListenerError::not_ready("init has not completed")),
        }
    }

    /// Mirror one committed batch into the search engine.
    ///
    /// A batch with nothing to index sends no request. A failed request is
    /// returned without touching the offset so the batch can be redelivered.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn apply(&self, records: &[LogRecord]) -> Result<(), ListenerError> {
        let runtime = self.runtime()?;

        let mutations = runtime.processor.process_batch(records);
        let bulk = build_bulk(&mutations);
        if bulk.is_empty() {
            debug!("No indexable mutations in batch");
            return Ok(());
        }

        if let Err(e) = runtime.adapter.bulk(&bulk).await {
            error!(error = %e, actions = bulk.len(), "Failed to apply batch");
            return Err(e.into());
        }

        debug!(actions = bulk.len(), "Applied batch");
        Ok(())
    }

    /// Record that everything up to `offset` has been applied.
    ///
    /// A write failure is fatal: the listener moves to `FailedFatal` and
    /// refuses further work.
    pub fn persist(&mut self, offset: ApplyOffset) -> Result<(), ListenerError> {
        if self.state == ListenerState::FailedFatal {
            return Err(ListenerError::fatal("listener has already failed"));
        }

        if let Err(source) = self.offsets.store(&offset) {
            error!(
                path = %self.offsets.path().display(),
                error = %source,
                "Failed to write apply offset"
            );
            self.state = ListenerState::FailedFatal;
            return Err(ListenerError::OffsetWrite {
                path: self.offsets.path().to_path_buf(),
                source,
            });
        }
        Ok(())
    }

    /// Apply a batch, then persist its offset.
    pub async fn commit(&mut self, batch: &LogBatch) -> Result<(), ListenerError> {
        self.apply(&batch.records).await?;
        self.persist(batch.offset)
    }

    /// `(last_log_id, last_term)` from the offset file, zero if absent.
    pub fn last_committed_log_id(&self) -> (i64, i64) {
        self.offsets.load().last_committed()
    }

    /// `last_apply_log_id` from the offset file, zero if absent.
    pub fn last_apply_log_id(&self) -> i64 {
        self.offsets.load().last_apply_log_id
    }
}
