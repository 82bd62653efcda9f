//! # Full-text Listener
//!
//! Change-data-capture listener that mirrors committed tag and edge writes
//! of one graph space into the external search engine.
//!
//! ## Architecture
//!
//! 1. **Keys**: classify raw storage keys as tag or edge data
//! 2. **Processor**: keep the indexed text properties and turn records into mutations
//! 3. **Listener**: submit one bulk request per batch and persist the apply offset
//!
//! Schema lookups and row decoding are provided by the caller through
//! `SchemaProvider`.

pub mod batch;
pub mod errors;
pub mod keys;
pub mod listener;
pub mod offset;
pub mod processor;
pub mod schema;

#[cfg(test)]
mod testing;

pub use batch::{BatchOp, LogBatch, LogRecord};
pub use errors::{CatalogError, ListenerError};
pub use keys::{DataKey, KeyDecoder, KeyLayout};
pub use listener::{FtListener, ListenerConfig, ListenerState};
pub use offset::{ApplyOffset, OffsetStore};
pub use processor::{MutationProcessor, ProcessedMutation};
pub use schema::{ExternalServiceType, FtIndexDef, RowReader, SchemaProvider, SchemaRef, SpaceId};
