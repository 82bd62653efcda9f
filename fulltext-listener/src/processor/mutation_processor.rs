//! Mutation processor implementation.
//!
//! Keeps only tag and edge writes whose type carries a full-text index and
//! whose indexed value is a string.

use std::sync::Arc;

use fulltext_repository::{BulkRequest, DocumentKey};
use fulltext_shared::Value;
use tracing::{debug, error, instrument, trace};

use crate::batch::{BatchOp, LogRecord};
use crate::keys::KeyDecoder;
use crate::schema::{FtIndexDef, SchemaProvider, SpaceId};

/// Processed result for one log record.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedMutation {
    /// Document to be indexed (put).
    Upsert {
        index: String,
        key: DocumentKey,
        text: String,
    },
    /// Document to be deleted (remove).
    Delete { index: String, key: DocumentKey },
}

/// Processor that classifies and decodes log records.
///
/// The processor is responsible for:
/// - Classifying keys as tag or edge data
/// - Skipping types without a full-text index
/// - Extracting the indexed text from the row
pub struct MutationProcessor {
    space_id: SpaceId,
    schema: Arc<dyn SchemaProvider>,
    keys: Arc<dyn KeyDecoder>,
}

impl MutationProcessor {
    pub fn new(
        space_id: SpaceId,
        schema: Arc<dyn SchemaProvider>,
        keys: Arc<dyn KeyDecoder>,
    ) -> Self {
        Self {
            space_id,
            schema,
            keys,
        }
    }

    /// Process a batch of log records.
    ///
    /// # Returns
    ///
    /// Mutations in delivery order. Records that are not indexed produce nothing.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub fn process_batch(&self, records: &[LogRecord]) -> Vec<ProcessedMutation> {
        let processed: Vec<ProcessedMutation> = records
            .iter()
            .filter_map(|record| self.process_record(record))
            .collect();

        debug!(processed_count = processed.len(), "Processed log batch");
        processed
    }

    /// Process a single log record.
    fn process_record(&self, record: &LogRecord) -> Option<ProcessedMutation> {
        let data_key = self.keys.decode(&record.key)?;
        let schema = data_key.schema();

        let Some(index) = self.schema.ft_index(self.space_id, schema) else {
            trace!(schema = %schema, "No full-text index, skipping record");
            return None;
        };
        let key = data_key.document_key();

        match record.op {
            BatchOp::Remove => Some(ProcessedMutation::Delete {
                index: index.name,
                key,
            }),
            BatchOp::Put => {
                let field = indexed_field(&index)?.to_string();
                let Some(reader) = self.schema.row_reader(self.space_id, schema, &record.value)
                else {
                    error!(schema = %schema, "Failed to get row reader");
                    return None;
                };

                match reader.value_by_name(&field) {
                    Value::String(text) => Some(ProcessedMutation::Upsert {
                        index: index.name,
                        key,
                        text,
                    }),
                    other => {
                        error!(
                            schema = %schema,
                            field = %field,
                            value_type = other.type_name(),
                            "Can't create fulltext index on non-string value"
                        );
                        None
                    }
                }
            }
        }
    }
}

fn indexed_field(index: &FtIndexDef) -> Option<&str> {
    match index.fields.as_slice() {
        [] => {
            error!(index = %index.name, "Full-text index has no field");
            None
        }
        [field] => Some(field.as_str()),
        [field, ..] => {
            error!(
                index = %index.name,
                fields = index.fields.len(),
                "Only one field will create fulltext index"
            );
            Some(field.as_str())
        }
    }
}

/// Accumulate mutations into one bulk request.
pub fn build_bulk(mutations: &[ProcessedMutation]) -> BulkRequest {
    let mut bulk = BulkRequest::new();
    for mutation in mutations {
        match mutation {
            ProcessedMutation::Upsert { index, key, text } => bulk.put(index, key, text),
            ProcessedMutation::Delete { index, key } => bulk.delete(index, key),
        }
    }
    bulk
}
