//! Bulk mutation accumulator.
//!
//! Buffers upserts and deletes per target index in the line format the
//! `_bulk` endpoint expects. Order is preserved within an index; the order
//! between indices carries no meaning. Nothing is deduplicated: the engine
//! applies actions for the same document id in order, so the last one wins.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::doc_id::DocumentKey;

/// One accumulated action. `document` is present for upserts only.
#[derive(Debug, Clone, PartialEq)]
struct BulkAction {
    metadata: Value,
    document: Option<Value>,
}

impl BulkAction {
    fn line_count(&self) -> usize {
        1 + usize::from(self.document.is_some())
    }
}

/// Per-batch collection of bulk actions keyed by index name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRequest {
    actions: BTreeMap<String, Vec<BulkAction>>,
}

impl BulkRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an upsert of `text` for the element identified by `key`.
    pub fn put(&mut self, index: &str, key: &DocumentKey, text: &str) {
        let (vid, src, dst, rank) = key.fields();
        let action = BulkAction {
            metadata: json!({
                "index": {
                    "_index": index,
                    "_id": key.doc_id()
                }
            }),
            document: Some(json!({
                "vid": vid,
                "src": src,
                "dst": dst,
                "rank": rank,
                "text": text
            })),
        };
        self.actions.entry(index.to_string()).or_default().push(action);
    }

    /// Queue a delete of the document for `key`.
    pub fn delete(&mut self, index: &str, key: &DocumentKey) {
        let action = BulkAction {
            metadata: json!({
                "delete": {
                    "_index": index,
                    "_id": key.doc_id()
                }
            }),
            document: None,
        };
        self.actions.entry(index.to_string()).or_default().push(action);
    }

    /// True when no action was recorded.
    pub fn is_empty(&self) -> bool {
        self.actions.values().all(Vec::is_empty)
    }

    /// Number of actions (not lines).
    pub fn len(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    /// Every wire line, index by index, actions in submission order.
    pub fn lines(&self) -> Vec<Value> {
        let mut lines = Vec::with_capacity(self.line_count());
        for actions in self.actions.values() {
            for action in actions {
                lines.push(action.metadata.clone());
                if let Some(document) = &action.document {
                    lines.push(document.clone());
                }
            }
        }
        lines
    }

    fn line_count(&self) -> usize {
        self.actions
            .values()
            .flatten()
            .map(BulkAction::line_count)
            .sum()
    }

    /// Newline-delimited request body, one JSON value per line.
    pub fn to_ndjson(&self) -> String {
        let mut body = String::new();
        for line in self.lines() {
            body.push_str(&line.to_string());
            body.push('\n');
        }
        body
    }

    /// Split into requests of at most `max_actions` actions each.
    ///
    /// An upsert's document line always travels with its metadata line.
    /// `max_actions` of 0 is treated as 1.
    pub fn chunks(&self, max_actions: usize) -> Vec<BulkRequest> {
        let max_actions = max_actions.max(1);
        let mut chunks = Vec::new();
        let mut current = BulkRequest::new();
        let mut current_len = 0;

        for (index, actions) in &self.actions {
            for action in actions {
                if current_len == max_actions {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current
                    .actions
                    .entry(index.clone())
                    .or_default()
                    .push(action.clone());
                current_len += 1;
            }
        }
        if current_len > 0 {
            chunks.push(current);
        }
        chunks
    }
}
