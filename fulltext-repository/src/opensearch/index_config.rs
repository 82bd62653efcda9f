//! OpenSearch index mappings.
//!
//! Every full-text index holds the same document shape: the indexed text plus
//! the identity fields needed to map a hit back to a vertex or an edge.

use serde_json::{json, Value};

/// Field holding the indexed property value.
pub const TEXT_FIELD: &str = "text";

/// Get the settings and mappings used when creating a full-text index.
///
/// - `text` is a `keyword` so prefix/wildcard/regexp/fuzzy match the whole value
/// - `vid`, `src`, `dst` are `keyword` identity fields
/// - `rank` is a `long`
pub fn get_index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "vid": {
                    "type": "keyword"
                },
                "src": {
                    "type": "keyword"
                },
                "dst": {
                    "type": "keyword"
                },
                "rank": {
                    "type": "long"
                },
                "text": {
                    "type": "keyword"
                }
            }
        }
    })
}
