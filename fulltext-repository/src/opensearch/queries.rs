//! OpenSearch query builders.
//!
//! One builder per pattern class. All of them target the `text` field and
//! carry an explicit `size` so the engine does not cut matches at its default
//! page size.

use serde_json::{json, Value};

use crate::opensearch::index_config::TEXT_FIELD;
use fulltext_shared::TextSearchKind;

/// Build the search body for a pattern of the given kind.
pub fn build_pattern_query(kind: TextSearchKind, pattern: &str, size: usize) -> Value {
    match kind {
        TextSearchKind::Prefix => build_prefix_query(pattern, size),
        TextSearchKind::Fuzzy => build_fuzzy_query(pattern, size),
        TextSearchKind::Regexp => build_regexp_query(pattern, size),
        TextSearchKind::Wildcard => build_wildcard_query(pattern, size),
    }
}

/// Values starting with `pattern`.
pub fn build_prefix_query(pattern: &str, size: usize) -> Value {
    json!({
        "query": {
            "prefix": {
                TEXT_FIELD: pattern
            }
        },
        "size": size
    })
}

/// Values within the engine's AUTO edit distance of `pattern`.
pub fn build_fuzzy_query(pattern: &str, size: usize) -> Value {
    json!({
        "query": {
            "fuzzy": {
                TEXT_FIELD: {
                    "value": pattern,
                    "fuzziness": "AUTO"
                }
            }
        },
        "size": size
    })
}

pub fn build_regexp_query(pattern: &str, size: usize) -> Value {
    json!({
        "query": {
            "regexp": {
                TEXT_FIELD: pattern
            }
        },
        "size": size
    })
}

pub fn build_wildcard_query(pattern: &str, size: usize) -> Value {
    json!({
        "query": {
            "wildcard": {
                TEXT_FIELD: pattern
            }
        },
        "size": size
    })
}

/// Match-all query used to clear an index.
pub fn build_match_all_query() -> Value {
    json!({
        "query": {
            "match_all": {}
        }
    })
}
