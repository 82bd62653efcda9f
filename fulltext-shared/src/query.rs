//! Text search query kinds and results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pattern class of a text search predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSearchKind {
    Prefix,
    Fuzzy,
    Regexp,
    Wildcard,
}

impl fmt::Display for TextSearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSearchKind::Prefix => write!(f, "prefix"),
            TextSearchKind::Fuzzy => write!(f, "fuzzy"),
            TextSearchKind::Regexp => write!(f, "regexp"),
            TextSearchKind::Wildcard => write!(f, "wildcard"),
        }
    }
}

/// Identity fields read back from one matched document.
///
/// Vertex documents carry `vid`; edge documents carry `src`, `dst` and `rank`.
/// The unused fields are empty (rank 0).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryResultItem {
    pub text: String,
    pub vid: String,
    pub src: String,
    pub dst: String,
    pub rank: i64,
}

/// Matches returned by a pattern query, in engine order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub items: Vec<QueryResultItem>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(TextSearchKind::Prefix.to_string(), "prefix");
        assert_eq!(TextSearchKind::Wildcard.to_string(), "wildcard");
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&TextSearchKind::Regexp).unwrap();
        assert_eq!(json, "\"regexp\"");
    }

    #[test]
    fn test_empty_result() {
        let result = QueryResult::default();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }
}
