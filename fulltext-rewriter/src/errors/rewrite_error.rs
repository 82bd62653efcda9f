use fulltext_repository::SearchError;
use thiserror::Error;

/// Errors that can occur while resolving a text search predicate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    /// The expression is not a prefix/fuzzy/regexp/wildcard predicate.
    #[error("Not a text search expression: {0}")]
    NotTextSearch(String),

    /// Every search attempt failed; this is the last failure.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}
