//! # Full-text Rewriter
//!
//! Query-side companion of the listener: resolves prefix, fuzzy, regexp and
//! wildcard predicates through the search engine and rewrites them into
//! equality filters the storage engine can evaluate.

pub mod errors;
pub mod expression;
pub mod rewriter;

pub use errors::RewriteError;
pub use expression::{
    needs_text_search, Expression, LogicalOp, RelationalOp, TextSearchArgument,
    TextSearchExpression,
};
pub use rewriter::{rewrite_text_search_filter, text_search, RewriterConfig, DEFAULT_RETRY_COUNT};
