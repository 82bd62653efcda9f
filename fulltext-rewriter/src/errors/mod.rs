//! Error types for the rewriter.

mod rewrite_error;

pub use rewrite_error::RewriteError;
