//! # Full-text Shared
//!
//! Plain data types shared by the listener, the search repository and the
//! query rewriter. Nothing in this crate performs I/O.

pub mod endpoint;
pub mod query;
pub mod value;

pub use endpoint::{ServiceClient, ServiceEndpoint, DEFAULT_PROTOCOL};
pub use query::{QueryResult, QueryResultItem, TextSearchKind};
pub use value::Value;
