//! Error types for the listener.

mod listener_error;

pub use listener_error::{CatalogError, ListenerError};
