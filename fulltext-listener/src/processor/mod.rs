//! Processor module for the listener.
//!
//! Turns committed log records into search document mutations.

mod mutation_processor;

pub use mutation_processor::{build_bulk, MutationProcessor, ProcessedMutation};
