//! Configuration module for the full-text sync process.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::Settings;
