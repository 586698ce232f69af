//! Configuration module for stylepipe
//!
//! Provides types and parsing for `stylepipe.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::*;
