//! core
//!
//! Configuration schema and loading.

pub mod config;

pub use config::{Config, ConfigError};
