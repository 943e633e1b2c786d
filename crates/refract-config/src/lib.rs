//! Configuration management and logging setup for refract

pub mod config;
pub mod logging;

pub use config::{ActionCacheConfig, ConfigError, FileConfig, LogFormat, LoggingConfig, RefractConfig};
