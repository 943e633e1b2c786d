//! Layered configuration for refract.
//!
//! Settings are resolved in the following order of precedence (highest to lowest):
//! 1. **Environment Variables**: `REFRACT_*`, with `__` separating nested keys
//!    (e.g. `REFRACT_ACTIONS__CACHE_CAPACITY=64`).
//! 2. **Local Configuration**: `.refract/config.toml` in the workspace root.
//! 3. **Default Values**: the `Default` impls below.
//!
//! ```toml
//! # .refract/config.toml
//! [files]
//! source_extension = ".java"
//!
//! [actions]
//! cache_capacity = 32
//! cache_ttl_secs = 300
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RefractConfig {
    pub files: FileConfig,
    pub actions: ActionCacheConfig,
    pub logging: LoggingConfig,
}

/// Which files take part in package-aware refactoring
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Extension (with leading dot) of source files
    pub source_extension: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            source_extension: ".java".to_string(),
        }
    }
}

/// Deferred code-action store settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ActionCacheConfig {
    /// Maximum number of live request entries
    pub cache_capacity: usize,
    /// Entry lifetime in seconds; 0 keeps entries until evicted by capacity
    pub cache_ttl_secs: u64,
}

impl Default for ActionCacheConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 32,
            cache_ttl_secs: 0,
        }
    }
}

impl ActionCacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

/// Log output format
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format for development
    #[default]
    Pretty,
    /// Structured JSON format for production
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl RefractConfig {
    /// Load configuration for the workspace rooted at `workspace_root`
    pub fn load(workspace_root: &Path) -> Result<Self, ConfigError> {
        let config_path = workspace_root.join(".refract").join("config.toml");

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("REFRACT_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actions.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "actions.cache_capacity must be at least 1".to_string(),
            ));
        }

        let ext = &self.files.source_extension;
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "files.source_extension must look like \".java\", got {ext:?}"
            )));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Figment error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for figment::Error {
    fn from(err: ConfigError) -> figment::Error {
        use figment::error::Kind;
        figment::Error::from(Kind::Message(err.to_string()))
    }
}

impl From<ConfigError> for refract_foundation::RefractError {
    fn from(err: ConfigError) -> Self {
        refract_foundation::RefractError::config(err.to_string())
    }
}
