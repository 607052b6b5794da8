//! Configuration management for the language tutor
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (`LINGO_TUTOR__` prefix, `__` separator)
//!
//! The topic catalog is built from the `topics` section, falling back to a
//! built-in set of everyday conversation topics.

pub mod constants;
pub mod settings;
pub mod topics;

pub use settings::{
    load_settings, LanguageSettings, LlmProvider, LlmSettings, ObservabilityConfig,
    PersistenceConfig, RuntimeEnvironment, ServerConfig, SessionConfig, Settings, TopicEntry,
    UserLanguageOverride,
};
pub use topics::TopicCatalog;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for lingo_core::Error {
    fn from(err: ConfigError) -> Self {
        lingo_core::Error::Config(err.to_string())
    }
}
