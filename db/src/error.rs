//! Error types for configuration and fixture loading.

use thiserror::Error;

/// Errors that can occur while loading configuration or seed fixtures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Fixture file extension is neither JSON nor YAML.
    #[error("unsupported fixture format: {0}")]
    UnsupportedFormat(String),

    /// Fixture content is structurally valid but inconsistent.
    #[error("invalid seed data: {0}")]
    InvalidSeed(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
