//! Error types for cnb-actions-core

use thiserror::Error;

/// Result type alias using cnb-actions-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for cnb-actions
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// Action output could not be written
    #[error("Failed to write action output {name}: {source}")]
    Output {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an output error for the named action output
    pub fn output(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Output {
            name: name.into(),
            source,
        }
    }
}
