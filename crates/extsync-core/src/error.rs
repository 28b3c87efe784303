//! Error types for extsync-core

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using extsync-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for extsync
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid version string
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// Durable state (ledger, feed cache, config store) could not be written
    #[error("Failed to persist {what} to {}: {source}", path.display())]
    Persistence {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
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

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a persistence error for the given target
    pub fn persistence(
        what: &'static str,
        path: impl AsRef<Path>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Persistence {
            what,
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }

    /// Whether this error means durable state was not written
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
