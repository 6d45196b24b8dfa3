//! Error types for configuration operations

use thiserror::Error;

/// Errors that can occur during configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from {path}: {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save config to {path}: {source}")]
    SaveError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error(
        "No profiles configured. Add a [profiles.<name>] section to the config file or set {env}"
    )]
    NoProfiles { env: &'static str },

    #[error("Invalid waiter setting for {kind}: {reason}")]
    InvalidWaiter { kind: String, reason: String },

    #[error("Failed to determine config directory")]
    ConfigDirError,
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
