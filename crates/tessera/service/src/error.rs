//! Error types for tessera-service

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or deserialize a configuration source
    #[error("Configuration load error: {0}")]
    Load(#[from] config::ConfigError),

    /// Loaded values violate a constraint
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
