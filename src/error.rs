//! Error types for storage operations

use thiserror::Error;

/// Storage operation result type
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage adapter errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Deployment misconfiguration with security implications; always
    /// propagated to the caller, never absorbed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Object store call failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Detector metadata could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
