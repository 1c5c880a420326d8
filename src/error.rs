//! Error handling module for the optimizer
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Library code returns these; the binary and the file-backed config layer wrap
//! them in `anyhow` for context.

use thiserror::Error;

/// Main error type for the optimizer
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// IO errors (snapshot files, report output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Price catalog retrieval or ingestion errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Errors reported by the cloud provider (connect, scan, modify, tag)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Backup tag errors (encoding, missing or unreadable snapshots)
    #[error("Backup error: {0}")]
    Backup(String),

    /// A volume class name the optimizer does not know about
    #[error("Unknown volume class: {0}")]
    UnknownClass(String),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for optimizer operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

// Convenient error constructors
impl OptimizerError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a backup error
    pub fn backup(msg: impl Into<String>) -> Self {
        Self::Backup(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}
