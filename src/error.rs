//! Error types for FlatKV
//!
//! Provides a unified error type for all operations.
//!
//! Records that fail to decode during replay are not errors: they are
//! counted and skipped (see `recovery`).

use thiserror::Error;

/// Result type alias using FlatError
pub type Result<T> = std::result::Result<T, FlatError>;

/// Unified error type for FlatKV operations
#[derive(Debug, Error)]
pub enum FlatError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    #[error("Store is not open")]
    NotOpen,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Write Pipeline Errors
    // -------------------------------------------------------------------------
    #[error("Write aborted before completion was reported")]
    WriteAborted,

    #[error("Write pipeline error: {0}")]
    Pipeline(String),
}

impl From<serde_json::Error> for FlatError {
    fn from(err: serde_json::Error) -> Self {
        FlatError::Serialization(err.to_string())
    }
}
