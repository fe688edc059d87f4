//! Error types for the gridmap dialect layer.
//!
//! All public APIs return `GridResult<T>` — no panics in library code.

use thiserror::Error;

/// Unified error type for all dialect operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// The dialect cannot perform the requested operation.
    ///
    /// Raised by the default locking strategy and by optional capabilities
    /// (sequences, bulk scan) when they are requested without an override.
    #[error("dialect '{dialect}' does not support {capability}")]
    UnsupportedCapability { dialect: String, capability: String },

    /// A key's value list disagrees with its metadata's column list.
    ///
    /// This is a programming-contract violation, never a data condition.
    #[error("inconsistent key shape for '{table}': expected {expected} values, got {actual}")]
    InconsistentKeyShape {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// A row with the same key already exists.
    #[error("duplicate key in '{table}': {key}")]
    DuplicateKey { table: String, key: String },

    /// Type mismatch between expected and actual values
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Invalid or missing configuration property
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// sled embedded database error
    #[error("sled error: {source}")]
    Sled {
        #[from]
        source: sled::Error,
    },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Transport failure reported by a backend
    #[error("backend error: {0}")]
    Backend(String),
}

impl GridError {
    /// Shorthand for [`GridError::UnsupportedCapability`].
    pub fn unsupported(dialect: impl Into<String>, capability: impl Into<String>) -> Self {
        GridError::UnsupportedCapability {
            dialect: dialect.into(),
            capability: capability.into(),
        }
    }
}

/// Result type alias for all dialect operations.
pub type GridResult<T> = Result<T, GridError>;

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for GridError {
    fn from(err: bincode::Error) -> Self {
        GridError::Serialization(err.to_string())
    }
}
