//! Error types for the DBSet engine.
//!
//! All public APIs return `DbsetResult<T>` — no panics in library code.

use thiserror::Error;

/// Unified error type for all DataSet operations.
#[derive(Debug, Error)]
pub enum DbsetError {
    /// Misconfigured dataset (master/detail links, missing collaborators)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Requested field does not exist in the current field set
    #[error("field '{0}' not found")]
    FieldNotFound(String),

    /// Requested parameter is not registered
    #[error("param '{0}' not found")]
    ParamNotFound(String),

    /// Value could not be converted to the destination type
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Record binding failed on a specific field
    #[error("binding error on field '{field}': {message}")]
    Binding { field: String, message: String },

    /// SQL parsing error
    #[error("SQL parse error: {message}\nSQL: {sql}")]
    SqlParse { message: String, sql: String },

    /// Driver-side query/prepare/exec failure
    #[error("SQL execution error: {message}\nContext: {context}")]
    SqlExecution { message: String, context: String },

    /// Connection is closed or unreachable
    #[error("connection closed")]
    ConnectionClosed,

    /// The operation's context was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// The operation's context deadline passed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Invalid operation
    #[error("invalid operation: {message}\nContext: {context}")]
    InvalidOperation { message: String, context: String },

    /// Serialization/deserialization error (configuration files)
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// SQLite driver error
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },
}

/// Result type alias for all DataSet operations.
pub type DbsetResult<T> = Result<T, DbsetError>;

impl From<serde_json::Error> for DbsetError {
    fn from(err: serde_json::Error) -> Self {
        DbsetError::Serialization(err.to_string())
    }
}
