//! Error types for the indexing pipeline.

use meta_migrate::MigrationError;
use meta_storage::StorageError;
use thiserror::Error;

/// Errors that can occur in the indexing pipeline
#[derive(Error, Debug)]
pub enum IndexingError {
    /// A field along a graph path is absent. Callers treat this as "optional
    /// section missing" rather than a failure.
    #[error("Path not found: {path}")]
    PathNotFound {
        /// Dotted path up to and including the missing segment
        path: String,
    },

    /// The document does not have the shape its format requires
    #[error("Schema violation: {0}")]
    Schema(String),

    /// A field the format guarantees exactly N values for has another count
    #[error("Cardinality violation: expected {expected} {field}, got {got}")]
    Cardinality {
        /// Field whose values were counted
        field: String,
        /// Required count
        expected: usize,
        /// Actual count
        got: usize,
    },

    /// Object store operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// SQLite operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    /// The identifier stream ended with an error
    #[error("Stream error: {0}")]
    Stream(String),

    /// The batch was cancelled before it completed
    #[error("Indexing cancelled")]
    Cancelled,
}

impl IndexingError {
    /// Whether this error only means an optional field is absent.
    pub fn is_path_not_found(&self) -> bool {
        matches!(self, IndexingError::PathNotFound { .. })
    }

    /// Whether this error is an external cancellation rather than bad input.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, IndexingError::Cancelled)
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        IndexingError::Schema(message.into())
    }
}
