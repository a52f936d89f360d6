//! Storage layer error types.

use meta_types::{Cid, MetaError};
use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB operation failed
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Column family not found
    #[error("Column family not found: {0}")]
    ColumnFamilyNotFound(String),

    /// The store holds no object with this identifier
    #[error("Object not found: {0}")]
    NotFound(Cid),

    /// Stored bytes do not hash to the identifier they were stored under
    #[error("Corrupt object: expected {expected}, computed {computed}")]
    Corrupt {
        /// Identifier the object was requested by
        expected: Cid,
        /// Identifier of the bytes actually read
        computed: Cid,
    },

    /// Stored bytes could not be decoded into an object
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Whether this error means the object is simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<MetaError> for StorageError {
    fn from(err: MetaError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
