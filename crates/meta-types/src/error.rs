//! Error types for the META data model.

use thiserror::Error;

/// Unified error type for data model operations.
#[derive(Debug, Error)]
pub enum MetaError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed content identifier
    #[error("Invalid cid: {0}")]
    InvalidCid(String),

    /// Encoded bytes do not describe an object
    #[error("Invalid object: {0}")]
    InvalidObject(String),
}
