//! Object store layer for the META indexer.
//!
//! Provides the content-addressed object store the indexing pipeline reads from:
//! - [`ObjectStore`]: get/put of objects keyed by their [`Cid`](meta_types::Cid)
//! - [`Storage`]: RocksDB-backed store with a dedicated `objects` column family
//! - [`MemoryStore`]: in-process store for tests and ephemeral pipelines
//!
//! Objects are immutable, so every implementation is safe to share and read
//! concurrently.

pub mod column_families;
pub mod db;
pub mod error;
pub mod memory;
pub mod store;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::ObjectStore;
