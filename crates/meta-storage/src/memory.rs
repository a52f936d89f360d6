//! In-memory object store.

use dashmap::DashMap;
use std::sync::Arc;

use meta_types::{Cid, Object};

use crate::error::StorageError;
use crate::store::{decode_verified, ObjectStore};

/// Object store backed by a concurrent hash map of encoded objects.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    objects: Arc<DashMap<Cid, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, cid: &Cid) -> Result<Object, StorageError> {
        match self.objects.get(cid) {
            Some(bytes) => decode_verified(cid, bytes.value()),
            None => Err(StorageError::NotFound(*cid)),
        }
    }

    fn put(&self, object: &Object) -> Result<Cid, StorageError> {
        let cid = object.cid();
        self.objects.entry(cid).or_insert_with(|| object.encode());
        Ok(cid)
    }

    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        Ok(self.objects.contains_key(cid))
    }
}
