//! The object store interface consumed by the indexing pipeline.

use meta_types::{Cid, Object};

use crate::error::StorageError;

/// Content-addressed object store.
///
/// Implementations store encoded objects keyed by their identifier. Objects are
/// immutable once written, so `put` of existing content is a no-op and reads
/// may happen concurrently with other readers.
pub trait ObjectStore: Send + Sync {
    /// Dereference an identifier. Fails with [`StorageError::NotFound`] if the
    /// store holds no such content.
    fn get(&self, cid: &Cid) -> Result<Object, StorageError>;

    /// Store an object, returning its identifier.
    fn put(&self, object: &Object) -> Result<Cid, StorageError>;

    /// Check existence without decoding.
    fn has(&self, cid: &Cid) -> Result<bool, StorageError>;
}

/// Decode stored bytes and check they belong to `expected`.
pub(crate) fn decode_verified(expected: &Cid, bytes: &[u8]) -> Result<Object, StorageError> {
    let object = Object::decode(bytes)?;
    if object.cid() != *expected {
        return Err(StorageError::Corrupt {
            expected: *expected,
            computed: object.cid(),
        });
    }
    Ok(object)
}
