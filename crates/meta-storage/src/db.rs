//! RocksDB-backed object store.
//!
//! Provides:
//! - Database open with column family setup
//! - Idempotent object writes (existing content is never rewritten)
//! - Verified reads (the digest of what was read must match the key)

use rocksdb::{IteratorMode, Options, DB};
use std::path::Path;
use tracing::{debug, info};

use meta_types::{Cid, Object};

use crate::column_families::{build_cf_descriptors, ALL_CF_NAMES, CF_OBJECTS};
use crate::error::StorageError;
use crate::store::{decode_verified, ObjectStore};

/// RocksDB object store
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening object store at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        // Objects are append-only
        db_opts.set_compaction_style(rocksdb::DBCompactionStyle::Universal);
        db_opts.set_max_background_jobs(4);

        let db = DB::open_cf_descriptors(&db_opts, path, build_cf_descriptors())?;
        Ok(Self { db })
    }

    fn objects_cf(&self) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_OBJECTS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_OBJECTS.to_string()))
    }

    /// Store raw encoded bytes under their own identifier.
    ///
    /// Returns (cid, created) where created=false if the content already existed.
    pub fn put_bytes(&self, bytes: &[u8]) -> Result<(Cid, bool), StorageError> {
        let object = Object::decode(bytes)?;
        let created = self.put_object(&object)?;
        Ok((object.cid(), created))
    }

    fn put_object(&self, object: &Object) -> Result<bool, StorageError> {
        let cf = self.objects_cf()?;
        let cid = object.cid();

        if self.db.get_pinned_cf(cf, cid.as_bytes())?.is_some() {
            debug!(cid = %cid, "Object already stored, skipping");
            return Ok(false);
        }

        self.db.put_cf(cf, cid.as_bytes(), object.encode())?;
        debug!(cid = %cid, "Stored object");
        Ok(true)
    }

    /// Flush all column families to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.flush_cf(cf)?;
            }
        }
        Ok(())
    }

    /// Get database statistics.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let cf = self.objects_cf()?;
        let mut stats = StorageStats::default();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            stats.object_count += 1;
            stats.object_bytes += value.len() as u64;
        }
        Ok(stats)
    }
}

impl ObjectStore for Storage {
    fn get(&self, cid: &Cid) -> Result<Object, StorageError> {
        let cf = self.objects_cf()?;
        match self.db.get_pinned_cf(cf, cid.as_bytes())? {
            Some(bytes) => decode_verified(cid, &bytes),
            None => Err(StorageError::NotFound(*cid)),
        }
    }

    fn put(&self, object: &Object) -> Result<Cid, StorageError> {
        self.put_object(object)?;
        Ok(object.cid())
    }

    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        let cf = self.objects_cf()?;
        Ok(self.db.get_pinned_cf(cf, cid.as_bytes())?.is_some())
    }
}

/// Statistics about the object store.
#[derive(Debug, Default)]
pub struct StorageStats {
    /// Number of objects stored
    pub object_count: u64,
    /// Total encoded size of stored objects
    pub object_bytes: u64,
}
