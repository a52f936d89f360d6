//! Opening both stores from settings.

use std::sync::Arc;

use meta_storage::{ObjectStore, Storage};
use meta_types::Settings;
use tracing::info;

use crate::error::IndexingError;
use crate::index::Index;
use crate::stream::{cid_channel, CidSender, CidStream};

/// The object store and relational index a process indexes with.
pub struct Stores {
    pub objects: Arc<Storage>,
    pub index: Arc<Index>,
    /// Channel capacity for identifier streams
    pub stream_buffer: usize,
}

impl Stores {
    /// The object store as the trait object the driver consumes.
    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        self.objects.clone()
    }

    /// A bounded identifier channel sized from settings.
    pub fn channel(&self) -> (CidSender, CidStream) {
        cid_channel(self.stream_buffer)
    }
}

/// Open the RocksDB object store and the SQLite index named by `settings`.
pub fn open_stores(settings: &Settings) -> Result<Stores, IndexingError> {
    let store_path = settings.expanded_store_path();
    let index_path = settings.expanded_index_path();
    std::fs::create_dir_all(&store_path)?;

    let objects = Arc::new(Storage::open(&store_path)?);
    let index = Arc::new(Index::open(&index_path)?);
    info!(store = ?store_path, index = ?index_path, log_level = %settings.log_level, "Opened stores");
    Ok(Stores {
        objects,
        index,
        stream_buffer: settings.stream_buffer.max(1),
    })
}
