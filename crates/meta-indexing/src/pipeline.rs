//! Streaming indexing driver.
//!
//! Consumes a [`CidStream`] of root identifiers, dereferences each through the
//! object store and hands it to a [`DocumentIndexer`], all inside one index
//! transaction. The batch commits only if the stream ends cleanly; any
//! document failure, stream error or cancellation rolls every row back.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use meta_storage::ObjectStore;
use meta_types::Cid;

use crate::error::IndexingError;
use crate::index::{Index, IndexTx};
use crate::indexer::{DocumentIndexer, IndexContext, IndexStats};
use crate::stream::CidStream;

/// Drives one [`DocumentIndexer`] over streams of root identifiers.
pub struct Indexer<D> {
    index: Arc<Index>,
    store: Arc<dyn ObjectStore>,
    document: D,
}

impl<D: DocumentIndexer> Indexer<D> {
    /// Create a driver, bringing the document type's schema up to date.
    ///
    /// Fails if any migration fails; no driver is returned in that case.
    pub async fn new(
        index: Arc<Index>,
        store: Arc<dyn ObjectStore>,
        document: D,
    ) -> Result<Self, IndexingError> {
        let migrations = document.migrations();
        let version = index.migrate(&migrations).await?;
        info!(
            indexer = document.name(),
            schema_version = version,
            "Indexer ready"
        );
        Ok(Self {
            index,
            store,
            document,
        })
    }

    /// Index every document in `stream` as one atomic batch.
    ///
    /// Returns the batch counters on commit. On error nothing from this batch
    /// is visible in the index.
    pub async fn index(
        &self,
        cancel: &CancellationToken,
        mut stream: CidStream,
    ) -> Result<IndexStats, IndexingError> {
        let tx = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(IndexingError::Cancelled),
            tx = self.index.begin() => tx?,
        };

        let name = self.document.name();
        info!(indexer = name, "Starting indexing batch");
        let mut stats = IndexStats::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(indexer = name, documents = stats.documents, "Indexing cancelled, rolling back");
                    return Err(IndexingError::Cancelled);
                }
                next = stream.next() => next,
            };

            let Some(cid) = next else {
                break;
            };

            if let Err(e) = self.index_one(&tx, &cid, &mut stats) {
                warn!(indexer = name, cid = %cid, error = %e, "Document failed, rolling back batch");
                return Err(e);
            }
        }

        if let Some(e) = stream.err() {
            warn!(indexer = name, error = %e, "Stream ended with error, rolling back batch");
            return Err(e);
        }

        tx.commit()?;
        info!(
            indexer = name,
            documents = stats.documents,
            rows_inserted = stats.rows_inserted,
            rows_skipped = stats.rows_skipped,
            "Indexing batch committed"
        );
        Ok(stats)
    }

    fn index_one(
        &self,
        tx: &IndexTx<'_>,
        cid: &Cid,
        stats: &mut IndexStats,
    ) -> Result<(), IndexingError> {
        let document = self.store.get(cid)?;
        let mut cx = IndexContext::new(&*self.store, tx, stats);
        self.document.index_document(&mut cx, &document)?;
        stats.record_document();
        debug!(cid = %cid, "Indexed document");
        Ok(())
    }
}
