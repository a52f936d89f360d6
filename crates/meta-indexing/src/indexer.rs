//! Document indexer trait and per-document context.
//!
//! Each document format implements [`DocumentIndexer`] to say which tables it
//! owns (via its migration list) and how to turn one root object into rows.
//! The driver in [`crate::pipeline`] handles streaming, transactions and
//! cancellation, so implementations stay synchronous and format-specific.

use std::fmt;

use rusqlite::Params;
use tracing::debug;

use meta_migrate::Migrations;
use meta_storage::ObjectStore;
use meta_types::{Cid, Object};

use crate::error::IndexingError;
use crate::graph::Graph;
use crate::index::{IndexTx, Inserted};

/// Extracts rows from one document format.
pub trait DocumentIndexer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Schema migrations for the tables this indexer writes.
    fn migrations(&self) -> Migrations;

    /// Index a single root document.
    ///
    /// Every write must go through `cx` so it lands in the batch transaction.
    /// Returning an error aborts the whole batch.
    fn index_document(
        &self,
        cx: &mut IndexContext<'_>,
        document: &Object,
    ) -> Result<(), IndexingError>;
}

/// Handle given to a [`DocumentIndexer`] for one document.
pub struct IndexContext<'a> {
    store: &'a dyn ObjectStore,
    tx: &'a IndexTx<'a>,
    stats: &'a mut IndexStats,
}

impl<'a> IndexContext<'a> {
    pub fn new(store: &'a dyn ObjectStore, tx: &'a IndexTx<'a>, stats: &'a mut IndexStats) -> Self {
        Self { store, tx, stats }
    }

    /// Graph view rooted at `root`.
    pub fn graph<'g>(&self, root: &'g Object) -> Graph<'g>
    where
        'a: 'g,
    {
        Graph::new(self.store, root)
    }

    /// Dereference an identifier.
    pub fn load(&self, cid: &Cid) -> Result<Object, IndexingError> {
        Ok(self.store.get(cid)?)
    }

    /// Insert a row idempotently and count the outcome.
    pub fn insert<P: Params>(
        &mut self,
        table: &str,
        sql: &str,
        params: P,
    ) -> Result<Inserted, IndexingError> {
        let outcome = self.tx.insert(sql, params)?;
        if outcome == Inserted::AlreadyIndexed {
            debug!(table, "Row already indexed, skipping");
        }
        self.stats.record_insert(outcome);
        Ok(outcome)
    }
}

/// Counters for one indexing batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Root documents indexed
    pub documents: usize,
    /// Rows written
    pub rows_inserted: usize,
    /// Rows skipped because they were already indexed
    pub rows_skipped: usize,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_document(&mut self) {
        self.documents += 1;
    }

    pub fn record_insert(&mut self, outcome: Inserted) {
        match outcome {
            Inserted::Row => self.rows_inserted += 1,
            Inserted::AlreadyIndexed => self.rows_skipped += 1,
        }
    }

    /// Rows handled, written or skipped.
    pub fn total_rows(&self) -> usize {
        self.rows_inserted + self.rows_skipped
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents, {} rows inserted, {} already indexed",
            self.documents, self.rows_inserted, self.rows_skipped
        )
    }
}
