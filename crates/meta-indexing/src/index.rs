//! SQLite index database and its transaction guard.
//!
//! The index holds a single connection behind an async mutex. A write batch
//! takes the lock for its whole lifetime via [`IndexTx`], which is also the
//! rollback guard: dropping it without calling [`IndexTx::commit`] undoes
//! every write made through it.

use std::path::Path;

use rusqlite::{Connection, Params};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use meta_migrate::Migrations;

use crate::error::IndexingError;

/// The relational index.
pub struct Index {
    conn: Mutex<Connection>,
}

/// Outcome of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    /// A new row was written
    Row,
    /// A row with the same key already exists; nothing was written
    AlreadyIndexed,
}

impl Index {
    /// Open (or create) the index database at `path` with WAL journaling and
    /// foreign keys enabled.
    pub fn open(path: &Path) -> Result<Self, IndexingError> {
        info!("Opening index at {:?}", path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "wal")?;
        conn.pragma_update(None, "foreign_keys", "on")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Private in-memory index, for tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self, IndexingError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "on")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Bring the schema for one document type up to date.
    pub async fn migrate(&self, migrations: &Migrations) -> Result<u32, IndexingError> {
        let conn = self.conn.lock().await;
        Ok(migrations.run(&*conn)?)
    }

    /// Start a write transaction. Waits for any other open transaction to
    /// finish first.
    pub async fn begin(&self) -> Result<IndexTx<'_>, IndexingError> {
        let conn = self.conn.lock().await;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        debug!("Began index transaction");
        Ok(IndexTx {
            conn,
            finished: false,
        })
    }

    /// Run a read-only closure against the connection.
    pub async fn read<T, F>(&self, f: F) -> Result<T, IndexingError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock().await;
        Ok(f(&*conn)?)
    }

    /// Number of rows in `table`.
    pub async fn row_count(&self, table: &str) -> Result<u64, IndexingError> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(IndexingError::schema(format!("invalid table name: {table:?}")));
        }
        let sql = format!("SELECT COUNT(*) FROM {table}");
        self.read(|conn| conn.query_row(&sql, [], |row| row.get(0)))
            .await
    }
}

/// An open write transaction on the index.
///
/// Holds the connection lock until committed, rolled back, or dropped.
pub struct IndexTx<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl<'a> IndexTx<'a> {
    /// Insert a row, treating a uniqueness violation as "already indexed".
    ///
    /// Every other failure propagates and should abort the batch.
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> Result<Inserted, IndexingError> {
        match self.conn.execute(sql, params) {
            Ok(_) => Ok(Inserted::Row),
            Err(e) if is_unique_violation(&e) => Ok(Inserted::AlreadyIndexed),
            Err(e) => Err(e.into()),
        }
    }

    /// Read through the transaction, seeing its own uncommitted writes.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Make every write in this transaction durable.
    pub fn commit(mut self) -> Result<(), IndexingError> {
        // A failed COMMIT leaves the transaction open; Drop then rolls it back
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        debug!("Committed index transaction");
        Ok(())
    }

    /// Discard every write in this transaction.
    pub fn rollback(mut self) -> Result<(), IndexingError> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")?;
        debug!("Rolled back index transaction");
        Ok(())
    }
}

impl Drop for IndexTx<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => debug!("Rolled back unfinished index transaction"),
            Err(e) => warn!(error = %e, "Failed to roll back index transaction"),
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}
