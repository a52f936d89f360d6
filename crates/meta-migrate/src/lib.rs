//! Schema migrations for SQLite index databases.
//!
//! Each document type owns one [`Migrations`] list, built explicitly by the
//! code that defines its tables and handed to [`Migrations::run`]. Versions are
//! applied in ascending order, each exactly once, and tracked per list in the
//! `schema_migrations` table. Migrations are append-only: never edit an
//! existing entry, only add a new version.
//!
//! Typical usage:
//!
//! ```rust
//! use meta_migrate::Migrations;
//!
//! let migrations = Migrations::new("artist").with(
//!     1,
//!     "CREATE TABLE artist (
//!         object_id text NOT NULL,
//!         name      text NOT NULL
//!     );",
//! );
//!
//! let conn = rusqlite::Connection::open_in_memory().unwrap();
//! assert_eq!(migrations.run(&conn).unwrap(), 1);
//! ```

use std::collections::BTreeMap;

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while bringing a schema up to date.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Reading or creating the bookkeeping table failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A migration body failed; earlier versions stay applied
    #[error("Migration {name} v{version} failed: {source}")]
    Failed {
        /// Name of the migration list
        name: String,
        /// Version that failed
        version: u32,
        /// Underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// The database records a version this list does not define
    #[error("Database is at {name} v{current}, newer than the latest known v{latest}")]
    UnknownVersion {
        /// Name of the migration list
        name: String,
        /// Version recorded in the database
        current: u32,
        /// Highest version this list defines
        latest: u32,
    },
}

/// A single schema migration.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Strictly positive version number
    pub version: u32,
    /// Opaque DDL/DML body, executed as a batch
    pub sql: String,
}

/// An ordered set of migrations for one document type's schema.
#[derive(Debug, Clone)]
pub struct Migrations {
    name: String,
    migrations: BTreeMap<u32, Migration>,
}

const BOOTSTRAP_SQL: &str = "
    CREATE TABLE IF NOT EXISTS schema_migrations (
        name       TEXT    NOT NULL,
        version    INTEGER NOT NULL,
        applied_at TEXT    NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (name, version)
    );
";

impl Migrations {
    /// Create an empty migration list. `name` keys this list's rows in the
    /// bookkeeping table so several document types can share a database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            migrations: BTreeMap::new(),
        }
    }

    /// Add a migration with the given version.
    ///
    /// # Panics
    ///
    /// Panics if `version` is zero or already registered. Both are bugs in the
    /// code defining the schema, not runtime conditions.
    pub fn add(&mut self, version: u32, sql: impl Into<String>) {
        assert!(version > 0, "migration versions start at 1 ({})", self.name);
        let sql = sql.into();
        if self.migrations.contains_key(&version) {
            panic!("failed to add migration: {} v{version} already registered", self.name);
        }
        self.migrations.insert(version, Migration { version, sql });
    }

    /// Builder form of [`Migrations::add`].
    pub fn with(mut self, version: u32, sql: impl Into<String>) -> Self {
        self.add(version, sql);
        self
    }

    /// Name of this migration list.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Highest defined version, 0 if empty.
    pub fn latest_version(&self) -> u32 {
        self.migrations.keys().next_back().copied().unwrap_or(0)
    }

    /// Migrations in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// Number of defined migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether no migrations are defined.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Version currently applied to `conn` for this list, 0 if none.
    pub fn current_version(&self, conn: &Connection) -> Result<u32, MigrationError> {
        conn.execute_batch(BOOTSTRAP_SQL)?;
        let version: Option<u32> = conn
            .query_row(
                "SELECT MAX(version) FROM schema_migrations WHERE name = ?1",
                [&self.name],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        Ok(version.unwrap_or(0))
    }

    /// Apply every migration newer than the database's current version, in
    /// ascending order. Returns the resulting version.
    ///
    /// Each migration runs in its own transaction together with its
    /// bookkeeping row, so a failure leaves the schema at the last fully
    /// applied version. A second run against an up-to-date database is a no-op.
    pub fn run(&self, conn: &Connection) -> Result<u32, MigrationError> {
        let current = self.current_version(conn)?;
        let latest = self.latest_version();

        if current > latest {
            return Err(MigrationError::UnknownVersion {
                name: self.name.clone(),
                current,
                latest,
            });
        }
        if current == latest {
            debug!(name = %self.name, version = current, "Schema up to date");
            return Ok(current);
        }

        for migration in self.migrations.range(current + 1..).map(|(_, m)| m) {
            self.apply(conn, migration)
                .map_err(|source| MigrationError::Failed {
                    name: self.name.clone(),
                    version: migration.version,
                    source,
                })?;
            info!(name = %self.name, version = migration.version, "Applied migration");
        }

        Ok(latest)
    }

    fn apply(&self, conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (name, version) VALUES (?1, ?2)",
            rusqlite::params![self.name, migration.version],
        )?;
        tx.commit()
    }
}
