//! Database layer for med-alt.

mod schema;
mod medicines;
mod pool;

pub use schema::*;
pub use pool::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::models::MedicineRecord;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Read-only queries the search handler runs against the directory.
pub trait MedicineStore {
    /// Non-discontinued records matching `term` by brand name or composition,
    /// brand-name matches first, then by brand name.
    fn primary_matches(&self, term: &str, limit: usize) -> DbResult<Vec<MedicineRecord>>;

    /// Other non-discontinued records with exactly `composition`, by brand name.
    fn alternatives_for(
        &self,
        composition: &str,
        exclude_id: i64,
        limit: usize,
    ) -> DbResult<Vec<MedicineRecord>>;
}

/// Hands out one store handle per request.
///
/// The handle owns its connection until dropped.
pub trait StoreSource {
    type Handle: MedicineStore;

    fn acquire(&self) -> DbResult<Self::Handle>;
}

/// Single-connection database handle.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

impl MedicineStore for Database {
    fn primary_matches(&self, term: &str, limit: usize) -> DbResult<Vec<MedicineRecord>> {
        self.conn.primary_matches(term, limit)
    }

    fn alternatives_for(
        &self,
        composition: &str,
        exclude_id: i64,
        limit: usize,
    ) -> DbResult<Vec<MedicineRecord>> {
        self.conn.alternatives_for(composition, exclude_id, limit)
    }
}
