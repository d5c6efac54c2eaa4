//! Pooled SQLite connections for concurrent request handling.

use std::path::PathBuf;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use super::{DbResult, MedicineStore, StoreSource, SCHEMA};
use crate::models::MedicineRecord;

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Default time to wait for a free connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Pool settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// SQLite database file
    pub database: PathBuf,
    /// Maximum number of open connections
    pub pool_size: u32,
    /// How long `acquire` waits for a free connection
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Process-wide connection pool. Cheap to clone.
#[derive(Clone)]
pub struct StorePool {
    pool: Pool<SqliteConnectionManager>,
}

impl StorePool {
    /// Build the pool and make sure the schema exists.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let busy_timeout = config.connect_timeout;
        let manager = SqliteConnectionManager::file(&config.database)
            .with_init(move |conn| conn.busy_timeout(busy_timeout));

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connect_timeout)
            .build(manager)?;

        pool.get()?.execute_batch(SCHEMA)?;

        tracing::debug!(
            database = %config.database.display(),
            pool_size = config.pool_size,
            "connection pool ready"
        );

        Ok(Self { pool })
    }

    /// Check out a connection and run a trivial query.
    pub fn ping(&self) -> DbResult<()> {
        let conn = self.pool.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Current pool occupancy as (open connections, idle connections).
    pub fn occupancy(&self) -> (u32, u32) {
        let state = self.pool.state();
        (state.connections, state.idle_connections)
    }
}

impl StoreSource for StorePool {
    type Handle = PooledStore;

    fn acquire(&self) -> DbResult<PooledStore> {
        Ok(PooledStore {
            conn: self.pool.get()?,
        })
    }
}

/// A connection checked out of the pool; returned to it on drop.
pub struct PooledStore {
    conn: PooledConnection<SqliteConnectionManager>,
}

impl MedicineStore for PooledStore {
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
