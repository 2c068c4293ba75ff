//! Pooled SQLite storage behind an entity manager.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

use crate::provider::{ConnectionError, ConnectionProvider};

const MEMORY_PATH: &str = ":memory:";

static NEXT_MEMORY_DB: AtomicU64 = AtomicU64::new(0);

/// A pool of SQLite connections.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database a pool opens its connections against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// A database file, journaled in WAL mode.
    File(PathBuf),
    /// An in-memory database private to one pool. Every connection of the
    /// pool sees the same tables, so entities written through one pooled
    /// connection are found through the next.
    Memory,
}

impl Storage {
    /// Interprets a configured database path. `:memory:` selects
    /// [`Storage::Memory`].
    pub fn from_path(path: &str) -> Self {
        if path == MEMORY_PATH {
            Self::Memory
        } else {
            Self::File(PathBuf::from(path))
        }
    }
}

/// Pool sizing and lock-wait limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Upper bound on open connections.
    pub max_size: u32,
    /// How long an operation waits for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            max_size: 8,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Errors raised while opening a pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// r2d2 could not open the initial connections.
    #[error("cannot open sqlite pool for {storage:?}: {source}")]
    Open {
        /// The storage the pool targeted.
        storage: Storage,
        /// Underlying pool failure, usually a connection setup error.
        source: r2d2::Error,
    },
}

/// Opens a pool over `storage`.
///
/// Each connection gets the busy timeout and `foreign_keys = ON`; file
/// databases are switched to WAL journaling.
///
/// # Errors
///
/// `PoolError::Open` if a connection cannot be opened or configured.
pub fn open_pool(storage: &Storage, settings: &PoolSettings) -> Result<DbPool, PoolError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;

    let (manager, wal) = match storage {
        Storage::File(path) => (SqliteConnectionManager::file(path), true),
        Storage::Memory => {
            // A named shared-cache database lives as long as one of its
            // connections, and the pool keeps them open.
            let id = NEXT_MEMORY_DB.fetch_add(1, Ordering::Relaxed);
            let uri = format!("file:rowmap-memory-{id}?mode=memory&cache=shared");
            (SqliteConnectionManager::file(uri), false)
        }
    };

    let busy_timeout = settings.busy_timeout;
    let manager = manager
        .with_flags(flags)
        .with_init(move |conn| prepare_connection(conn, busy_timeout, wal));

    let pool = Pool::builder()
        .max_size(settings.max_size)
        .connection_timeout(settings.acquire_timeout)
        .build(manager)
        .map_err(|source| PoolError::Open {
            storage: storage.clone(),
            source,
        })?;

    tracing::debug!(
        storage = ?storage,
        max_size = settings.max_size,
        busy_timeout = ?busy_timeout,
        "opened sqlite pool"
    );

    Ok(pool)
}

fn prepare_connection(
    conn: &mut Connection,
    busy_timeout: Duration,
    wal: bool,
) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", true)?;

    if wal {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            return Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                Some(format!("journal_mode stayed '{mode}', expected WAL")),
            ));
        }
    }
    Ok(())
}

impl ConnectionProvider for DbPool {
    type Connection<'a> = PooledConnection<SqliteConnectionManager>;

    fn connection(&self) -> Result<Self::Connection<'_>, ConnectionError> {
        Ok(self.get()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(pool: &DbPool) -> Vec<String> {
        let conn = pool.connection().expect("should acquire connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .expect("should prepare catalog query");
        let names: Result<Vec<String>, _> = stmt
            .query_map([], |row| row.get(0))
            .expect("should list tables")
            .collect();
        names.expect("should read table names")
    }

    #[test]
    fn memory_path_selects_shared_memory_storage() {
        assert_eq!(Storage::from_path(":memory:"), Storage::Memory);
        assert_eq!(
            Storage::from_path("catalog.db"),
            Storage::File(PathBuf::from("catalog.db"))
        );
    }

    #[test]
    fn memory_pool_connections_see_one_database() {
        let settings = PoolSettings {
            max_size: 2,
            ..PoolSettings::default()
        };
        let pool = open_pool(&Storage::Memory, &settings).expect("pool should open");

        // Hold one connection so the next one is a different pooled handle.
        let first = pool.connection().expect("should acquire connection");
        first
            .execute_batch("CREATE TABLE author (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
            .expect("should create table");
        assert_eq!(table_names(&pool), ["author"]);
    }

    #[test]
    fn memory_pools_are_isolated() {
        let settings = PoolSettings::default();
        let a = open_pool(&Storage::Memory, &settings).expect("pool should open");
        let b = open_pool(&Storage::Memory, &settings).expect("pool should open");

        a.connection()
            .expect("should acquire connection")
            .execute_batch("CREATE TABLE book (id INTEGER PRIMARY KEY);")
            .expect("should create table");
        assert_eq!(table_names(&a), ["book"]);
        assert!(table_names(&b).is_empty());
    }

    #[test]
    fn connections_enforce_foreign_keys_and_busy_timeout() {
        let settings = PoolSettings {
            busy_timeout: Duration::from_millis(750),
            max_size: 1,
            acquire_timeout: Duration::from_secs(1),
        };
        let pool = open_pool(&Storage::Memory, &settings).expect("pool should open");
        let conn = pool.connection().expect("should acquire connection");

        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .expect("should read busy_timeout");
        assert_eq!(timeout, 750);

        conn.execute_batch(
            "CREATE TABLE author (id INTEGER PRIMARY KEY);
             CREATE TABLE book (id INTEGER PRIMARY KEY, author_id INTEGER NOT NULL REFERENCES author(id));",
        )
        .expect("should create tables");
        let orphan = conn.execute("INSERT INTO book (author_id) VALUES (42)", []);
        assert!(orphan.is_err(), "a book without its author must be rejected");
    }
}
