//! Connection layer for rowmap.
//!
//! Opens `r2d2` pools over a SQLite file or a pool-private in-memory
//! database, and defines the [`ConnectionProvider`] seam the entity manager
//! acquires one connection per operation from.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: concurrent readers with a single writer, no
//!   external database process.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management. A pooled connection returns to the pool when the
//!   guard handed out by [`ConnectionProvider::connection`] is dropped.
//! - **Provider trait**: callers that already own a single connection (tests,
//!   embedded tools) wrap it in a `Mutex` instead of building a pool.

mod pool;
mod provider;

pub use pool::{open_pool, DbPool, PoolError, PoolSettings, Storage};
pub use provider::{ConnectionError, ConnectionProvider};
