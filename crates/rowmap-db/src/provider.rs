//! Per-operation connection acquisition.

use std::ops::Deref;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;

/// Errors that can occur while acquiring a connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The pool could not hand out a connection within its timeout.
    #[error("failed to acquire pooled connection: {0}")]
    Pool(#[from] r2d2::Error),

    /// A thread panicked while holding the shared connection.
    #[error("shared connection mutex is poisoned")]
    Poisoned,
}

/// Supplies a live SQLite connection for the duration of one operation.
///
/// The returned guard releases the connection when dropped, so every exit
/// path of the caller (including `?`) gives it back.
pub trait ConnectionProvider: Send + Sync {
    /// Guard that dereferences to the connection.
    type Connection<'a>: Deref<Target = Connection>
    where
        Self: 'a;

    /// Acquires a connection.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` if no connection can be acquired.
    fn connection(&self) -> Result<Self::Connection<'_>, ConnectionError>;
}

impl ConnectionProvider for Mutex<Connection> {
    type Connection<'a> = MutexGuard<'a, Connection>;

    fn connection(&self) -> Result<Self::Connection<'_>, ConnectionError> {
        self.lock().map_err(|_| ConnectionError::Poisoned)
    }
}
