//! Error types for mapping and data access.

use rowmap_db::ConnectionError;
use rowmap_types::ValueError;

/// A failure reported by the database or by connection acquisition.
#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    /// A SQLite call failed (syntax, constraint, I/O).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection could be acquired.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Errors returned by the entity manager and the metadata reader.
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    /// The type declares no table metadata.
    #[error("{type_name} is not an entity: no table metadata declared")]
    NoEntityMetadata {
        /// Rust type name of the offending type.
        type_name: &'static str,
    },

    /// The type declares no report definition.
    #[error("{type_name} is not a report: no report definition declared")]
    NoReportMetadata {
        /// Rust type name of the offending type.
        type_name: &'static str,
    },

    /// Declared metadata is inconsistent.
    #[error("invalid metadata on {type_name}: {reason}")]
    InvalidMetadata {
        /// Rust type name of the offending type.
        type_name: &'static str,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// A stored column value does not fit its field.
    #[error("cannot decode column '{column}': {source}")]
    DecodeMismatch {
        /// Column being decoded.
        column: String,
        /// Underlying conversion failure.
        source: ValueError,
    },

    /// A field or parameter value does not fit its declared kind.
    #[error("cannot encode column '{column}': {source}")]
    EncodeMismatch {
        /// Column or parameter being encoded.
        column: String,
        /// Underlying conversion failure.
        source: ValueError,
    },

    /// Creating or dropping a table failed.
    #[error("DDL on table '{table}' failed: {source}")]
    Ddl {
        /// Table the statement targeted.
        table: &'static str,
        /// Underlying failure.
        source: DataAccessError,
    },

    /// Any other database failure.
    #[error("data access failed: {0}")]
    DataAccess(#[from] DataAccessError),
}

impl From<rusqlite::Error> for OrmError {
    fn from(e: rusqlite::Error) -> Self {
        Self::DataAccess(DataAccessError::Database(e))
    }
}

impl From<ConnectionError> for OrmError {
    fn from(e: ConnectionError) -> Self {
        Self::DataAccess(DataAccessError::Connection(e))
    }
}
