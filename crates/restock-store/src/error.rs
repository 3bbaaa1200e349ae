//! Store error type shared by all operations.

use thiserror::Error;

/// Errors surfaced by store operations.
///
/// Any of these aborts the caller's current unit of work: the poll loop
/// abandons the cycle without advancing its checkpoint, and startup treats
/// them as fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQL statement failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The pool could not hand out a connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A persisted timestamp could not be parsed as RFC 3339.
    #[error("invalid stored timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}
