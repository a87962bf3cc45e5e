//! Error types for the SQLite storage layer.
//!
//! Driver failures, schema conflicts, refused statements and row mapping
//! problems all surface as one [`SqliteError`].

use clinical_records_core::{RecordError, ValidationError};
use thiserror::Error;

/// Errors that can occur while generating or running statements.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite connection or statement failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Record type declares a key layout SQLite cannot express.
    #[error("schema conflict: {0}")]
    SchemaConflict(#[from] ValidationError),

    /// Update called with instances of two different record types.
    #[error("type mismatch: cannot update a '{old}' row with a '{new}' instance")]
    TypeMismatch {
        old: &'static str,
        new: &'static str,
    },

    /// Statement would have no WHERE condition (or nothing to set) and
    /// would touch every row of the table.
    #[error("refusing {operation} on '{table}': no field yields a filter")]
    EmptyFilter {
        operation: &'static str,
        table: &'static str,
    },

    /// Result row width does not match the record type's columns.
    #[error("row for '{table}' has {found} columns, expected {expected}")]
    RowArity {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    /// Record type has no single integer key for id lookups.
    #[error("record type '{0}' has no integer primary key")]
    NoIntegerKey(&'static str),

    /// Typed record could not be rebuilt from a row.
    #[error("record error: {0}")]
    RecordError(#[from] RecordError),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    ConfigError(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
