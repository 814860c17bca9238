//! Error types for TallyDB
//!
//! This module defines all error types used throughout the database engine.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for TallyDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Syntax Errors ==========
    #[error("Syntax error: {message} near '{fragment}'")]
    Syntax { message: String, fragment: String },

    // ========== Catalog Errors ==========
    #[error("Schema error: {0}")]
    InvalidSchema(String),

    #[error("Catalog error: table '{0}' already exists")]
    DuplicateTable(String),

    #[error("Catalog error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Catalog error: column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Catalog error: column reference '{0}' is ambiguous")]
    AmbiguousColumn(String),

    // ========== Type Errors ==========
    #[error("Type error: column '{column}' expects {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Type error: table '{table}' has {expected} column(s), got {found} value(s)")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    // ========== Constraint Errors ==========
    #[error("Constraint violation: duplicate value {value} for column '{column}'")]
    ConstraintViolation { column: String, value: String },

    // ========== Storage Errors ==========
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage error: corrupted data in '{path}': {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad category of an [`Error`], stable across message wording changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    InvalidSchema,
    DuplicateTable,
    TableNotFound,
    ColumnNotFound,
    TypeMismatch,
    ConstraintViolation,
    Storage,
}

impl Error {
    /// Build a syntax error for the offending fragment
    pub fn syntax(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Error::Syntax {
            message: message.into(),
            fragment: fragment.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::InvalidSchema(_) => ErrorKind::InvalidSchema,
            Error::DuplicateTable(_) => ErrorKind::DuplicateTable,
            Error::TableNotFound(_) => ErrorKind::TableNotFound,
            Error::ColumnNotFound(..) | Error::AmbiguousColumn(_) => ErrorKind::ColumnNotFound,
            Error::TypeMismatch { .. } | Error::ColumnCountMismatch { .. } => {
                ErrorKind::TypeMismatch
            }
            Error::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Error::Storage(_) | Error::Corrupted { .. } | Error::Io(_) => ErrorKind::Storage,
        }
    }
}

impl ErrorKind {
    /// Short lowercase label, suitable for `{error_type, message}` replies
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::InvalidSchema => "invalid_schema",
            ErrorKind::DuplicateTable => "duplicate_table",
            ErrorKind::TableNotFound => "table_not_found",
            ErrorKind::ColumnNotFound => "column_not_found",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::ConstraintViolation => "constraint_violation",
            ErrorKind::Storage => "storage",
        }
    }
}

/// Result type alias for TallyDB operations
pub type Result<T> = std::result::Result<T, Error>;
