//! Error types for sf-sql

use thiserror::Error;

/// SQL parsing and validation errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,

    /// Transaction control inside a unit (S003)
    #[error("[S003] Transaction control statement not allowed in a change unit: {0}")]
    TransactionControl(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
