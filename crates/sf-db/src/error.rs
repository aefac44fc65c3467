//! Error types for sf-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Primary key or unique constraint violated (D004)
    #[error("[D004] Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Concurrent transaction touched the same rows (D005)
    #[error("[D005] Write-write conflict with a concurrent transaction: {0}")]
    WriteConflict(String),

    /// Transaction control failed (D006)
    #[error("[D006] Transaction failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D007)
    #[error("[D007] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a DuckDB error message, keeping `context` (usually the SQL)
    /// in the rendered message.
    pub(crate) fn classify(err: &duckdb::Error, context: &str) -> Self {
        // duckdb::Error does not expose structured variants, so the message
        // is the only thing to match on. Patterns are kept narrow.
        let msg = err.to_string();
        let full = if context.is_empty() {
            msg.clone()
        } else {
            format!("{msg}: {context}")
        };

        if msg.contains("Duplicate key")
            || msg.contains("violates primary key")
            || msg.contains("violates unique constraint")
            || msg.contains("constraint violated: duplicate key")
        {
            DbError::UniqueViolation(full)
        } else if msg.contains("write-write conflict") || msg.contains("Conflict on tuple") {
            DbError::WriteConflict(full)
        } else if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(full)
        } else {
            DbError::ExecutionError(full)
        }
    }

    /// Whether the error means another writer already holds the row
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_) | DbError::WriteConflict(_))
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::classify(&err, "")
    }
}
