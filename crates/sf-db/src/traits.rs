//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// A column as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared data type, as the database spells it
    pub data_type: String,
    /// Whether NULL is allowed
    pub nullable: bool,
}

/// Database abstraction trait for SchemaForge
///
/// Implementations must be Send + Sync for async operation. Transaction
/// control is explicit: callers pair `begin` with exactly one of `commit` or
/// `rollback` on the same handle.
#[async_trait]
pub trait Database: Send + Sync {
    /// Verify the connection is usable
    async fn ping(&self) -> DbResult<()>;

    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Start a transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Columns of a table in ordinal order, or `None` when it does not exist
    async fn describe_table(&self, name: &str) -> DbResult<Option<Vec<ColumnInfo>>>;

    /// Check if a table has a column
    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        Ok(self
            .describe_table(table)
            .await?
            .is_some_and(|cols| cols.iter().any(|c| c.name == column)))
    }

    /// Check if an index exists
    async fn index_exists(&self, name: &str) -> DbResult<bool>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Execute a query and return every row, each value rendered as text
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;
}
