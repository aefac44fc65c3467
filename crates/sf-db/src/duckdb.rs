//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::row_helpers::collect_rows;
use crate::traits::{ColumnInfo, Database};
use async_trait::async_trait;
use duckdb::Connection;
use sf_core::sql_utils::{escape_sql_string, quote_ident, split_qualified_name};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open a second connection to the same database.
    ///
    /// The clone has its own transaction state, so two clones behave like
    /// two independent runners against one database.
    pub fn try_clone(&self) -> DbResult<Self> {
        let conn = self
            .lock()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::classify(&e, sql))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::classify(&e, sql))
    }

    fn transaction_sync(&self, stmt: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(stmt).map_err(|e| match DbError::classify(&e, stmt) {
            DbError::WriteConflict(msg) => DbError::WriteConflict(msg),
            other => DbError::TransactionError(other.to_string()),
        })
    }

    /// Query count synchronously
    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({sql})"), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::classify(&e, sql))?;
        Ok(count as usize)
    }

    fn query_rows_sync(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(|e| DbError::classify(&e, sql))?;
        collect_rows(&mut stmt).map_err(|e| DbError::classify(&e, sql))
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = split_qualified_name(name);
        let sql = format!(
            "SELECT * FROM information_schema.tables WHERE table_schema = '{}' AND table_name = '{}'",
            escape_sql_string(schema),
            escape_sql_string(table)
        );
        Ok(self.query_count_sync(&sql)? > 0)
    }

    fn describe_table_sync(&self, name: &str) -> DbResult<Option<Vec<ColumnInfo>>> {
        let (schema, table) = split_qualified_name(name);
        let sql = format!(
            "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
             WHERE table_schema = '{}' AND table_name = '{}' ORDER BY ordinal_position",
            escape_sql_string(schema),
            escape_sql_string(table)
        );
        let rows = self.query_rows_sync(&sql)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let columns = rows
            .into_iter()
            .map(|row| {
                let mut values = row.into_iter();
                let mut next = || values.next().flatten().unwrap_or_default();
                ColumnInfo {
                    name: next(),
                    data_type: next(),
                    nullable: next() == "YES",
                }
            })
            .collect();
        Ok(Some(columns))
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn ping(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn begin(&self) -> DbResult<()> {
        self.transaction_sync("BEGIN TRANSACTION")
    }

    async fn commit(&self) -> DbResult<()> {
        self.transaction_sync("COMMIT")
    }

    async fn rollback(&self) -> DbResult<()> {
        self.transaction_sync("ROLLBACK")
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn describe_table(&self, name: &str) -> DbResult<Option<Vec<ColumnInfo>>> {
        self.describe_table_sync(name)
    }

    async fn index_exists(&self, name: &str) -> DbResult<bool> {
        let sql = format!(
            "SELECT * FROM duckdb_indexes() WHERE index_name = '{}'",
            escape_sql_string(name)
        );
        Ok(self.query_count_sync(&sql)? > 0)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>> {
        self.query_rows_sync(sql)
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        self.execute_sync(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
