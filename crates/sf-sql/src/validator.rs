//! Validation of change unit SQL
//!
//! The execution engine owns the transaction around every unit, so unit SQL
//! may not open, commit or roll back transactions itself.

use crate::error::{SqlError, SqlResult};
use crate::parser::SqlParser;
use sqlparser::ast::Statement;

/// Validate the SQL of one side (`up` or `down`) of a change unit.
///
/// Returns the number of statements on success.
pub fn validate_unit_sql(sql: &str) -> SqlResult<usize> {
    let stmts = SqlParser::duckdb().parse(sql)?;
    for stmt in &stmts {
        if let Some(kind) = transaction_control_kind(stmt) {
            return Err(SqlError::TransactionControl(kind.to_string()));
        }
    }
    Ok(stmts.len())
}

fn transaction_control_kind(stmt: &Statement) -> Option<&'static str> {
    match stmt {
        Statement::StartTransaction { .. } => Some("BEGIN"),
        Statement::Commit { .. } => Some("COMMIT"),
        Statement::Rollback { .. } => Some("ROLLBACK"),
        Statement::Savepoint { .. } => Some("SAVEPOINT"),
        Statement::ReleaseSavepoint { .. } => Some("RELEASE SAVEPOINT"),
        _ => None,
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
