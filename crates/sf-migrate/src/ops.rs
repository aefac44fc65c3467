//! Conditional execution of schema operations.
//!
//! Each declarative operation inspects the live schema first and only
//! mutates when the change is not already in place, so re-running a unit
//! whose earlier attempt partially landed is safe. Raw `sql` operations run
//! as written.

use sf_core::SchemaOp;
use sf_db::{Database, DbError, DbResult};

/// Outcome of a single operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    /// The operation changed the schema
    Applied,
    /// The target state already held; nothing was executed
    AlreadyInPlace,
}

/// Apply `op` against `db`, checking the current schema first.
pub async fn apply_op(db: &dyn Database, op: &SchemaOp) -> DbResult<OpOutcome> {
    let in_place = match op {
        SchemaOp::CreateTable { table, .. } => db.relation_exists(table).await?,
        SchemaOp::DropTable { table } => !db.relation_exists(table).await?,
        SchemaOp::AddColumn { table, column } => match db.describe_table(table).await? {
            Some(columns) => columns.iter().any(|c| c.name == column.name),
            None => return Err(DbError::TableNotFound(table.clone())),
        },
        SchemaOp::DropColumn { table, column } => !db.column_exists(table, column).await?,
        SchemaOp::CreateIndex { name, .. } => db.index_exists(name).await?,
        SchemaOp::DropIndex { name } => !db.index_exists(name).await?,
        SchemaOp::Sql { .. } => false,
    };

    if in_place {
        log::debug!("Skipping {}: already in place", op.describe());
        return Ok(OpOutcome::AlreadyInPlace);
    }

    let sql = op.to_sql();
    log::debug!("Executing {}: {}", op.describe(), sql);
    db.execute_batch(&sql).await?;
    Ok(OpOutcome::Applied)
}

/// Apply every op in order, returning how many changed the schema.
pub async fn apply_all(db: &dyn Database, ops: &[SchemaOp]) -> DbResult<usize> {
    let mut applied = 0;
    for op in ops {
        if apply_op(db, op).await? == OpOutcome::Applied {
            applied += 1;
        }
    }
    Ok(applied)
}

#[cfg(test)]
#[path = "ops_test.rs"]
mod tests;
