//! Applied-set ledger.
//!
//! One row per applied change unit in a single table, keyed by unit name:
//!
//! ```sql
//! CREATE TABLE sf_schema_ledger (
//!     name       VARCHAR PRIMARY KEY,
//!     applied_at TIMESTAMP NOT NULL,
//!     checksum   VARCHAR
//! );
//! ```
//!
//! Rows are written inside the unit's own transaction and removed only by
//! that unit's revert, so the table always equals the set of units whose
//! `up` fully ran. The primary key is what turns a racing second runner into
//! [`MigrateError::AlreadyRecorded`].

use crate::error::{MigrateError, MigrateResult};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sf_core::sql_utils::{quote_literal, quote_qualified, split_qualified_name};
use sf_core::{ChangeUnit, UnitName};
use sf_db::Database;
use std::collections::BTreeSet;

/// Default ledger table name
pub const DEFAULT_LEDGER_TABLE: &str = "sf_schema_ledger";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// Applied unit
    pub name: UnitName,
    /// When the unit's transaction recorded it (UTC)
    pub applied_at: NaiveDateTime,
    /// Unit checksum at apply time
    pub checksum: Option<String>,
}

/// Handle to the ledger table; every operation takes the database explicitly
#[derive(Debug, Clone)]
pub struct Ledger {
    table: String,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_TABLE)
    }
}

impl Ledger {
    /// Ledger stored in `table` (optionally schema-qualified)
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Configured table name
    pub fn table(&self) -> &str {
        &self.table
    }

    fn quoted(&self) -> String {
        quote_qualified(&self.table)
    }

    /// Create the ledger table (and its schema) when missing.
    pub async fn ensure_exists(&self, db: &dyn Database) -> MigrateResult<()> {
        if db.relation_exists(&self.table).await? {
            return Ok(());
        }
        if self.table.contains('.') {
            let (schema, _) = split_qualified_name(&self.table);
            db.create_schema_if_not_exists(schema).await?;
        }
        log::debug!("Creating ledger table {}", self.table);
        db.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                name       VARCHAR PRIMARY KEY,
                applied_at TIMESTAMP NOT NULL,
                checksum   VARCHAR
            )",
            self.quoted()
        ))
        .await?;
        Ok(())
    }

    /// All ledger rows, ordered by name
    pub async fn entries(&self, db: &dyn Database) -> MigrateResult<Vec<LedgerEntry>> {
        let rows = db
            .query_rows(&format!(
                "SELECT name, CAST(applied_at AS VARCHAR), checksum FROM {} ORDER BY name",
                self.quoted()
            ))
            .await?;
        rows.into_iter().map(parse_entry).collect()
    }

    /// Names of every applied unit
    pub async fn applied_names(&self, db: &dyn Database) -> MigrateResult<BTreeSet<UnitName>> {
        Ok(self
            .entries(db)
            .await?
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    /// The lexicographically greatest applied unit
    pub async fn latest(&self, db: &dyn Database) -> MigrateResult<Option<LedgerEntry>> {
        Ok(self.entries(db).await?.pop())
    }

    /// Whether `name` has a ledger row
    pub async fn is_applied(&self, db: &dyn Database, name: &str) -> MigrateResult<bool> {
        let count = db
            .query_count(&format!(
                "SELECT name FROM {} WHERE name = {}",
                self.quoted(),
                quote_literal(name)
            ))
            .await?;
        Ok(count > 0)
    }

    /// Insert the row for `unit`.
    ///
    /// Fails with [`MigrateError::AlreadyRecorded`] when the row exists or a
    /// concurrent transaction is writing it.
    pub async fn record_applied(&self, db: &dyn Database, unit: &ChangeUnit) -> MigrateResult<()> {
        let applied_at = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S%.6f");
        let sql = format!(
            "INSERT INTO {} (name, applied_at, checksum) VALUES ({}, TIMESTAMP '{}', {})",
            self.quoted(),
            quote_literal(unit.name()),
            applied_at,
            quote_literal(unit.checksum())
        );
        match db.execute(&sql).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_conflict() => Err(MigrateError::AlreadyRecorded(unit.name().clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the row for `name`; absent rows are not an error.
    pub async fn record_reverted(&self, db: &dyn Database, name: &UnitName) -> MigrateResult<()> {
        db.execute(&format!(
            "DELETE FROM {} WHERE name = {}",
            self.quoted(),
            quote_literal(name)
        ))
        .await?;
        Ok(())
    }
}

fn parse_entry(row: Vec<Option<String>>) -> MigrateResult<LedgerEntry> {
    let mut values = row.into_iter();
    let (Some(Some(name)), Some(Some(applied_at)), Some(checksum)) =
        (values.next(), values.next(), values.next())
    else {
        return Err(MigrateError::LedgerCorrupt(
            "row is missing name or applied_at".to_string(),
        ));
    };

    let name = UnitName::parse(name).map_err(MigrateError::LedgerCorrupt)?;
    let applied_at = NaiveDateTime::parse_from_str(&applied_at, TIMESTAMP_FORMAT).map_err(|e| {
        MigrateError::LedgerCorrupt(format!("{name}: bad applied_at '{applied_at}': {e}"))
    })?;

    Ok(LedgerEntry {
        name,
        applied_at,
        checksum,
    })
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
