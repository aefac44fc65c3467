//! Seed applier.
//!
//! Rows are inserted only when no row with the same natural key exists; an
//! existing row is left untouched, even when its other columns differ. Each
//! seed set is written in its own transaction, so a failing row leaves that
//! set exactly as it was before the call.

use crate::credential::hash_secret;
use crate::engine::finish_transaction;
use crate::error::{MigrateError, MigrateResult};
use serde::Serialize;
use sf_core::sql_utils::{quote_ident, quote_literal, quote_qualified};
use sf_core::{SeedRow, SeedSet, SeedValue};
use sf_db::Database;

/// Outcome of one seed set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSetReport {
    /// Seed set name
    pub name: String,
    /// Target table
    pub table: String,
    /// Rows inserted by this call
    pub inserted: usize,
    /// Rows skipped because their key already existed
    pub skipped: usize,
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Per-set results, in application order
    pub sets: Vec<SeedSetReport>,
}

impl SeedReport {
    /// Total rows inserted
    pub fn inserted(&self) -> usize {
        self.sets.iter().map(|s| s.inserted).sum()
    }

    /// Total rows skipped
    pub fn skipped(&self) -> usize {
        self.sets.iter().map(|s| s.skipped).sum()
    }
}

/// Applies seed sets with an existence check before every insert
#[derive(Debug, Clone, Copy, Default)]
pub struct Seeder;

impl Seeder {
    /// Apply every seed set in order.
    pub async fn apply(&self, db: &dyn Database, seeds: &[SeedSet]) -> MigrateResult<SeedReport> {
        let mut report = SeedReport::default();
        for set in seeds {
            db.begin().await?;
            let result = self.apply_set(db, set).await;
            let set_report = finish_transaction(db, result).await?;
            log::info!(
                "Seed {}: {} inserted, {} already present",
                set.name,
                set_report.inserted,
                set_report.skipped
            );
            report.sets.push(set_report);
        }
        Ok(report)
    }

    async fn apply_set(&self, db: &dyn Database, set: &SeedSet) -> MigrateResult<SeedSetReport> {
        let mut report = SeedSetReport {
            name: set.name.clone(),
            table: set.table.clone(),
            ..Default::default()
        };

        for row in &set.rows {
            let Some(key) = set.key_of(row) else {
                continue;
            };
            let failed = |cause: String| MigrateError::SeedFailed {
                seed: set.name.clone(),
                key: key.to_string(),
                cause,
            };

            let exists = row_exists(db, set, key)
                .await
                .map_err(|e| failed(e.to_string()))?;
            if exists {
                log::debug!("Seed {}: {} = {} exists, skipping", set.name, set.key, key);
                report.skipped += 1;
                continue;
            }

            let sql = insert_sql(set, row).map_err(&failed)?;
            db.execute(&sql).await.map_err(|e| failed(e.to_string()))?;
            report.inserted += 1;
        }

        Ok(report)
    }

    /// Whether every well-known key of every set is already present.
    ///
    /// False when a target table does not exist yet.
    pub async fn seed_completed(&self, db: &dyn Database, seeds: &[SeedSet]) -> MigrateResult<bool> {
        for set in seeds {
            if !db.relation_exists(&set.table).await? {
                return Ok(false);
            }
            for key in set.key_values() {
                if !row_exists(db, set, key).await? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

async fn row_exists(db: &dyn Database, set: &SeedSet, key: &SeedValue) -> MigrateResult<bool> {
    let literal = key.to_sql_literal().ok_or_else(|| MigrateError::SeedFailed {
        seed: set.name.clone(),
        key: key.to_string(),
        cause: "key has no SQL literal form".to_string(),
    })?;
    let count = db
        .query_count(&format!(
            "SELECT 1 FROM {} WHERE {} = {}",
            quote_qualified(&set.table),
            quote_ident(&set.key),
            literal
        ))
        .await?;
    Ok(count > 0)
}

fn insert_sql(set: &SeedSet, row: &SeedRow) -> Result<String, String> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (column, value) in row {
        let literal = match value {
            SeedValue::Secret(source) => {
                let plaintext = source.resolve(column).map_err(|e| e.to_string())?;
                quote_literal(&hash_secret(&plaintext))
            }
            other => other
                .to_sql_literal()
                .ok_or_else(|| format!("column {column}: value {other} has no SQL literal form"))?,
        };
        columns.push(quote_ident(column));
        values.push(literal);
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_qualified(&set.table),
        columns.join(", "),
        values.join(", ")
    ))
}

#[cfg(test)]
#[path = "seeder_test.rs"]
mod tests;
