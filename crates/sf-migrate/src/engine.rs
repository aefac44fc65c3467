//! Execution engine: applies and reverts change units.
//!
//! Every unit runs in its own transaction. The ledger row is inserted first,
//! as a claim, then the unit's operations run, then the transaction commits.
//! A runner that loses a race for a unit therefore fails on the claim and
//! never executes that unit's `up`.

use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use crate::ops::apply_all;
use sf_core::{ChangeUnit, UnitName};
use sf_db::Database;
use std::collections::VecDeque;

/// Applies pending units and reverts applied ones against a ledger
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    ledger: &'a Ledger,
}

impl<'a> Engine<'a> {
    /// Engine recording into `ledger`
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Apply `pending` in order, one transaction per unit.
    ///
    /// Returns the names this call applied. Units another runner records
    /// while this one is working are skipped. Any other failure rolls back
    /// the failing unit and halts with [`MigrateError::MigrationFailed`];
    /// units committed before it stay applied.
    pub async fn apply_pending(
        &self,
        db: &dyn Database,
        pending: &[&ChangeUnit],
    ) -> MigrateResult<Vec<UnitName>> {
        let mut last_applied = self.ledger.applied_names(db).await?.pop_last();
        let mut remaining: VecDeque<&ChangeUnit> = pending.iter().copied().collect();
        let mut applied = Vec::new();

        while let Some(unit) = remaining.pop_front() {
            match self.apply_one(db, unit).await {
                Ok(()) => {
                    log::info!("Applied {}", unit.name());
                    last_applied = Some(unit.name().clone());
                    applied.push(unit.name().clone());
                }
                Err(MigrateError::AlreadyRecorded(name)) => {
                    log::warn!("{name} was applied by another runner; re-checking pending units");
                    self.drop_applied(db, &mut remaining).await?;
                }
                Err(MigrateError::Database(cause)) => {
                    // A conflicting COMMIT means the claim raced a live transaction
                    if cause.is_conflict() && self.ledger.is_applied(db, unit.name()).await? {
                        log::warn!(
                            "{} was committed by another runner ({cause}); re-checking pending units",
                            unit.name()
                        );
                        self.drop_applied(db, &mut remaining).await?;
                        continue;
                    }
                    log::error!("Change unit {} failed: {cause}", unit.name());
                    return Err(MigrateError::MigrationFailed {
                        unit: unit.name().clone(),
                        last_applied,
                        cause,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        Ok(applied)
    }

    async fn apply_one(&self, db: &dyn Database, unit: &ChangeUnit) -> MigrateResult<()> {
        log::debug!("Applying {} ({} ops)", unit.name(), unit.up().len());
        db.begin().await?;
        let result = async {
            self.ledger.record_applied(db, unit).await?;
            apply_all(db, unit.up()).await?;
            Ok::<(), MigrateError>(())
        }
        .await;
        finish_transaction(db, result).await
    }

    async fn drop_applied(
        &self,
        db: &dyn Database,
        remaining: &mut VecDeque<&ChangeUnit>,
    ) -> MigrateResult<()> {
        let applied = self.ledger.applied_names(db).await?;
        remaining.retain(|unit| !applied.contains(unit.name()));
        Ok(())
    }

    /// Revert one applied unit: run its `down` and delete its ledger row in a
    /// single transaction.
    pub async fn revert(&self, db: &dyn Database, unit: &ChangeUnit) -> MigrateResult<()> {
        if !self.ledger.is_applied(db, unit.name()).await? {
            return Err(MigrateError::NotApplied(unit.name().to_string()));
        }

        log::debug!("Reverting {} ({} ops)", unit.name(), unit.down().len());
        db.begin().await?;
        let result = async {
            apply_all(db, unit.down()).await?;
            self.ledger.record_reverted(db, unit.name()).await?;
            Ok::<(), MigrateError>(())
        }
        .await;

        match finish_transaction(db, result).await {
            Ok(()) => {
                log::info!("Reverted {}", unit.name());
                Ok(())
            }
            Err(MigrateError::Database(cause)) => Err(MigrateError::RevertFailed {
                unit: unit.name().clone(),
                cause,
            }),
            Err(other) => Err(other),
        }
    }
}

/// Commit on success, roll back on failure.
///
/// A failed COMMIT is reported as the transaction's error after a
/// best-effort ROLLBACK.
pub(crate) async fn finish_transaction<T>(
    db: &dyn Database,
    result: MigrateResult<T>,
) -> MigrateResult<T> {
    match result {
        Ok(value) => {
            if let Err(commit_err) = db.commit().await {
                let _ = db.rollback().await;
                return Err(commit_err.into());
            }
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = db.rollback().await {
                log::warn!("ROLLBACK failed: {rollback_err}");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
