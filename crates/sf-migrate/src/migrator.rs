//! Orchestrator: the invocation surface over catalog, ledger, engine and
//! seeder.
//!
//! `setup` drives the full run state machine:
//!
//! ```text
//! CheckingConnection -> DiscoveringPending -> NothingPending -> Seeding -> Done
//!                                          \-> Applying ------/
//!                                                  \-> Failed(unit)
//! ```

use crate::discovery::pending;
use crate::engine::Engine;
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::{Ledger, LedgerEntry};
use crate::seeder::{SeedReport, Seeder};
use chrono::NaiveDateTime;
use serde::Serialize;
use sf_core::{Catalog, ChangeUnit, Project, SeedSet, UnitName};
use sf_db::Database;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Phase of a `setup` run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    CheckingConnection,
    DiscoveringPending,
    NothingPending,
    Applying,
    Seeding,
    Done,
    Failed(UnitName),
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::CheckingConnection => f.write_str("checking connection"),
            RunPhase::DiscoveringPending => f.write_str("discovering pending units"),
            RunPhase::NothingPending => f.write_str("nothing pending"),
            RunPhase::Applying => f.write_str("applying"),
            RunPhase::Seeding => f.write_str("seeding"),
            RunPhase::Done => f.write_str("done"),
            RunPhase::Failed(unit) => write!(f, "failed at {unit}"),
        }
    }
}

/// Result of `migrate_up`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrateReport {
    /// Units applied by this call, in order
    pub applied: Vec<UnitName>,
    /// Units pending when the call started
    pub pending_before: usize,
}

/// Result of a successful `setup`
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Phases visited, in order
    pub phases: Vec<RunPhase>,
    /// Units applied by this run
    pub applied: Vec<UnitName>,
    /// Seeding outcome
    pub seeds: SeedReport,
    /// Every seed key was already present, so no seed set was applied
    pub seeds_already_present: bool,
}

/// State of one unit relative to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitState {
    /// Recorded, checksum matches
    Applied { applied_at: NaiveDateTime },
    /// Not recorded
    Pending,
    /// Recorded with a different checksum than the packaged unit
    Modified { applied_at: NaiveDateTime },
    /// Recorded but not packaged
    Orphaned { applied_at: NaiveDateTime },
}

impl UnitState {
    /// Short label used in tables
    pub fn label(&self) -> &'static str {
        match self {
            UnitState::Applied { .. } => "applied",
            UnitState::Pending => "pending",
            UnitState::Modified { .. } => "modified",
            UnitState::Orphaned { .. } => "orphaned",
        }
    }

    /// When the unit was recorded, if it was
    pub fn applied_at(&self) -> Option<NaiveDateTime> {
        match self {
            UnitState::Applied { applied_at }
            | UnitState::Modified { applied_at }
            | UnitState::Orphaned { applied_at } => Some(*applied_at),
            UnitState::Pending => None,
        }
    }
}

/// One row of `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitStatus {
    pub name: UnitName,
    #[serde(flatten)]
    pub state: UnitState,
}

/// Migration and seed orchestrator
#[derive(Debug, Clone)]
pub struct Migrator {
    catalog: Catalog,
    ledger: Ledger,
    seeds: Vec<SeedSet>,
    verify_checksums: bool,
}

impl Migrator {
    /// Orchestrator over an explicit catalog, ledger and seed list
    pub fn new(catalog: Catalog, ledger: Ledger, seeds: Vec<SeedSet>) -> Self {
        Self {
            catalog,
            ledger,
            seeds,
            verify_checksums: true,
        }
    }

    /// Orchestrator for a loaded project
    pub fn from_project(project: &Project) -> Self {
        Self::new(
            project.catalog.clone(),
            Ledger::new(project.config.ledger.table.clone()),
            project.seeds.clone(),
        )
        .verify_checksums(project.config.ledger.verify_checksums)
    }

    /// Enable or disable the checksum drift check
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn seeds(&self) -> &[SeedSet] {
        &self.seeds
    }

    /// Apply every pending unit.
    pub async fn migrate_up(&self, db: &dyn Database) -> MigrateResult<MigrateReport> {
        let pending = self.discover(db).await?;
        let pending_before = pending.len();
        if pending.is_empty() {
            log::info!("Schema is up to date");
            return Ok(MigrateReport::default());
        }

        log::info!("{pending_before} change unit(s) pending");
        let applied = Engine::new(&self.ledger).apply_pending(db, &pending).await?;
        Ok(MigrateReport {
            applied,
            pending_before,
        })
    }

    /// Revert `name`, or the greatest applied unit when `name` is `None`.
    ///
    /// The ledger is consulted before the catalog: a name with no ledger row
    /// is `NotApplied` whether or not it is packaged, and `UnknownUnit` is
    /// left for applied rows whose unit is no longer packaged.
    pub async fn migrate_down(
        &self,
        db: &dyn Database,
        name: Option<&str>,
    ) -> MigrateResult<UnitName> {
        self.ledger.ensure_exists(db).await?;

        let target = match name {
            Some(name) => {
                if !self.ledger.is_applied(db, name).await? {
                    return Err(MigrateError::NotApplied(name.to_string()));
                }
                name.to_string()
            }
            None => self
                .ledger
                .latest(db)
                .await?
                .ok_or(MigrateError::NothingApplied)?
                .name
                .into_inner(),
        };
        let unit = self
            .catalog
            .get(&target)
            .ok_or_else(|| MigrateError::UnknownUnit(target.clone()))?;

        Engine::new(&self.ledger).revert(db, unit).await?;
        Ok(unit.name().clone())
    }

    /// Apply seed sets; requires a fully migrated schema.
    pub async fn seed(&self, db: &dyn Database) -> MigrateResult<SeedReport> {
        self.ledger.ensure_exists(db).await?;
        let applied = self.ledger.applied_names(db).await?;
        let pending = pending(&self.catalog, &applied);
        if !pending.is_empty() {
            return Err(MigrateError::SchemaNotCurrent {
                pending: pending.iter().map(|u| u.name().clone()).collect(),
            });
        }
        Seeder.apply(db, &self.seeds).await
    }

    /// Every catalog unit with its ledger state, followed by orphaned ledger
    /// rows.
    pub async fn status(&self, db: &dyn Database) -> MigrateResult<Vec<UnitStatus>> {
        self.ledger.ensure_exists(db).await?;
        let entries = self.ledger.entries(db).await?;
        let by_name: HashMap<&UnitName, &LedgerEntry> =
            entries.iter().map(|e| (&e.name, e)).collect();

        let mut statuses: Vec<UnitStatus> = self
            .catalog
            .list()
            .iter()
            .map(|unit| {
                let state = match by_name.get(unit.name()) {
                    None => UnitState::Pending,
                    Some(entry) if is_modified(entry, unit) => UnitState::Modified {
                        applied_at: entry.applied_at,
                    },
                    Some(entry) => UnitState::Applied {
                        applied_at: entry.applied_at,
                    },
                };
                UnitStatus {
                    name: unit.name().clone(),
                    state,
                }
            })
            .collect();

        statuses.extend(
            entries
                .iter()
                .filter(|e| self.catalog.get(&e.name).is_none())
                .map(|e| UnitStatus {
                    name: e.name.clone(),
                    state: UnitState::Orphaned {
                        applied_at: e.applied_at,
                    },
                }),
        );
        Ok(statuses)
    }

    /// Run the full state machine: connect, migrate, seed.
    pub async fn setup(&self, db: &dyn Database) -> MigrateResult<RunReport> {
        let mut report = RunReport::default();

        enter(&mut report, RunPhase::CheckingConnection);
        db.ping()
            .await
            .map_err(|e| MigrateError::ConnectionUnavailable(e.to_string()))?;

        enter(&mut report, RunPhase::DiscoveringPending);
        let pending = self.discover(db).await?;

        if pending.is_empty() {
            enter(&mut report, RunPhase::NothingPending);
        } else {
            enter(&mut report, RunPhase::Applying);
            match Engine::new(&self.ledger).apply_pending(db, &pending).await {
                Ok(applied) => report.applied = applied,
                Err(e) => {
                    if let MigrateError::MigrationFailed { unit, .. } = &e {
                        enter(&mut report, RunPhase::Failed(unit.clone()));
                    }
                    return Err(e);
                }
            }
        }

        enter(&mut report, RunPhase::Seeding);
        if Seeder.seed_completed(db, &self.seeds).await? {
            log::info!("Seed data already present");
            report.seeds_already_present = true;
        } else {
            report.seeds = self.seed(db).await?;
        }

        enter(&mut report, RunPhase::Done);
        Ok(report)
    }

    /// Ensure the ledger, check for drift, and compute the pending units.
    async fn discover(&self, db: &dyn Database) -> MigrateResult<Vec<&ChangeUnit>> {
        self.ledger.ensure_exists(db).await?;
        let entries = self.ledger.entries(db).await?;
        if self.verify_checksums {
            self.check_checksums(&entries)?;
        }
        let applied: BTreeSet<UnitName> = entries.into_iter().map(|e| e.name).collect();
        Ok(pending(&self.catalog, &applied))
    }

    fn check_checksums(&self, entries: &[LedgerEntry]) -> MigrateResult<()> {
        for entry in entries {
            let Some(unit) = self.catalog.get(&entry.name) else {
                log::warn!("Ledger entry {} has no packaged change unit", entry.name);
                continue;
            };
            if is_modified(entry, unit) {
                return Err(MigrateError::UnitModified {
                    unit: entry.name.clone(),
                    stored: entry.checksum.clone().unwrap_or_default(),
                    current: unit.checksum().to_string(),
                });
            }
        }
        Ok(())
    }
}

fn is_modified(entry: &LedgerEntry, unit: &ChangeUnit) -> bool {
    entry
        .checksum
        .as_deref()
        .is_some_and(|stored| stored != unit.checksum())
}

fn enter(report: &mut RunReport, phase: RunPhase) {
    match report.phases.last() {
        Some(previous) => log::info!("Setup: {previous} -> {phase}"),
        None => log::info!("Setup: {phase}"),
    }
    report.phases.push(phase);
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
