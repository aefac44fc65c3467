//! Shared utilities for CLI commands

use anyhow::Result;
use sf_core::{Config, Project};
use sf_db::DuckDbBackend;
use sf_migrate::{MigrateError, Migrator};
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Exit status for failures not covered below.
pub(crate) const EXIT_FAILURE: i32 = 1;
/// The database could not be opened or pinged.
pub(crate) const EXIT_CONNECTION: i32 = 2;
/// Config, catalog or seed files are missing or malformed.
pub(crate) const EXIT_PROJECT: i32 = 3;
/// A change unit failed to apply or revert.
pub(crate) const EXIT_MIGRATION: i32 = 4;
/// The requested unit is unknown or not applied.
pub(crate) const EXIT_NOT_APPLIED: i32 = 5;
/// Seeding was requested with units still pending.
pub(crate) const EXIT_SCHEMA_NOT_CURRENT: i32 = 6;
/// An applied unit was edited after it ran.
pub(crate) const EXIT_UNIT_MODIFIED: i32 = 7;
/// A seed row could not be written.
pub(crate) const EXIT_SEED: i32 = 8;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism and the
        // message has already been printed by the command.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit status for a migration error.
pub(crate) fn exit_code_for(err: &MigrateError) -> i32 {
    match err {
        MigrateError::ConnectionUnavailable(_) => EXIT_CONNECTION,
        MigrateError::Core(_) => EXIT_PROJECT,
        MigrateError::MigrationFailed { .. }
        | MigrateError::AlreadyRecorded(_)
        | MigrateError::RevertFailed { .. } => EXIT_MIGRATION,
        MigrateError::NotApplied(_)
        | MigrateError::UnknownUnit(_)
        | MigrateError::NothingApplied => EXIT_NOT_APPLIED,
        MigrateError::SchemaNotCurrent { .. } => EXIT_SCHEMA_NOT_CURRENT,
        MigrateError::UnitModified { .. } => EXIT_UNIT_MODIFIED,
        MigrateError::SeedFailed { .. } => EXIT_SEED,
        MigrateError::LedgerCorrupt(_) | MigrateError::Database(_) => EXIT_FAILURE,
    }
}

/// Print a migration error and convert it into the matching [`ExitCode`].
///
/// For a failed run the last applied unit and the failing unit are printed
/// on their own lines so scripts can pick them up.
pub(crate) fn report_failure(err: MigrateError) -> anyhow::Error {
    eprintln!("Error: {err}");
    match &err {
        MigrateError::MigrationFailed {
            unit, last_applied, ..
        } => {
            eprintln!(
                "  last applied: {}",
                last_applied.as_deref().unwrap_or("(none)")
            );
            eprintln!("  failed unit:  {unit}");
        }
        MigrateError::SchemaNotCurrent { .. } => {
            eprintln!("  Run `sf migrate-up` first.");
        }
        _ => {}
    }
    ExitCode(exit_code_for(&err)).into()
}

/// Load a project from the directory specified in global CLI arguments.
///
/// Honors `--config`; a project that cannot be loaded exits with
/// [`EXIT_PROJECT`].
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = Path::new(&global.project_dir);
    let loaded = match &global.config {
        Some(config_path) => Project::load_with_config_file(root, Path::new(config_path)),
        None => Project::load(root),
    };
    loaded.map_err(|e| {
        eprintln!("Error: Failed to load project: {e}");
        ExitCode(EXIT_PROJECT).into()
    })
}

/// Open the database selected by `--database`, `SF_DATABASE`, `--target` /
/// `SF_TARGET`, or the base config, in that order.
pub(crate) fn open_database(project: &Project, global: &GlobalArgs) -> Result<DuckDbBackend> {
    let target = Config::resolve_target(global.target.as_deref());
    let path = project
        .config
        .resolve_database_path(&project.root, global.database.as_deref(), target.as_deref())
        .map_err(|e| {
            eprintln!("Error: {e}");
            anyhow::Error::from(ExitCode(EXIT_PROJECT))
        })?;

    log::debug!("Opening database {path}");
    DuckDbBackend::new(&path).map_err(|e| {
        eprintln!("Error: Failed to connect to database {path}: {e}");
        ExitCode(EXIT_CONNECTION).into()
    })
}

/// Load the project, open its database and build the orchestrator.
pub(crate) fn prepare(global: &GlobalArgs) -> Result<(Project, DuckDbBackend, Migrator)> {
    let project = load_project(global)?;
    let db = open_database(&project, global)?;
    let migrator = Migrator::from_project(&project);
    Ok((project, db, migrator))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
