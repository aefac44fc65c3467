//! Error types for the migration engine.

use sf_core::{CoreError, UnitName};
use sf_db::DbError;
use thiserror::Error;

/// Migration, revert and seeding errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The database cannot be reached (M001).
    #[error("[M001] Database connection unavailable: {0}")]
    ConnectionUnavailable(String),

    /// Catalog, seed or configuration problem (M002).
    #[error("[M002] {0}")]
    Core(#[from] CoreError),

    /// A unit's `up` or its ledger claim failed; the run halted (M003).
    #[error(
        "[M003] Change unit {unit} failed (last applied: {}): {cause}",
        .last_applied.as_deref().unwrap_or("none")
    )]
    MigrationFailed {
        unit: UnitName,
        last_applied: Option<UnitName>,
        #[source]
        cause: DbError,
    },

    /// Another runner recorded the unit first (M004).
    #[error("[M004] Change unit {0} is already recorded in the ledger")]
    AlreadyRecorded(UnitName),

    /// Revert requested for a unit with no ledger entry (M005).
    #[error("[M005] Change unit {0} is not applied")]
    NotApplied(String),

    /// Applied unit no longer present in the catalog (M006).
    #[error("[M006] Unknown change unit: {0}")]
    UnknownUnit(String),

    /// A unit's `down` or its ledger removal failed (M007).
    #[error("[M007] Reverting change unit {unit} failed: {cause}")]
    RevertFailed {
        unit: UnitName,
        #[source]
        cause: DbError,
    },

    /// Seeding requested while units are still pending (M008).
    #[error(
        "[M008] Schema is not current; pending change units: {}",
        .pending.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ")
    )]
    SchemaNotCurrent { pending: Vec<UnitName> },

    /// An applied unit was edited after it ran (M009).
    #[error("[M009] Change unit {unit} was modified after being applied (ledger checksum {stored}, current {current})")]
    UnitModified {
        unit: UnitName,
        stored: String,
        current: String,
    },

    /// A seed row could not be written (M010).
    #[error("[M010] Seed '{seed}' failed for key {key}: {cause}")]
    SeedFailed {
        seed: String,
        key: String,
        cause: String,
    },

    /// `migrate-down` without a name on an empty ledger (M011).
    #[error("[M011] No change units are applied")]
    NothingApplied,

    /// The ledger holds a row the engine cannot interpret (M012).
    #[error("[M012] Ledger table is corrupt: {0}")]
    LedgerCorrupt(String),

    /// Database error outside a unit boundary (M013).
    #[error("[M013] Database operation failed: {0}")]
    Database(#[from] DbError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
