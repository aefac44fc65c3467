//! Migration and seed orchestration for SchemaForge.
//!
//! Applies packaged change units to a database exactly once and in name
//! order, tracks them in an applied-set ledger table, reverses them on
//! request, and bootstraps seed rows once the schema is current.

pub mod credential;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod migrator;
pub mod ops;
pub mod seeder;

pub use credential::{hash_secret, verify_secret};
pub use discovery::{pending, pending_from_db};
pub use engine::Engine;
pub use error::{MigrateError, MigrateResult};
pub use ledger::{Ledger, LedgerEntry};
pub use migrator::{MigrateReport, Migrator, RunPhase, RunReport, UnitState, UnitStatus};
pub use seeder::{SeedReport, SeedSetReport, Seeder};
