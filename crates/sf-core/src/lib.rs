//! sf-core - Core library for SchemaForge
//!
//! This crate provides the change unit contract, catalog discovery, seed set
//! definitions, and project configuration shared by the migration engine and
//! the CLI.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;
mod newtype_string;
pub mod project;
pub mod seed;
pub(crate) mod serde_helpers;
pub mod sql_utils;
pub mod unit;
pub mod unit_name;

pub use catalog::Catalog;
pub use checksum::compute_checksum;
pub use config::{Config, DatabaseConfig, LedgerConfig};
pub use error::{CoreError, CoreResult};
pub use project::Project;
pub use seed::{discover_seeds, SecretSource, SeedRow, SeedSet, SeedValue};
pub use unit::{ChangeUnit, ColumnDef, SchemaOp, UnitDefinition};
pub use unit_name::UnitName;
