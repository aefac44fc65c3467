//! sf-db - Database abstraction layer for SchemaForge
//!
//! This crate provides the `Database` trait used by the migration engine and
//! its embedded DuckDB implementation.

pub mod duckdb;
pub mod error;
pub(crate) mod row_helpers;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{ColumnInfo, Database};
