//! sf-sql - SQL parsing layer for SchemaForge
//!
//! Parses change unit SQL with sqlparser-rs so that malformed units are
//! rejected when the catalog is loaded rather than halfway through a run.

pub mod dialect;
pub mod error;
pub mod parser;
pub mod validator;

pub use dialect::{DuckDbDialect, SqlDialect};
pub use error::SqlError;
pub use parser::SqlParser;
pub use validator::validate_unit_sql;
