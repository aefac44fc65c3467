//! Change units and the declarative schema operations they are built from.
//!
//! A [`ChangeUnit`] pairs a forward (`up`) and reverse (`down`) list of
//! [`SchemaOp`]s under a [`UnitName`]. Units are validated once, when they are
//! constructed, and are immutable afterwards: the fields are private and only
//! read accessors are exposed.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use crate::sql_utils::{quote_ident, quote_qualified};
use crate::unit_name::UnitName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Column definition used by `create_table` and `add_column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    /// Column name
    pub name: String,

    /// SQL data type (e.g. `VARCHAR`, `INTEGER`, `TIMESTAMP`)
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether NULL values are allowed
    #[serde(default = "default_true")]
    pub nullable: bool,

    /// Part of the primary key
    #[serde(default)]
    pub primary_key: bool,

    /// Single-column unique constraint
    #[serde(default)]
    pub unique: bool,

    /// Default value as a raw SQL expression
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnDef {
    /// A nullable column with no constraints.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
        }
    }

    /// Mark the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as (part of) the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Add a single-column unique constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a default value expression.
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Render the column for use inside `CREATE TABLE`.
    ///
    /// Primary keys are emitted as a table constraint by [`SchemaOp`], so only
    /// `NOT NULL`, `UNIQUE` and `DEFAULT` appear here.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.data_type);
        if !self.nullable && !self.primary_key {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("column name is empty".to_string());
        }
        if self.data_type.trim().is_empty() {
            return Err(format!("column '{}' has no type", self.name));
        }
        Ok(())
    }
}

/// One declarative schema operation.
///
/// Every operation except `sql` is conditional when applied: it inspects the
/// current schema first and only mutates when the change is not already in
/// place, which makes it safe to re-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaOp {
    /// Create a table if it does not exist
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    /// Drop a table if it exists
    DropTable { table: String },
    /// Add a column if the table does not have it yet
    AddColumn { table: String, column: ColumnDef },
    /// Drop a column if the table has it
    DropColumn { table: String, column: String },
    /// Create an index if it does not exist
    CreateIndex {
        name: String,
        table: String,
        columns: Vec<String>,
        #[serde(default)]
        unique: bool,
    },
    /// Drop an index if it exists
    DropIndex { name: String },
    /// Raw SQL batch, executed as-is
    Sql { sql: String },
}

impl SchemaOp {
    /// The unconditional SQL for this operation.
    pub fn to_sql(&self) -> String {
        match self {
            SchemaOp::CreateTable { table, columns } => {
                let mut defs: Vec<String> = columns.iter().map(ColumnDef::to_sql).collect();
                let pk: Vec<String> = columns
                    .iter()
                    .filter(|c| c.primary_key)
                    .map(|c| quote_ident(&c.name))
                    .collect();
                if !pk.is_empty() {
                    defs.push(format!("PRIMARY KEY ({})", pk.join(", ")));
                }
                format!(
                    "CREATE TABLE IF NOT EXISTS {} ({})",
                    quote_qualified(table),
                    defs.join(", ")
                )
            }
            SchemaOp::DropTable { table } => {
                format!("DROP TABLE IF EXISTS {}", quote_qualified(table))
            }
            SchemaOp::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_qualified(table),
                column.to_sql()
            ),
            SchemaOp::DropColumn { table, column } => format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quote_qualified(table),
                quote_ident(column)
            ),
            SchemaOp::CreateIndex {
                name,
                table,
                columns,
                unique,
            } => format!(
                "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
                if *unique { "UNIQUE " } else { "" },
                quote_ident(name),
                quote_qualified(table),
                columns
                    .iter()
                    .map(|c| quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            SchemaOp::DropIndex { name } => format!("DROP INDEX IF EXISTS {}", quote_ident(name)),
            SchemaOp::Sql { sql } => sql.trim().to_string(),
        }
    }

    /// Short human-readable summary for logs.
    pub fn describe(&self) -> String {
        match self {
            SchemaOp::CreateTable { table, .. } => format!("create table {table}"),
            SchemaOp::DropTable { table } => format!("drop table {table}"),
            SchemaOp::AddColumn { table, column } => {
                format!("add column {}.{}", table, column.name)
            }
            SchemaOp::DropColumn { table, column } => format!("drop column {table}.{column}"),
            SchemaOp::CreateIndex { name, .. } => format!("create index {name}"),
            SchemaOp::DropIndex { name } => format!("drop index {name}"),
            SchemaOp::Sql { .. } => "sql batch".to_string(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            SchemaOp::CreateTable { table, columns } => {
                require_name("table", table)?;
                if columns.is_empty() {
                    return Err(format!("create_table {table} has no columns"));
                }
                let mut seen = HashSet::new();
                for column in columns {
                    column.validate()?;
                    if !seen.insert(column.name.as_str()) {
                        return Err(format!(
                            "create_table {table} declares column '{}' twice",
                            column.name
                        ));
                    }
                }
                Ok(())
            }
            SchemaOp::DropTable { table } => require_name("table", table),
            SchemaOp::AddColumn { table, column } => {
                require_name("table", table)?;
                column.validate()?;
                // ALTER TABLE ... ADD COLUMN only accepts a DEFAULT clause
                if column.primary_key || column.unique || !column.nullable {
                    return Err(format!(
                        "add_column {}.{} may only carry a default, not key/unique/not-null constraints",
                        table, column.name
                    ));
                }
                Ok(())
            }
            SchemaOp::DropColumn { table, column } => {
                require_name("table", table)?;
                require_name("column", column)
            }
            SchemaOp::CreateIndex {
                name,
                table,
                columns,
                ..
            } => {
                require_name("index", name)?;
                require_name("table", table)?;
                if columns.is_empty() {
                    return Err(format!("create_index {name} has no columns"));
                }
                Ok(())
            }
            SchemaOp::DropIndex { name } => require_name("index", name),
            SchemaOp::Sql { sql } => sf_sql::validate_unit_sql(sql)
                .map(|_| ())
                .map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for SchemaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn require_name(what: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{what} name is empty"))
    } else {
        Ok(())
    }
}

/// On-disk shape of a declarative `unit.yml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitDefinition {
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Forward operations
    pub up: Vec<SchemaOp>,

    /// Reverse operations
    pub down: Vec<SchemaOp>,
}

/// An immutable, named schema change with forward and reverse operations
#[derive(Debug, Clone)]
pub struct ChangeUnit {
    name: UnitName,
    up: Vec<SchemaOp>,
    down: Vec<SchemaOp>,
    checksum: String,
    description: Option<String>,
    source: Option<PathBuf>,
}

impl ChangeUnit {
    /// Build a unit from operation lists, validating every operation.
    pub fn new(name: UnitName, up: Vec<SchemaOp>, down: Vec<SchemaOp>) -> CoreResult<Self> {
        let malformed = |reason: String| CoreError::MalformedUnit {
            name: name.to_string(),
            reason,
        };
        if up.is_empty() {
            return Err(malformed("up has no operations".to_string()));
        }
        if down.is_empty() {
            return Err(malformed("down has no operations".to_string()));
        }
        for op in &up {
            op.validate().map_err(|e| malformed(format!("up: {e}")))?;
        }
        for op in &down {
            op.validate().map_err(|e| malformed(format!("down: {e}")))?;
        }

        let checksum = unit_checksum(&up, &down);
        Ok(Self {
            name,
            up,
            down,
            checksum,
            description: None,
            source: None,
        })
    }

    /// Build a unit whose `up` and `down` are raw SQL batches.
    pub fn from_sql(name: UnitName, up_sql: &str, down_sql: &str) -> CoreResult<Self> {
        Self::new(
            name,
            vec![SchemaOp::Sql {
                sql: up_sql.to_string(),
            }],
            vec![SchemaOp::Sql {
                sql: down_sql.to_string(),
            }],
        )
    }

    /// Build a unit from a parsed `unit.yml`.
    pub fn from_definition(name: UnitName, def: UnitDefinition) -> CoreResult<Self> {
        let mut unit = Self::new(name, def.up, def.down)?;
        unit.description = def.description;
        Ok(unit)
    }

    /// Record where the unit was loaded from.
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    /// Unit name
    pub fn name(&self) -> &UnitName {
        &self.name
    }

    /// Forward operations
    pub fn up(&self) -> &[SchemaOp] {
        &self.up
    }

    /// Reverse operations
    pub fn down(&self) -> &[SchemaOp] {
        &self.down
    }

    /// SHA-256 over the canonical SQL of `up` and `down`
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Optional description from `unit.yml`
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Directory the unit was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn unit_checksum(up: &[SchemaOp], down: &[SchemaOp]) -> String {
    let mut canonical = String::from("-- up\n");
    for op in up {
        canonical.push_str(&op.to_sql());
        canonical.push_str(";\n");
    }
    canonical.push_str("-- down\n");
    for op in down {
        canonical.push_str(&op.to_sql());
        canonical.push_str(";\n");
    }
    compute_checksum(&canonical)
}

#[cfg(test)]
#[path = "unit_test.rs"]
mod tests;
