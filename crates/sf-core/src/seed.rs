//! Seed set representation and discovery
//!
//! A seed set is a YAML file describing fixed reference rows for one table,
//! identified by a natural key column:
//!
//! ```yaml
//! table: users
//! key: email
//! rows:
//!   - email: admin@example.com
//!     role: admin
//!     password_hash: { secret_env: SF_ADMIN_PASSWORD }
//! ```
//!
//! Rows are only ever inserted when no row with the same key exists.

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::{is_simple_identifier, quote_literal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Source of a secret value that must be stored hashed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    /// Plaintext given inline
    Secret(String),
    /// Plaintext read from an environment variable at seed time
    SecretEnv(String),
}

impl SecretSource {
    /// Resolve the plaintext for `column`.
    pub fn resolve(&self, column: &str) -> CoreResult<String> {
        let plaintext = match self {
            SecretSource::Secret(value) => value.clone(),
            SecretSource::SecretEnv(var) => {
                std::env::var(var).map_err(|_| CoreError::SecretUnavailable {
                    column: column.to_string(),
                    reason: format!("environment variable {var} is not set"),
                })?
            }
        };
        if plaintext.is_empty() {
            return Err(CoreError::SecretUnavailable {
                column: column.to_string(),
                reason: "secret is empty".to_string(),
            });
        }
        Ok(plaintext)
    }
}

/// A single column value in a seed row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Secret(SecretSource),
}

impl SeedValue {
    /// Render the value as a SQL literal.
    ///
    /// Secrets have no literal form; callers hash them first.
    pub fn to_sql_literal(&self) -> Option<String> {
        match self {
            SeedValue::Null => Some("NULL".to_string()),
            SeedValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            SeedValue::Int(i) => Some(i.to_string()),
            SeedValue::Float(f) if f.is_finite() => Some(f.to_string()),
            SeedValue::Float(_) => None,
            SeedValue::Text(s) => Some(quote_literal(s)),
            SeedValue::Secret(_) => None,
        }
    }

    /// Whether this value can identify a row (non-null literal)
    pub fn is_key_value(&self) -> bool {
        !matches!(self, SeedValue::Null | SeedValue::Secret(_)) && self.to_sql_literal().is_some()
    }
}

impl fmt::Display for SeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedValue::Null => f.write_str("null"),
            SeedValue::Bool(b) => write!(f, "{b}"),
            SeedValue::Int(i) => write!(f, "{i}"),
            SeedValue::Float(x) => write!(f, "{x}"),
            SeedValue::Text(s) => f.write_str(s),
            SeedValue::Secret(_) => f.write_str("<secret>"),
        }
    }
}

/// One seed row: column name to value, in column-name order
pub type SeedRow = BTreeMap<String, SeedValue>;

/// On-disk shape of a seed file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    table: String,
    key: String,
    #[serde(default)]
    description: Option<String>,
    rows: Vec<SeedRow>,
}

/// A named set of seed rows for one table
#[derive(Debug, Clone)]
pub struct SeedSet {
    /// Seed name (file stem)
    pub name: String,

    /// Target table, optionally schema-qualified
    pub table: String,

    /// Natural key column used to detect existing rows
    pub key: String,

    /// Optional description
    pub description: Option<String>,

    /// Rows to insert when absent
    pub rows: Vec<SeedRow>,

    /// File the set was loaded from
    pub path: Option<PathBuf>,
}

impl SeedSet {
    /// Build and validate a seed set.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        key: impl Into<String>,
        rows: Vec<SeedRow>,
    ) -> CoreResult<Self> {
        let set = Self {
            name: name.into(),
            table: table.into(),
            key: key.into(),
            description: None,
            rows,
            path: None,
        };
        set.validate()?;
        Ok(set)
    }

    /// Load a seed set from a YAML file; the name is the file stem.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let invalid = |reason: String| CoreError::InvalidSeed {
            path: path.display().to_string(),
            reason,
        };
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| invalid("invalid file name".to_string()))?
            .to_string();
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: SeedFile = serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        let set = Self {
            name,
            table: file.table,
            key: file.key,
            description: file.description,
            rows: file.rows,
            path: Some(path.to_path_buf()),
        };
        set.validate()?;
        Ok(set)
    }

    /// The natural key value of `row`.
    ///
    /// Validation guarantees every row has one.
    pub fn key_of<'a>(&self, row: &'a SeedRow) -> Option<&'a SeedValue> {
        row.get(&self.key)
    }

    /// Distinct natural key values, in row order (first occurrence wins)
    ///
    /// Keys are compared by their SQL literal, so `1` and `'1'` are distinct.
    pub fn key_values(&self) -> Vec<&SeedValue> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| self.key_of(row))
            .filter(|v| v.to_sql_literal().is_some_and(|lit| seen.insert(lit)))
            .collect()
    }

    fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: String| CoreError::InvalidSeed {
            path: self
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| self.name.clone()),
            reason,
        };

        if !is_simple_identifier(&self.table) {
            return Err(invalid(format!("invalid table name '{}'", self.table)));
        }
        if self.key.trim().is_empty() {
            return Err(invalid("key column is empty".to_string()));
        }
        for (i, row) in self.rows.iter().enumerate() {
            match row.get(&self.key) {
                Some(v) if v.is_key_value() => {}
                Some(_) => {
                    return Err(invalid(format!(
                        "row {} has a null or secret value for key column '{}'",
                        i + 1,
                        self.key
                    )))
                }
                None => {
                    return Err(invalid(format!(
                        "row {} is missing key column '{}'",
                        i + 1,
                        self.key
                    )))
                }
            }
            if let Some(col) = row.keys().find(|c| c.trim().is_empty()) {
                return Err(invalid(format!("row {} has an empty column name '{col}'", i + 1)));
            }
            if let Some((col, _)) = row
                .iter()
                .find(|(_, v)| matches!(v, SeedValue::Float(f) if !f.is_finite()))
            {
                return Err(invalid(format!(
                    "row {} column '{col}' is not a finite number",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

/// Discover all seed sets in the given paths, sorted by name
///
/// Missing directories are skipped: seeding is optional.
pub fn discover_seeds(seed_paths: &[PathBuf]) -> CoreResult<Vec<SeedSet>> {
    let mut seeds: Vec<SeedSet> = Vec::new();

    for seed_path in seed_paths {
        if !seed_path.exists() {
            log::debug!("Seed path {} does not exist, skipping", seed_path.display());
            continue;
        }

        let entries = std::fs::read_dir(seed_path).map_err(|e| CoreError::IoWithPath {
            path: seed_path.display().to_string(),
            source: e,
        })?;
        for entry in entries {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .is_some_and(|e| e == "yml" || e == "yaml");
            if path.is_file() && is_yaml {
                seeds.push(SeedSet::load(&path)?);
            }
        }
    }

    seeds.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(pair) = seeds.windows(2).find(|w| w[0].name == w[1].name) {
        return Err(CoreError::InvalidSeed {
            path: pair[1]
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            reason: format!("duplicate seed name '{}'", pair[1].name),
        });
    }
    Ok(seeds)
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
