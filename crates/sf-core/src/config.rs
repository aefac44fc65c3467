//! Configuration types and parsing for schemaforge.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use crate::sql_utils::is_simple_identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable selecting a named target
pub const TARGET_ENV_VAR: &str = "SF_TARGET";

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "SF_DATABASE";

/// Config file names searched in a project directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["schemaforge.yml", "schemaforge.yaml"];

/// Main project configuration from schemaforge.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directories containing change unit folders
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<String>,

    /// Directories containing seed YAML files
    #[serde(default = "default_seed_paths")]
    pub seed_paths: Vec<String>,

    /// Applied-set ledger settings
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database location: `:memory:`, a file path, or `duckdb://<path>`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Resolve the configured location against the project root.
    ///
    /// Strips a `duckdb://` scheme and joins relative file paths onto `root`.
    /// `:memory:` is returned unchanged.
    pub fn resolve_path(&self, root: &Path) -> String {
        resolve_database_path(&self.path, root)
    }
}

/// Resolve a database location string against the project root.
pub fn resolve_database_path(raw: &str, root: &Path) -> String {
    let path = raw.strip_prefix("duckdb://").unwrap_or(raw);
    if path == MEMORY_DB_PATH {
        return path.to_string();
    }
    let p = Path::new(path);
    if p.is_absolute() {
        path.to_string()
    } else {
        root.join(p).display().to_string()
    }
}

/// Ledger table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Ledger table name, optionally schema-qualified
    #[serde(default = "default_ledger_table")]
    pub table: String,

    /// Refuse to migrate when an applied unit's checksum changed
    #[serde(default = "default_true")]
    pub verify_checksums: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            table: default_ledger_table(),
            verify_checksums: true,
        }
    }
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

const MEMORY_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    MEMORY_DB_PATH.to_string()
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations".to_string()]
}

fn default_seed_paths() -> Vec<String> {
    vec!["seeds".to_string()]
}

fn default_ledger_table() -> String {
    "sf_schema_ledger".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for schemaforge.yml or schemaforge.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for file_name in CONFIG_FILE_NAMES {
            let path = dir.join(file_name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migration_paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one migration_paths entry must be specified".to_string(),
            });
        }

        if !is_simple_identifier(&self.ledger.table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "ledger.table '{}' must be an identifier made of letters, digits and underscores (optionally schema-qualified)",
                    self.ledger.table
                ),
            });
        }

        for (name, target) in &self.targets {
            if let Some(db) = &target.database {
                if db.path.trim().is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: format!("Target '{name}' has an empty database path"),
                    });
                }
            }
        }

        Ok(())
    }

    /// Resolve relative path strings to absolute paths against a root directory
    fn paths_absolute(paths: &[String], root: &Path) -> Vec<PathBuf> {
        paths.iter().map(|p| root.join(p)).collect()
    }

    /// Get absolute migration paths relative to a project root
    pub fn migration_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        Self::paths_absolute(&self.migration_paths, root)
    }

    /// Get absolute seed paths relative to a project root
    pub fn seed_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        Self::paths_absolute(&self.seed_paths, root)
    }

    /// Get the list of available target names, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get database configuration, optionally applying target overrides
    ///
    /// If target is specified and exists, uses target's database config.
    /// Otherwise, uses the base database config.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Resolve target from CLI flag or SF_TARGET environment variable
    ///
    /// Priority: CLI flag > SF_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }

    /// Resolve the database location to connect to.
    ///
    /// Priority: CLI override > SF_DATABASE env var > target > base config.
    /// The result is resolved against `root`.
    pub fn resolve_database_path(
        &self,
        root: &Path,
        cli_override: Option<&str>,
        target: Option<&str>,
    ) -> CoreResult<String> {
        if let Some(path) = cli_override
            .map(String::from)
            .or_else(|| std::env::var(DATABASE_ENV_VAR).ok())
            .filter(|p| !p.is_empty())
        {
            return Ok(resolve_database_path(&path, root));
        }
        Ok(self.get_database_config(target)?.resolve_path(root))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
