//! Change unit catalog: discovery and ordering of packaged units.
//!
//! Each configured migration directory holds one sub-directory per unit,
//! named after the unit. A unit directory contains exactly one of:
//!
//! - `up.sql` and `down.sql`: raw SQL batches
//! - `unit.yml` (or `unit.yaml`): declarative `up` / `down` operation lists
//!
//! Anything else is rejected when the catalog is loaded.

use crate::error::{CoreError, CoreResult};
use crate::unit::{ChangeUnit, UnitDefinition};
use crate::unit_name::UnitName;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const UP_SQL: &str = "up.sql";
const DOWN_SQL: &str = "down.sql";
const UNIT_YAML: [&str; 2] = ["unit.yml", "unit.yaml"];

/// Ordered, validated collection of change units
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    units: Vec<ChangeUnit>,
}

impl Catalog {
    /// Load every unit under `paths`.
    ///
    /// Fails with `CatalogUnreadable` when a directory is missing or cannot be
    /// listed, and with `MalformedUnit` / `DuplicateUnit` when a unit breaks
    /// the layout or naming contract.
    pub fn load(paths: &[PathBuf]) -> CoreResult<Self> {
        let mut units = Vec::new();
        for dir in paths {
            load_dir(dir, &mut units)?;
        }
        Self::from_units(units)
    }

    /// Build a catalog from units registered in code.
    pub fn from_units(mut units: Vec<ChangeUnit>) -> CoreResult<Self> {
        units.sort_by(|a, b| a.name().cmp(b.name()));

        let mut seen: HashMap<&UnitName, &ChangeUnit> = HashMap::new();
        for unit in &units {
            if let Some(previous) = seen.insert(unit.name(), unit) {
                return Err(CoreError::DuplicateUnit {
                    name: unit.name().to_string(),
                    path1: source_label(previous),
                    path2: source_label(unit),
                });
            }
        }

        Ok(Self { units })
    }

    /// All units, ascending by name
    pub fn list(&self) -> &[ChangeUnit] {
        &self.units
    }

    /// Look up a unit by name
    pub fn get(&self, name: &str) -> Option<&ChangeUnit> {
        self.units
            .binary_search_by(|u| u.name().as_str().cmp(name))
            .ok()
            .map(|i| &self.units[i])
    }

    /// Unit names, ascending
    pub fn names(&self) -> Vec<&UnitName> {
        self.units.iter().map(ChangeUnit::name).collect()
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when no units are packaged
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

fn source_label(unit: &ChangeUnit) -> String {
    unit.source()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<registered>".to_string())
}

fn load_dir(dir: &Path, units: &mut Vec<ChangeUnit>) -> CoreResult<()> {
    let unreadable = |reason: String| CoreError::CatalogUnreadable {
        path: dir.display().to_string(),
        reason,
    };

    if !dir.is_dir() {
        return Err(unreadable("directory does not exist".to_string()));
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| unreadable(e.to_string()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(|e| unreadable(e.to_string()))?;
    entries.sort();

    for path in entries {
        let file_name = file_name_of(&path);
        if file_name.starts_with('.') {
            continue;
        }
        if !path.is_dir() {
            return Err(CoreError::MalformedUnit {
                name: file_name,
                reason: format!(
                    "unexpected file in migration directory {}; each unit must be a directory",
                    dir.display()
                ),
            });
        }
        units.push(load_unit(&path)?);
    }
    Ok(())
}

fn load_unit(unit_dir: &Path) -> CoreResult<ChangeUnit> {
    let dir_name = file_name_of(unit_dir);
    let malformed = |reason: String| CoreError::MalformedUnit {
        name: dir_name.clone(),
        reason,
    };

    let name = UnitName::parse(dir_name.as_str()).map_err(&malformed)?;

    let mut files: Vec<String> = std::fs::read_dir(unit_dir)
        .map_err(|e| CoreError::IoWithPath {
            path: unit_dir.display().to_string(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|f| !f.starts_with('.'))
        .collect();
    files.sort();

    let file_refs: Vec<&str> = files.iter().map(String::as_str).collect();
    let unit = match file_refs.as_slice() {
        [DOWN_SQL, UP_SQL] => {
            let up = read(unit_dir.join(UP_SQL))?;
            let down = read(unit_dir.join(DOWN_SQL))?;
            ChangeUnit::from_sql(name, &up, &down)?
        }
        [single] if UNIT_YAML.contains(single) => {
            let content = read(unit_dir.join(single))?;
            let def: UnitDefinition = serde_yaml::from_str(&content)
                .map_err(|e| malformed(format!("{single}: {e}")))?;
            ChangeUnit::from_definition(name, def)?
        }
        [] => return Err(malformed("unit directory is empty".to_string())),
        other => {
            return Err(malformed(format!(
                "expected up.sql + down.sql or a single unit.yml, found: {}",
                other.join(", ")
            )))
        }
    };

    Ok(unit.with_source(unit_dir))
}

fn read(path: PathBuf) -> CoreResult<String> {
    std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
