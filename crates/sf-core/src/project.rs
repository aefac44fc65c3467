//! Project discovery and loading

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::seed::{discover_seeds, SeedSet};
use std::path::{Path, PathBuf};

/// A SchemaForge project: configuration plus the packaged units and seeds
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,

    /// Change units discovered under `migration_paths`
    pub catalog: Catalog,

    /// Seed sets discovered under `seed_paths`
    pub seeds: Vec<SeedSet>,
}

impl Project {
    /// Load a project from a directory
    pub fn load(path: &Path) -> CoreResult<Self> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        if !root.exists() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let config = Config::load_from_dir(&root)?;
        Self::load_with_config(root, config)
    }

    /// Load a project using an explicitly provided config file
    pub fn load_with_config_file(path: &Path, config_path: &Path) -> CoreResult<Self> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let config = Config::load(config_path)?;
        Self::load_with_config(root, config)
    }

    fn load_with_config(root: PathBuf, config: Config) -> CoreResult<Self> {
        let catalog = Catalog::load(&config.migration_paths_absolute(&root))?;
        let seeds = discover_seeds(&config.seed_paths_absolute(&root))?;
        log::debug!(
            "Loaded project '{}': {} change units, {} seed sets",
            config.name,
            catalog.len(),
            seeds.len()
        );

        Ok(Self {
            root,
            config,
            catalog,
            seeds,
        })
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
