//! Configuration loading.
//!
//! Optional TOML file at `<config dir>/inventario/config.toml`:
//!
//! ```toml
//! database_path = "/somewhere/inventario.db"
//! label_width = 20
//! ```
//!
//! The database path resolves as: `--db` flag, then the `INVENTARIO_DB`
//! environment variable, then the config file, then the platform data
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::services::provenance::graph::DEFAULT_LABEL_WIDTH;

pub const DB_ENV_VAR: &str = "INVENTARIO_DB";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    pub database_path: Option<PathBuf>,
    pub label_width: Option<usize>,
}

impl Config {
    /// Load the config file if present; a missing file is the default
    /// config, a malformed one is an error.
    pub fn load() -> Result<Self> {
        let Some(path) = config_file_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the database path, with an optional command-line override.
    pub fn database_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(DB_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine the platform data directory"))?;
        Ok(data_dir.join("inventario").join("inventario.db"))
    }

    pub fn label_width(&self) -> usize {
        self.label_width.unwrap_or(DEFAULT_LABEL_WIDTH)
    }
}

fn config_file_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("inventario").join("config.toml"))
}
