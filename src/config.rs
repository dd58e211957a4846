use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "rocket-miner";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured database path.
pub const DATABASE_ENV: &str = "ROCKET_MINER_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// SQLite catalog to query. Falls back to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    /// `k` used by ranking commands that are not given one.
    pub default_k: i64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_filter: None,
            default_k: 5,
        }
    }
}

impl MinerConfig {
    /// Load configuration from the user's config directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::try_load(&config_file_path()?)
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Write to the user's config directory and return the path written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Database path with `ROCKET_MINER_DB` taking precedence over the file.
    pub fn database_path(&self) -> Option<PathBuf> {
        std::env::var_os(DATABASE_ENV)
            .map(PathBuf::from)
            .or_else(|| self.database_path.clone())
    }
}

fn config_file_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
