//! Application configuration: defaults, then `config.json`, then
//! `DEEPMINE_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ore::OreGenerator, save::SaveManager};

/// Directory under `~/.config` holding the config file.
pub const CONFIG_DIR: &str = "deepmine";
/// Name of the config file.
pub const CONFIG_FILE: &str = "config.json";
/// Prefix of environment overrides, e.g. `DEEPMINE_SEED=7`.
pub const ENV_PREFIX: &str = "DEEPMINE";

/// Runtime settings for the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location of the save file.
    pub save_path: PathBuf,
    /// Fixed seed for ore generation; entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Directory receiving `deepmine.log`.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_path: SaveManager::default_path(),
            seed: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration layered over the file at `path`, which may be
    /// missing.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("save_path", defaults.save_path.to_string_lossy().into_owned())?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().into_owned())?
            .add_source(
                File::from(path)
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Save manager for the configured save path.
    pub fn save_manager(&self) -> SaveManager {
        SaveManager::new(&self.save_path)
    }

    /// Ore generator honouring the configured seed.
    pub fn ore_generator(&self) -> OreGenerator {
        OreGenerator::from_seed_option(self.seed)
    }
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the default config file if none exists yet, returning its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default config")?;
    fs::write(path, serialized).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Default config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join(CONFIG_FILE))?;
        assert_eq!(config.save_path, SaveManager::default_path());
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        let save_path = dir.path().join("mine.txt");
        fs::write(
            &path,
            serde_json::json!({ "save_path": save_path, "seed": 1234 }).to_string(),
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.save_path, save_path);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.save_manager().path(), save_path.as_path());
        Ok(())
    }

    #[test]
    fn default_config_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        write_default_config(&path)?;
        let written: AppConfig = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(written.log_dir, PathBuf::from("logs"));

        fs::write(&path, "{\"log_dir\": \"elsewhere\"}")?;
        write_default_config(&path)?;
        assert!(fs::read_to_string(&path)?.contains("elsewhere"));
        Ok(())
    }
}
