//! Runtime configuration loaded from TOML and the environment.
//!
//! ```toml
//! seed = 7
//! player_faction = "red"
//! strict_validation = true
//!
//! [data]
//! root = "data"
//! file_extension = "txt"
//! mods_dir = "mods"
//!
//! [[data.modules]]
//! identifier = "base"
//! path = "base"
//!
//! [scheduler]
//! half_minute_pulse = 900
//! minute_pulse = 1800
//! ```
use std::env;
use std::path::{Path, PathBuf};

use game_core::SchedulerConfig;
use serde::Deserialize;

use crate::error::{Result, RuntimeError};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub data: DataConfig,
    pub scheduler: SchedulerConfig,
    /// Seed for the match's random source.
    pub seed: u64,
    /// Identifier of the faction definition bound to the local player. The
    /// first faction is used when unset.
    pub player_faction: Option<String>,
    /// Treat validation failures as fatal instead of logging them.
    pub strict_validation: bool,
}

impl RuntimeConfig {
    pub const DEFAULT_SEED: u64 = 0;

    pub fn new(data: DataConfig) -> Self {
        Self {
            data,
            scheduler: SchedulerConfig::default(),
            seed: Self::DEFAULT_SEED,
            player_faction: None,
            strict_validation: true,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DATA_ROOT` - Directory holding the data modules (default: `data`)
    /// - `DATA_MODS_DIR` - Directory of overlay modules (default: none)
    /// - `RNG_SEED` - Seed for the match (default: 0)
    /// - `PLAYER_FACTION` - Faction bound to the player (default: first faction)
    /// - `STRICT_VALIDATION` - Fail on validation errors (default: true)
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Applies environment overrides on top of `self`.
    pub fn with_env(mut self) -> Self {
        if let Ok(root) = env::var("DATA_ROOT") {
            self.data.root = PathBuf::from(root);
        }
        if let Ok(mods_dir) = env::var("DATA_MODS_DIR") {
            self.data.mods_dir = Some(PathBuf::from(mods_dir));
        }
        if let Some(seed) = read_env::<u64>("RNG_SEED") {
            self.seed = seed;
        }
        if let Ok(faction) = env::var("PLAYER_FACTION") {
            self.player_faction = Some(faction);
        }
        if let Some(strict) = read_env::<bool>("STRICT_VALIDATION") {
            self.strict_validation = strict;
        }
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(DataConfig::default())
    }
}

/// Where definitions are read from.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub root: PathBuf,
    pub file_extension: String,
    pub mods_dir: Option<PathBuf>,
    /// Modules in load order. Empty means a single `base` module at `root`.
    pub modules: Vec<ModuleConfig>,
}

impl DataConfig {
    pub const DEFAULT_ROOT: &'static str = "data";
    pub const BASE_MODULE: &'static str = "base";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_extension: database::DEFAULT_FILE_EXTENSION.to_owned(),
            mods_dir: None,
            modules: Vec::new(),
        }
    }

    /// Modules to load, with paths resolved against `root`.
    pub fn resolved_modules(&self) -> Vec<ModuleConfig> {
        if self.modules.is_empty() {
            return vec![ModuleConfig {
                identifier: Self::BASE_MODULE.to_owned(),
                path: self.root.clone(),
                parent: None,
            }];
        }
        self.modules
            .iter()
            .map(|module| ModuleConfig {
                path: self.root.join(&module.path),
                ..module.clone()
            })
            .collect()
    }

    pub fn resolved_mods_dir(&self) -> Option<PathBuf> {
        self.mods_dir.as_ref().map(|dir| self.root.join(dir))
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROOT)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ModuleConfig {
    pub identifier: String,
    pub path: PathBuf,
    #[serde(default)]
    pub parent: Option<String>,
}

/// Loader for runtime configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`. A relative `data.root` is taken relative to the file's
    /// directory.
    pub fn load(path: &Path) -> Result<RuntimeConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: RuntimeConfig =
            toml::from_str(&content).map_err(|source| RuntimeError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.data.root.is_relative()
            && let Some(directory) = path.parent()
        {
            config.data.root = directory.join(&config.data.root);
        }
        Ok(config)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_modules_relative_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.toml");
        std::fs::write(
            &path,
            r#"
seed = 42
player_faction = "red"

[data]
root = "content"

[[data.modules]]
identifier = "base"
path = "base"

[[data.modules]]
identifier = "expansion"
path = "expansion"
parent = "base"

[scheduler]
half_minute_pulse = 10
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.player_faction.as_deref(), Some("red"));
        assert!(config.strict_validation);
        assert_eq!(config.scheduler.half_minute_pulse, 10);
        assert_eq!(
            config.scheduler.minute_pulse,
            SchedulerConfig::DEFAULT_MINUTE_PULSE
        );
        assert_eq!(config.data.file_extension, "txt");

        let modules = config.data.resolved_modules();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[1].path, dir.path().join("content").join("expansion"));
        assert_eq!(modules[1].parent.as_deref(), Some("base"));
    }

    #[test]
    fn default_config_has_a_single_base_module() {
        let modules = DataConfig::new("somewhere").resolved_modules();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].identifier, DataConfig::BASE_MODULE);
        assert_eq!(modules[0].path, PathBuf::from("somewhere"));
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "seed = [").unwrap();

        let error = ConfigLoader::load(&path).unwrap_err();
        assert_eq!(error.error_code(), "RUNTIME_CONFIG_PARSE");
    }
}
