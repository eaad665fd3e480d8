use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::Result;
use crate::symbols::SymbolPools;
use crate::tier::DifficultyTier;

pub const DEFAULT_TICK_RATE_MS: u64 = 16;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tier selected when the game opens.
    pub tier: DifficultyTier,
    /// Redraw interval of the terminal front end.
    pub tick_rate_ms: u64,
    /// Replacement symbol sets, one string of characters per tier.
    pub custom_pools: BTreeMap<DifficultyTier, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tier: DifficultyTier::Normal,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            custom_pools: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Built-in pools with this config's overrides applied. Fails if an
    /// override leaves a tier without symbols.
    pub fn symbol_pools(&self) -> Result<SymbolPools> {
        SymbolPools::with_overrides(&self.custom_pools)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "snapkey") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("snapkey_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
