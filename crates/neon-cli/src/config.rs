//! Layered CLI configuration
//!
//! Loaded with four layers of precedence (highest wins):
//! 1. `--config <path>`
//! 2. Project-local: `./neon.toml`
//! 3. Global: `~/.neon/config.toml`
//! 4. Built-in defaults
//!
//! `NEON_LEADERBOARD_URL` overrides the leaderboard URL from any layer.

use anyhow::{bail, Context, Result};
use neon_game::{load_layered_table, GameConfig};
use neon_leaderboard::{create_leaderboard, LeaderboardConfig, LeaderboardService};
use neon_runtime::SettingsStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG: &str = "neon.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    /// Where volume settings are stored; defaults to the user config dir
    pub path: Option<PathBuf>,
}

/// Everything the CLI reads from config files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NeonConfig {
    pub leaderboard: LeaderboardConfig,
    pub settings: SettingsSection,
    #[serde(flatten)]
    pub game: GameConfig,
}

impl NeonConfig {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut layers: Vec<PathBuf> = Vec::new();
        if let Some(global) = global_config_path() {
            layers.push(global);
        }
        layers.push(PathBuf::from(LOCAL_CONFIG));
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            layers.push(path.to_path_buf());
        }
        Self::load_layers(&layers)
    }

    /// Merge the given files in order, skipping missing ones
    pub fn load_layers(layers: &[PathBuf]) -> Result<Self> {
        let merged = load_layered_table(layers).context("Failed to read config files")?;
        let config = merged
            .try_into::<NeonConfig>()
            .context("Invalid config")?;
        config.game.validate().context("Invalid game config")?;
        Ok(Self {
            leaderboard: config.leaderboard.with_env_overrides(),
            ..config
        })
    }

    pub fn settings_path(&self) -> Result<PathBuf> {
        match &self.settings.path {
            Some(path) => Ok(path.clone()),
            None => SettingsStore::default_path()
                .context("No user config directory; set [settings] path in neon.toml"),
        }
    }

    /// The leaderboard named by `[leaderboard] service`
    pub fn leaderboard_service(&self) -> Result<Box<dyn LeaderboardService>> {
        create_leaderboard(&self.leaderboard.service, &self.leaderboard)
            .context("Failed to set up leaderboard")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".neon").join("config.toml"))
}
