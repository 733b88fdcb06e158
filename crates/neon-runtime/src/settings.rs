//! Settings store: float preferences that survive between sessions.
//!
//! Values are kept as [`toml::Value`] and saved to a TOML file in the user
//! config directory. Only volume levels live here today.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use neon_core::{NeonError, Result};
use tracing::debug;

pub const MUSIC_VOLUME_KEY: &str = "musicVol";
pub const SFX_VOLUME_KEY: &str = "sfxVol";

pub const DEFAULT_MUSIC_VOLUME: f32 = 1.0;
pub const DEFAULT_SFX_VOLUME: f32 = 0.75;

/// Mixer attenuation in decibels for a linear volume in (0, 1]
pub fn mixer_attenuation_db(volume: f32) -> f32 {
    // ln(0) is -inf; mixers clamp at -80 dB
    20.0 * volume.max(1e-4).ln()
}

/// Key-value float settings backed by a TOML file
#[derive(Debug, Default, Clone)]
pub struct SettingsStore {
    data: HashMap<String, toml::Value>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings file: `<config dir>/neon/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("neon").join("settings.toml"))
    }

    /// Read a float, falling back to `default` when the key is missing or
    /// holds a non-numeric value.
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        match self.data.get(key) {
            Some(toml::Value::Float(f)) => *f as f32,
            Some(toml::Value::Integer(i)) => *i as f32,
            _ => default,
        }
    }

    /// Write a float. Overwrites any existing value.
    pub fn set_float(&mut self, key: &str, value: f32) {
        self.data
            .insert(key.to_string(), toml::Value::Float(f64::from(value)));
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn music_volume(&self) -> f32 {
        self.get_float(MUSIC_VOLUME_KEY, DEFAULT_MUSIC_VOLUME)
    }

    pub fn sfx_volume(&self) -> f32 {
        self.get_float(SFX_VOLUME_KEY, DEFAULT_SFX_VOLUME)
    }

    /// Set a volume level, rejecting values outside [0, 1]
    pub fn set_volume(&mut self, key: &str, value: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(NeonError::ValueOutOfRange {
                field: key.to_string(),
                min: 0.0,
                max: 1.0,
                value: f64::from(value),
            });
        }
        self.set_float(key, value);
        Ok(())
    }

    /// Return all keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.data.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    /// Save the store to a TOML file, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let table: toml::map::Map<String, toml::Value> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let content = toml::to_string_pretty(&table)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Load the store from a TOML file, replacing all current data
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let table: toml::map::Map<String, toml::Value> = toml::from_str(&content)?;
        self.data = table.into_iter().collect();
        debug!(path = %path.display(), keys = self.data.len(), "settings loaded");
        Ok(())
    }

    /// Load from `path` if it exists, otherwise start empty
    pub fn open(path: &Path) -> Result<Self> {
        let mut store = Self::new();
        if path.exists() {
            store.load_from_file(path)?;
        }
        Ok(store)
    }
}
