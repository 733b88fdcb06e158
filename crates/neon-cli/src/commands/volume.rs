//! Read and write the persisted volume settings

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use neon_runtime::{mixer_attenuation_db, SettingsStore, MUSIC_VOLUME_KEY, SFX_VOLUME_KEY};

use crate::config::NeonConfig;

#[derive(Clone, Copy, ValueEnum)]
pub enum Channel {
    Music,
    Sfx,
}

impl Channel {
    fn key(self) -> &'static str {
        match self {
            Channel::Music => MUSIC_VOLUME_KEY,
            Channel::Sfx => SFX_VOLUME_KEY,
        }
    }
}

#[derive(Subcommand)]
pub enum VolumeCommands {
    /// Show the stored volumes
    Get,
    /// Store a volume in [0, 1]
    Set {
        channel: Channel,
        value: f32,
    },
}

pub fn run(config: &NeonConfig, command: VolumeCommands) -> Result<()> {
    let path = config.settings_path()?;
    let mut store = SettingsStore::open(&path)
        .with_context(|| format!("Failed to open settings at {}", path.display()))?;

    match command {
        VolumeCommands::Get => {
            print_volume("music", store.music_volume());
            print_volume("sfx", store.sfx_volume());
        }
        VolumeCommands::Set { channel, value } => {
            store.set_volume(channel.key(), value)?;
            store
                .save_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved to {}", path.display());
            print_volume(channel.key(), value);
        }
    }
    Ok(())
}

fn print_volume(label: &str, volume: f32) {
    println!(
        "  {:<8} {:.2}  ({:.1} dB)",
        label,
        volume,
        mixer_attenuation_db(volume)
    );
}
