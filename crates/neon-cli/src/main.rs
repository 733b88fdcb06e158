//! Neon CLI - Headless runs, leaderboard and settings for the Neon runner

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{scores, simulate, submit, volume};

use crate::config::NeonConfig;

#[derive(Parser)]
#[command(name = "neon")]
#[command(about = "Endless runner game core: simulate runs, manage scores and settings", long_about = None)]
#[command(version)]
struct Cli {
    /// Extra config file layered over ~/.neon/config.toml and ./neon.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Leaderboard service (http, mock); overrides [leaderboard] service
    #[arg(long, global = true)]
    leaderboard: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the game headless with the autopilot at the controls
    Simulate {
        /// Simulated seconds
        #[arg(long, default_value = "60")]
        seconds: f64,

        /// Random seed for pillar and pickup placement
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Start a new run after each game over
        #[arg(long)]
        restart: bool,

        /// Submit qualifying scores to the leaderboard under this name
        #[arg(long)]
        submit_as: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the online leaderboard
    Scores {
        /// Number of entries
        #[arg(long, default_value = "5")]
        top: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Post a score to the online leaderboard
    Submit {
        /// Player name
        name: String,

        /// Final score
        score: i32,
    },

    /// Music and sound effect volume
    #[command(subcommand)]
    Volume(volume::VolumeCommands),

    /// Print the merged configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = NeonConfig::load(cli.config.as_deref())?;
    if let Some(service) = cli.leaderboard {
        config.leaderboard.service = service;
    }

    match cli.command {
        Commands::Simulate {
            seconds,
            seed,
            restart,
            submit_as,
            format,
        } => simulate::run(
            &config,
            simulate::SimulateArgs {
                seconds,
                seed,
                restart,
                submit_as,
                format,
            },
        ),
        Commands::Scores { top, format } => scores::run(&config, top, &format),
        Commands::Submit { name, score } => submit::run(&config, &name, score),
        Commands::Volume(cmd) => volume::run(&config, cmd),
        Commands::Config => commands::config::run(&config),
    }
}
