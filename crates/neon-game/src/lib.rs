//! Neon Game - Gameplay for the Neon Lines runner
//!
//! Everything a run needs on top of the runtime:
//! - `GameConfig` — tunables loaded from layered TOML files
//! - `ObjectPool` — recycled pillars and pickups
//! - `Player`, `Shield`, `PickupEffect` — the player and what pickups do to it
//! - `SpeedTracker`, `ScoreTracker`, `HealthTracker` — difficulty and scoring
//! - `PillarSpawner`, `PickupSpawner` — procedural obstacles
//! - `Tutorial` — the fixed opening course
//! - `Session` — wires all of the above to one bus and drives it

mod channels;
mod config;
mod controller;
mod effects;
mod entities;
mod health;
mod player;
mod pool;
mod scroller;
mod session;
mod shield;
mod spawner;
mod state;
mod tracker;
mod tutorial;

pub use channels::GameChannels;
pub use config::{
    load_layered_table, merge_toml, GameConfig, PickupConfig, PickupPrototype, PillarConfig,
    PlayerConfig, PoolConfig, ScoreConfig, ShieldConfig, SpeedConfig, TutorialConfig,
};
pub use controller::{Autopilot, PlayerController};
pub use effects::{EffectHandler, PickupEffect};
pub use entities::{Pickup, Pillar};
pub use health::HealthTracker;
pub use player::Player;
pub use pool::{ObjectPool, PoolHandle, PoolMode, Poolable};
pub use scroller::scroll_pool;
pub use session::{Session, SessionStats};
pub use shield::Shield;
pub use spawner::{sample, PickupSpawner, PillarPair, PillarSpawner, SharedRng};
pub use state::{HighScoreEntry, SharedState};
pub use tracker::{FinalScoreEvaluator, ScoreTracker, SpeedTracker};
pub use tutorial::{Tutorial, TutorialObject, TutorialObjectKind, TutorialTrigger};
