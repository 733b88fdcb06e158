//! Shared game state
//!
//! The variables many components read and write, bundled so they can be
//! handed to each component at construction instead of living in globals.

use neon_core::Vec2;
use neon_runtime::{
    BoolVariable, FloatVariable, IntVariable, StringVariable, Variable, Vec2Variable,
};
use serde::Serialize;

use crate::config::GameConfig;

/// A high score waiting to be sent to the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: i32,
}

#[derive(Debug, Clone)]
pub struct SharedState {
    pub game_speed: FloatVariable,
    pub tutorial_active: BoolVariable,

    pub score_float: FloatVariable,
    pub score: IntVariable,
    pub bonus: IntVariable,
    pub bonus_multiplier: IntVariable,
    pub final_score: IntVariable,
    pub min_high_score: IntVariable,
    pub player_name: StringVariable,
    /// Filled just before `post_high_score` is raised
    pub pending_high_score: Variable<Option<HighScoreEntry>>,

    pub health: IntVariable,
    pub shield_active: BoolVariable,
    /// Shield opacity for presentation, 0 when hidden
    pub shield_alpha: FloatVariable,
    pub shield_deactivation_time: FloatVariable,

    pub pillar_spawn_time_range: Vec2Variable,
    pub pickup_spawn_chance: FloatVariable,
}

impl SharedState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            game_speed: FloatVariable::new(0.0),
            tutorial_active: BoolVariable::new(true),
            score_float: FloatVariable::new(0.0),
            score: IntVariable::new(0),
            bonus: IntVariable::new(0),
            bonus_multiplier: IntVariable::new(config.score.bonus_multiplier),
            final_score: IntVariable::new(0),
            min_high_score: IntVariable::new(0),
            player_name: StringVariable::default(),
            pending_high_score: Variable::new(None),
            health: IntVariable::new(config.player.max_health),
            shield_active: BoolVariable::new(false),
            shield_alpha: FloatVariable::new(0.0),
            shield_deactivation_time: FloatVariable::new(config.shield.deactivation_time),
            pillar_spawn_time_range: Vec2Variable::new(Vec2::ZERO),
            pickup_spawn_chance: FloatVariable::new(config.pickups.spawn_chance),
        }
    }
}
