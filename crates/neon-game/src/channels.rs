//! Named broadcast channels of a game session

use neon_runtime::{ChannelId, EventBus, LifecycleChannels};

pub const SPAWN_PICKUP: &str = "spawn_pickup";
pub const DAMAGED: &str = "damaged";
pub const HEALED: &str = "healed";
pub const BONUS_COLLECTED: &str = "bonus_collected";
pub const PICKUP_COLLECTED: &str = "pickup_collected";
pub const SHIELD_ACTIVATED: &str = "shield_activated";
pub const SHIELD_DEACTIVATED: &str = "shield_deactivated";
pub const SPEED_INCREASED: &str = "speed_increased";
pub const SPEED_DECREASED: &str = "speed_decreased";
pub const GAME_PAUSED: &str = "game_paused";
pub const POST_HIGH_SCORE: &str = "post_high_score";
pub const HIGH_SCORES_LOADED: &str = "high_scores_loaded";

/// Every channel a session raises, interned once at session start
#[derive(Debug, Clone, Copy)]
pub struct GameChannels {
    pub lifecycle: LifecycleChannels,
    pub spawn_pickup: ChannelId,
    pub damaged: ChannelId,
    pub healed: ChannelId,
    pub bonus_collected: ChannelId,
    pub pickup_collected: ChannelId,
    pub shield_activated: ChannelId,
    pub shield_deactivated: ChannelId,
    pub speed_increased: ChannelId,
    pub speed_decreased: ChannelId,
    pub game_paused: ChannelId,
    pub post_high_score: ChannelId,
    pub high_scores_loaded: ChannelId,
}

impl GameChannels {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            lifecycle: LifecycleChannels::new(bus),
            spawn_pickup: bus.channel(SPAWN_PICKUP),
            damaged: bus.channel(DAMAGED),
            healed: bus.channel(HEALED),
            bonus_collected: bus.channel(BONUS_COLLECTED),
            pickup_collected: bus.channel(PICKUP_COLLECTED),
            shield_activated: bus.channel(SHIELD_ACTIVATED),
            shield_deactivated: bus.channel(SHIELD_DEACTIVATED),
            speed_increased: bus.channel(SPEED_INCREASED),
            speed_decreased: bus.channel(SPEED_DECREASED),
            game_paused: bus.channel(GAME_PAUSED),
            post_high_score: bus.channel(POST_HIGH_SCORE),
            high_scores_loaded: bus.channel(HIGH_SCORES_LOADED),
        }
    }
}
