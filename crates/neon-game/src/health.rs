//! Player health

use neon_runtime::{ChannelId, GameStateResponder, IntVariable, Outbox};
use tracing::debug;

/// Counts health points down on `damaged` and raises `player_died` when the
/// last one is lost
pub struct HealthTracker {
    health: IntVariable,
    max_health: i32,
    player_died: ChannelId,
}

impl HealthTracker {
    pub fn new(health: IntVariable, max_health: i32, player_died: ChannelId) -> Self {
        health.set(max_health);
        Self {
            health,
            max_health,
            player_died,
        }
    }

    pub fn health(&self) -> i32 {
        self.health.get()
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn on_damaged(&mut self, out: &mut Outbox) {
        let health = self.health.get();
        if health <= 0 {
            return;
        }
        self.health.set(health - 1);
        debug!(health = health - 1, "damaged");
        if health == 1 {
            out.raise(self.player_died);
        }
    }

    pub fn on_healed(&mut self, _out: &mut Outbox) {
        self.health.update(|h| *h = (*h + 1).min(self.max_health));
    }
}

impl GameStateResponder for HealthTracker {
    fn on_game_reset(&mut self, _out: &mut Outbox) {
        self.health.set(self.max_health);
    }
}
