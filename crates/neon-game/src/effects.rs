//! Pickup effects and the handler that grants them

use neon_runtime::{FloatVariable, IntVariable, Outbox};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channels::GameChannels;
use crate::shield::Shield;

/// What a pickup does when collected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PickupEffect {
    /// Add bonus points
    Bonus(i32),
    /// Restore health points
    Heal(u32),
    /// Invulnerability for this many seconds
    Shield(f32),
    /// Change game speed by this amount
    Speed(f32),
}

impl PickupEffect {
    pub fn name(&self) -> &'static str {
        match self {
            PickupEffect::Bonus(_) => "bonus",
            PickupEffect::Heal(_) => "heal",
            PickupEffect::Shield(_) => "shield",
            PickupEffect::Speed(_) => "speed",
        }
    }
}

/// Applies pickup effects to the player and the shared game state
pub struct EffectHandler {
    pub shield: Shield,
    game_speed: FloatVariable,
    bonus: IntVariable,
    channels: GameChannels,
}

impl EffectHandler {
    pub fn new(
        shield: Shield,
        game_speed: FloatVariable,
        bonus: IntVariable,
        channels: GameChannels,
    ) -> Self {
        Self {
            shield,
            game_speed,
            bonus,
            channels,
        }
    }

    pub fn grant(&mut self, effect: PickupEffect, out: &mut Outbox) {
        debug!(effect = effect.name(), "granting pickup effect");
        match effect {
            PickupEffect::Bonus(count) => self.add_bonus(count, out),
            PickupEffect::Heal(count) => self.heal(count, out),
            PickupEffect::Shield(secs) => self.shield.activate(secs, out),
            PickupEffect::Speed(delta) => self.change_game_speed(delta, out),
        }
    }

    pub fn add_bonus(&mut self, count: i32, out: &mut Outbox) {
        self.bonus.update(|b| *b += count);
        out.raise(self.channels.bonus_collected);
    }

    /// Raise `healed` once per point
    pub fn heal(&mut self, count: u32, out: &mut Outbox) {
        for _ in 0..count {
            out.raise(self.channels.healed);
        }
    }

    /// Apply a speed change only if the game keeps moving forward
    pub fn change_game_speed(&mut self, delta: f32, out: &mut Outbox) {
        let speed = self.game_speed.get();
        if delta == 0.0 || speed + delta <= 0.0 {
            return;
        }
        self.game_speed.set(speed + delta);
        if delta > 0.0 {
            out.raise(self.channels.speed_increased);
        } else {
            out.raise(self.channels.speed_decreased);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, ShieldConfig};
    use crate::state::SharedState;
    use neon_runtime::{EventBus, Scheduler};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixture {
        bus: EventBus,
        channels: GameChannels,
        state: SharedState,
        handler: EffectHandler,
    }

    fn fixture() -> Fixture {
        let bus = EventBus::new();
        let channels = GameChannels::new(&bus);
        let state = SharedState::new(&GameConfig::default());
        let scheduler = Rc::new(Scheduler::new());
        let shield = Shield::new(&ShieldConfig::default(), &state, channels, scheduler);
        let handler = EffectHandler::new(
            shield,
            state.game_speed.clone(),
            state.bonus.clone(),
            channels,
        );
        Fixture {
            bus,
            channels,
            state,
            handler,
        }
    }

    fn count(bus: &EventBus, channel: neon_runtime::ChannelId) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        bus.register(channel, move |_| h.set(h.get() + 1));
        hits
    }

    #[test]
    fn bonus_adds_and_raises() {
        let mut f = fixture();
        let raised = count(&f.bus, f.channels.bonus_collected);
        let mut out = Outbox::new();
        f.handler.grant(PickupEffect::Bonus(3), &mut out);
        out.flush(&f.bus);
        assert_eq!(f.state.bonus.get(), 3);
        assert_eq!(raised.get(), 1);
    }

    #[test]
    fn heal_raises_once_per_point() {
        let mut f = fixture();
        let healed = count(&f.bus, f.channels.healed);
        let mut out = Outbox::new();
        f.handler.grant(PickupEffect::Heal(2), &mut out);
        out.flush(&f.bus);
        assert_eq!(healed.get(), 2);
    }

    #[test]
    fn speed_change_keeps_speed_positive() {
        let mut f = fixture();
        let up = count(&f.bus, f.channels.speed_increased);
        let down = count(&f.bus, f.channels.speed_decreased);
        f.state.game_speed.set(1.5);

        let mut out = Outbox::new();
        f.handler.grant(PickupEffect::Speed(-2.0), &mut out);
        assert_eq!(f.state.game_speed.get(), 1.5);

        f.handler.grant(PickupEffect::Speed(-1.0), &mut out);
        assert_eq!(f.state.game_speed.get(), 0.5);

        f.handler.grant(PickupEffect::Speed(2.0), &mut out);
        assert_eq!(f.state.game_speed.get(), 2.5);
        out.flush(&f.bus);
        assert_eq!(up.get(), 1);
        assert_eq!(down.get(), 1);
    }

    #[test]
    fn shield_effect_activates_shield() {
        let mut f = fixture();
        let mut out = Outbox::new();
        f.handler.grant(PickupEffect::Shield(5.0), &mut out);
        assert!(f.state.shield_active.get());
        assert!(!out.is_empty());
    }

    #[test]
    fn effect_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            effect: PickupEffect,
        }
        let w: Wrapper = toml::from_str(r#"effect = { kind = "speed", value = -1.5 }"#).unwrap();
        assert_eq!(w.effect, PickupEffect::Speed(-1.5));
    }
}
