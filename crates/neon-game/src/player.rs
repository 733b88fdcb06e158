//! The player entity
//!
//! Falls under gravity, rises on each ascend command, and reacts to the
//! lifecycle: frozen until the game starts, collider disabled on death, and
//! returned to its origin on reset.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use neon_core::{EntityId, Rect, Vec2};
use neon_runtime::{
    CommandStream, CommandTarget, FloatVariable, GameStateResponder, IntVariable, Outbox,
    Scheduler, Sequence, TaskGroup,
};
use tracing::{debug, info};

use crate::channels::GameChannels;
use crate::config::GameConfig;
use crate::effects::{EffectHandler, PickupEffect};
use crate::shield::Shield;
use crate::state::SharedState;

pub struct Player {
    body: Rect,
    velocity: f32,
    origin: Vec2,
    gravity: f32,
    upward_force: f32,
    floor: f32,
    ceiling: f32,

    frozen: bool,
    collider_enabled: bool,
    visible: bool,
    touching_bounds: bool,
    contacts: HashSet<EntityId>,

    commands: Rc<RefCell<CommandStream>>,
    pub effects: EffectHandler,
    score_float: FloatVariable,
    bonus: IntVariable,
    skip_score: f32,

    end_game: TaskGroup,
    end_game_delay: f32,
    damage_grace: f32,
    reset_grace: f32,
    reset_requested: bool,
    channels: GameChannels,
}

impl Player {
    pub fn new(
        config: &GameConfig,
        state: &SharedState,
        channels: GameChannels,
        scheduler: Rc<Scheduler>,
        commands: Rc<RefCell<CommandStream>>,
    ) -> Self {
        let shield = Shield::new(&config.shield, state, channels, Rc::clone(&scheduler));
        let effects = EffectHandler::new(
            shield,
            state.game_speed.clone(),
            state.bonus.clone(),
            channels,
        );
        let p = &config.player;
        let half_height = p.size.y * 0.5;
        Self {
            body: Rect::new(p.origin, p.size),
            velocity: 0.0,
            origin: p.origin,
            gravity: p.gravity,
            upward_force: p.upward_force,
            floor: config.pillars.ground_start + half_height,
            ceiling: config.pillars.ground_start + config.pillars.ceiling_height - half_height,
            frozen: true,
            collider_enabled: true,
            visible: true,
            touching_bounds: false,
            contacts: HashSet::new(),
            commands,
            effects,
            score_float: state.score_float.clone(),
            bonus: state.bonus.clone(),
            skip_score: config.score.skip_score,
            end_game: TaskGroup::new(scheduler, "end_game"),
            end_game_delay: p.end_game_delay,
            damage_grace: config.shield.damage_grace,
            reset_grace: config.shield.reset_grace,
            reset_requested: false,
            channels,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body
    }

    pub fn position(&self) -> Vec2 {
        self.body.center
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn collider_enabled(&self) -> bool {
        self.collider_enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_shielded(&self) -> bool {
        self.effects.shield.is_active()
    }

    /// Execute at most one queued command, then integrate.
    ///
    /// Returns true when the player has just touched the ground or ceiling
    /// with its collider enabled.
    pub fn fixed_step(&mut self, dt: f32) -> bool {
        let next = self.commands.borrow_mut().try_dequeue();
        if let Some(command) = next {
            command.execute(self);
        }
        if self.frozen {
            return false;
        }

        self.velocity -= self.gravity * dt;
        self.body.center.y += self.velocity * dt;

        let mut touching = false;
        if self.body.center.y < self.floor {
            self.body.center.y = self.floor;
            self.velocity = 0.0;
            touching = true;
        } else if self.body.center.y > self.ceiling {
            self.body.center.y = self.ceiling;
            self.velocity = self.velocity.min(0.0);
            touching = true;
        }
        let entered = touching && !self.touching_bounds;
        self.touching_bounds = touching;
        entered && self.collider_enabled
    }

    /// Replace the set of obstacles currently overlapped and return how many
    /// of them were not overlapped on the previous step.
    pub fn update_contacts(&mut self, overlapping: impl IntoIterator<Item = EntityId>) -> usize {
        let now: HashSet<EntityId> = overlapping.into_iter().collect();
        let entered = now.difference(&self.contacts).count();
        self.contacts = now;
        entered
    }

    pub fn collect(&mut self, effect: PickupEffect, out: &mut Outbox) {
        self.effects.grant(effect, out);
    }

    /// Reward for taking the tutorial skip gate
    pub fn pass_skip_gate(&mut self) {
        self.score_float.update(|s| *s += self.skip_score);
        self.bonus.update(|b| *b += 1);
    }

    /// Arm a short shield for the next reset so the player cannot die the
    /// moment play resumes
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    pub fn on_damaged(&mut self, out: &mut Outbox) {
        if self.damage_grace > 0.0 && self.collider_enabled {
            self.effects.shield.activate(self.damage_grace, out);
        }
    }
}

impl CommandTarget for Player {
    fn ascend(&mut self) {
        if !self.frozen {
            self.velocity += self.upward_force;
        }
    }
}

impl GameStateResponder for Player {
    fn on_game_start(&mut self, _out: &mut Outbox) {
        self.frozen = false;
    }

    fn on_player_died(&mut self, _out: &mut Outbox) {
        info!("player died");
        self.collider_enabled = false;
        self.visible = false;
        let game_over = self.channels.lifecycle.game_over;
        self.end_game.restart(
            Sequence::new()
                .wait(self.end_game_delay)
                .then(move |bus| bus.raise(game_over)),
        );
    }

    fn on_game_reset(&mut self, out: &mut Outbox) {
        self.end_game.stop_all();
        self.body.center = self.origin;
        self.velocity = 0.0;
        self.frozen = true;
        self.collider_enabled = true;
        self.visible = true;
        self.touching_bounds = false;
        self.contacts.clear();
        self.commands.borrow_mut().clear();
        self.effects.shield.reset();
        if std::mem::take(&mut self.reset_requested) {
            debug!(secs = self.reset_grace, "reset grace shield");
            self.effects.shield.activate(self.reset_grace, out);
        }
    }
}
