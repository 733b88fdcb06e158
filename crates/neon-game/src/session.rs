//! A complete game session
//!
//! `Session` owns the bus, the scheduler and every gameplay component, wires
//! them together and drives them from frame time. All cross-component
//! communication goes through the bus; the session only moves the world,
//! detects collisions and turns them into raises.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use neon_core::{EntityId, Result, Vec2};
use neon_runtime::{
    listen, subscribe_responder, ChannelId, Command, CommandStream, EventBus, GameClock,
    InputState, LifecyclePhase, Outbox, PhaseTracker, Scheduler, Subscription, ACTION_PAUSE,
    ACTION_RESTART,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::channels::GameChannels;
use crate::config::GameConfig;
use crate::controller::{Autopilot, PlayerController};
use crate::entities::{Pickup, Pillar};
use crate::health::HealthTracker;
use crate::player::Player;
use crate::pool::{ObjectPool, PoolMode};
use crate::scroller::scroll_pool;
use crate::spawner::{PickupSpawner, PillarSpawner, SharedRng};
use crate::state::{HighScoreEntry, SharedState};
use crate::tracker::{FinalScoreEvaluator, ScoreTracker, SpeedTracker};
use crate::tutorial::{Tutorial, TutorialTrigger};

/// Snapshot of a session for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub elapsed: f64,
    pub phase: String,
    pub score: i32,
    pub bonus: i32,
    pub final_score: i32,
    pub health: i32,
    pub game_speed: f32,
    pub tutorial_active: bool,
    pub shield_active: bool,
    pub pillar_pairs: u32,
    pub pickups_spawned: u32,
    pub pickups_collected: u32,
    pub hits_taken: u32,
    pub new_high_score: bool,
}

fn counter(bus: &EventBus, channel: ChannelId) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    bus.register(channel, move |_| c.set(c.get() + 1));
    count
}

pub struct Session {
    config: GameConfig,
    bus: EventBus,
    channels: GameChannels,
    scheduler: Rc<Scheduler>,
    state: SharedState,
    clock: GameClock,
    input: InputState,
    commands: Rc<RefCell<CommandStream>>,
    controller: PlayerController,
    autopilot: Option<Autopilot>,

    player: Rc<RefCell<Player>>,
    health: Rc<RefCell<HealthTracker>>,
    speed: Rc<RefCell<SpeedTracker>>,
    score: Rc<RefCell<ScoreTracker>>,
    evaluator: Rc<RefCell<FinalScoreEvaluator>>,
    pillar_spawner: Rc<RefCell<PillarSpawner>>,
    pickup_spawner: Rc<RefCell<PickupSpawner>>,
    tutorial: Rc<RefCell<Tutorial>>,
    phase: Rc<RefCell<PhaseTracker>>,
    pillars: Rc<RefCell<ObjectPool<Pillar>>>,
    pickups: Rc<RefCell<ObjectPool<Pickup>>>,

    collected: Rc<Cell<u32>>,
    hits: Rc<Cell<u32>>,
    subscriptions: Vec<Subscription>,
}

impl Session {
    /// Build and wire a session. The same config and seed always play out
    /// the same way for the same input.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;

        let bus = EventBus::new();
        let channels = GameChannels::new(&bus);
        let state = SharedState::new(&config);
        let scheduler = Rc::new(Scheduler::new());
        let commands = Rc::new(RefCell::new(CommandStream::new()));
        let rng: SharedRng = Rc::new(RefCell::new(StdRng::seed_from_u64(seed)));
        let offscreen = Vec2::new(config.pillars.spawn_x, config.pillars.ground_start);

        let pillars = Rc::new(RefCell::new(ObjectPool::new("pillars", PoolMode::Growable)));
        pillars
            .borrow_mut()
            .initialize(vec![Pillar::new()], config.pools.pillars, Some(offscreen));
        let pickups = Rc::new(RefCell::new(ObjectPool::new("pickups", PoolMode::Fixed)));
        let prototypes = config
            .pickups
            .prototypes
            .iter()
            .map(Pickup::from_prototype)
            .collect();
        pickups.borrow_mut().initialize(
            prototypes,
            config.pools.pickups_per_prototype,
            Some(offscreen),
        );

        let player = Rc::new(RefCell::new(Player::new(
            &config,
            &state,
            channels,
            Rc::clone(&scheduler),
            Rc::clone(&commands),
        )));
        let health = Rc::new(RefCell::new(HealthTracker::new(
            state.health.clone(),
            config.player.max_health,
            channels.lifecycle.player_died,
        )));
        let speed = Rc::new(RefCell::new(SpeedTracker::new(&config.speed, &state)));
        let score = Rc::new(RefCell::new(ScoreTracker::new(&state)));
        let evaluator = Rc::new(RefCell::new(FinalScoreEvaluator::new(
            &state,
            channels.post_high_score,
        )));
        let pillar_spawner = Rc::new(RefCell::new(PillarSpawner::new(
            &config.pillars,
            &state,
            Rc::clone(&pillars),
            Rc::clone(&rng),
            channels.spawn_pickup,
            Rc::clone(&scheduler),
        )));
        let pickup_spawner = Rc::new(RefCell::new(PickupSpawner::new(
            &config.pickups,
            config.pillars.spawn_x,
            &state,
            Rc::clone(&pickups),
            rng,
        )));
        let tutorial = Rc::new(RefCell::new(Tutorial::new(
            &config.tutorial,
            &config.pillars,
            &state,
        )));
        let phase = Rc::new(RefCell::new(PhaseTracker::new()));

        let lifecycle = &channels.lifecycle;
        let subscriptions = vec![
            subscribe_responder(&bus, lifecycle, Rc::clone(&player)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&health)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&speed)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&score)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&evaluator)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&pillar_spawner)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&pickup_spawner)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&tutorial)),
            subscribe_responder(&bus, lifecycle, Rc::clone(&phase)),
        ];

        listen(&bus, channels.damaged, Rc::clone(&player), Player::on_damaged);
        listen(&bus, channels.damaged, Rc::clone(&health), HealthTracker::on_damaged);
        listen(&bus, channels.healed, Rc::clone(&health), HealthTracker::on_healed);
        listen(
            &bus,
            channels.spawn_pickup,
            Rc::clone(&pickup_spawner),
            PickupSpawner::on_spawn_pickup,
        );
        let collected = counter(&bus, channels.pickup_collected);
        let hits = counter(&bus, channels.damaged);

        info!(seed, "session created");
        Ok(Self {
            input: InputState::from_config(&config.input),
            controller: PlayerController::new(Rc::clone(&commands)),
            config,
            bus,
            channels,
            scheduler,
            state,
            clock: GameClock::new(),
            commands,
            autopilot: None,
            player,
            health,
            speed,
            score,
            evaluator,
            pillar_spawner,
            pickup_spawner,
            tutorial,
            phase,
            pillars,
            pickups,
            collected,
            hits,
            subscriptions,
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn channels(&self) -> &GameChannels {
        &self.channels
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase.borrow().phase()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn player_position(&self) -> Vec2 {
        self.player.borrow().position()
    }

    /// Let the autopilot fly instead of the input
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled.then(|| Autopilot::new(self.config.player.origin.y));
    }

    /// Begin a run. Only valid from the reset phase.
    pub fn start(&mut self) -> bool {
        if self.phase() != LifecyclePhase::Reset {
            warn!(phase = ?self.phase(), "start ignored");
            return false;
        }
        self.bus.raise(self.channels.lifecycle.game_start);
        true
    }

    /// Return to the start of a run with a brief grace shield
    pub fn request_reset(&mut self) {
        self.clock.set_paused(false);
        self.player.borrow_mut().request_reset();
        self.bus.raise(self.channels.lifecycle.game_reset);
    }

    pub fn toggle_pause(&mut self) {
        let paused = !self.clock.is_paused();
        self.clock.set_paused(paused);
        info!(paused, "pause toggled");
        self.bus.raise(self.channels.game_paused);
    }

    /// Publish the current leaderboard threshold
    pub fn set_min_high_score(&mut self, score: i32) {
        self.state.min_high_score.set(score);
        self.bus.raise(self.channels.high_scores_loaded);
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.state.player_name.set(name.to_string());
    }

    /// The entry queued by the last `post_high_score` raise, if any
    pub fn take_pending_high_score(&self) -> Option<HighScoreEntry> {
        self.state.pending_high_score.take()
    }

    pub fn key_down(&mut self, key: &str) {
        self.input.process_key_down(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.process_key_up(key);
    }

    /// Process this frame's input, then run as many fixed steps as the frame
    /// time allows
    pub fn advance(&mut self, frame_dt: f64) {
        self.handle_input();
        self.input.end_frame();

        self.clock.advance(frame_dt);
        while self.clock.should_fixed_update() {
            let dt = self.clock.fixed_timestep as f32;
            self.step(dt);
            self.clock.consume_fixed_step();
        }
    }

    /// Advance in frames of `frame_dt` for `seconds` of frame time
    pub fn run_for(&mut self, seconds: f64, frame_dt: f64) {
        let frames = (seconds / frame_dt).round() as u64;
        for _ in 0..frames {
            self.advance(frame_dt);
        }
    }

    fn handle_input(&mut self) {
        if self.input.is_action_just_pressed(ACTION_PAUSE) {
            self.toggle_pause();
        }
        if self.clock.is_paused() {
            return;
        }
        match self.phase() {
            LifecyclePhase::Reset => {
                if self.controller.poll(&self.input) {
                    self.start();
                }
            }
            LifecyclePhase::GameOver => {
                if self.input.is_action_just_pressed(ACTION_RESTART)
                    || self.controller.poll(&self.input)
                {
                    self.request_reset();
                }
            }
            LifecyclePhase::Tutorial | LifecyclePhase::Playing => {
                self.controller.poll(&self.input);
            }
            LifecyclePhase::Died => {}
        }
    }

    /// One fixed simulation step
    pub fn step(&mut self, dt: f32) {
        self.fly_autopilot();
        let bounds_hit = self.player.borrow_mut().fixed_step(dt);
        self.speed.borrow_mut().update(dt);
        self.score.borrow_mut().update(dt);
        self.scroll(dt);
        self.scheduler.tick(dt, &self.bus);
        self.resolve_collisions(bounds_hit);
    }

    fn fly_autopilot(&self) {
        let Some(pilot) = &self.autopilot else {
            return;
        };
        if !matches!(
            self.phase(),
            LifecyclePhase::Tutorial | LifecyclePhase::Playing
        ) {
            return;
        }
        let (rect, velocity) = {
            let player = self.player.borrow();
            (player.rect(), player.velocity())
        };
        let target = {
            let pillars = self.pillars.borrow();
            let tutorial = self.tutorial.borrow();
            let obstacles = pillars
                .iter_active()
                .map(|(_, p)| &p.body)
                .chain(tutorial.obstacles());
            pilot.target_height(&rect, self.config.pillars.ground_start, obstacles)
        };
        if pilot.should_ascend(rect.center, velocity, target) && self.commands.borrow().is_empty()
        {
            self.commands.borrow_mut().enqueue(Command::Ascend);
        }
    }

    fn scroll(&self, dt: f32) {
        let dx = self.state.game_speed.get() * dt;
        if dx <= 0.0 {
            return;
        }
        let despawn_x = self.config.pillars.despawn_x;
        scroll_pool(&mut *self.pillars.borrow_mut(), dx, despawn_x);
        scroll_pool(&mut *self.pickups.borrow_mut(), dx, despawn_x);
        self.tutorial.borrow_mut().scroll(dx);
    }

    fn resolve_collisions(&self, bounds_hit: bool) {
        let (rect, shielded) = {
            let player = self.player.borrow();
            if !player.collider_enabled() {
                return;
            }
            (player.rect(), player.is_shielded())
        };

        let overlapping: Vec<EntityId> = self
            .pillars
            .borrow()
            .iter_active()
            .filter(|(_, p)| p.body.overlaps(&rect))
            .map(|(handle, _)| handle.id())
            .collect();
        let entered = self.player.borrow_mut().update_contacts(overlapping);
        let vulnerable = !shielded && !self.state.tutorial_active.get();
        if vulnerable && (entered > 0 || bounds_hit) {
            debug!(entered, bounds_hit, "player hit");
            self.bus.raise(self.channels.damaged);
            if !self.player.borrow().collider_enabled() {
                return;
            }
        }

        let collected: Vec<_> = {
            let mut pool = self.pickups.borrow_mut();
            let hits: Vec<_> = pool
                .iter_active_mut()
                .filter(|(_, p)| p.body.overlaps(&rect))
                .filter_map(|(handle, p)| p.pick_up().then_some((handle, p.effect)))
                .collect();
            for &(handle, _) in &hits {
                pool.deactivate(handle);
            }
            hits
        };
        for (_, effect) in collected {
            let mut out = Outbox::new();
            self.player.borrow_mut().collect(effect, &mut out);
            out.flush(&self.bus);
            self.bus.raise(self.channels.pickup_collected);
        }

        let trigger = self.tutorial.borrow_mut().check(&rect);
        match trigger {
            Some(TutorialTrigger::SkipGate) => {
                info!("tutorial skipped");
                self.player.borrow_mut().pass_skip_gate();
                self.bus.raise(self.channels.lifecycle.tutorial_end);
            }
            Some(TutorialTrigger::Finish) => {
                self.bus.raise(self.channels.lifecycle.tutorial_end);
            }
            None => {}
        }
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            elapsed: self.clock.total_time,
            phase: format!("{:?}", self.phase()).to_lowercase(),
            score: self.state.score.get(),
            bonus: self.state.bonus.get(),
            final_score: self.state.final_score.get(),
            health: self.health.borrow().health(),
            game_speed: self.state.game_speed.get(),
            tutorial_active: self.state.tutorial_active.get(),
            shield_active: self.state.shield_active.get(),
            pillar_pairs: self.pillar_spawner.borrow().spawned_pairs(),
            pickups_spawned: self.pickup_spawner.borrow().spawned(),
            pickups_collected: self.collected.get(),
            hits_taken: self.hits.get(),
            new_high_score: self.evaluator.borrow().is_new_high_score(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.scheduler.clear();
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel(&self.bus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::PickupEffect;
    use neon_core::NeonError;

    const FRAME: f64 = 1.0 / 60.0;

    fn session() -> Session {
        Session::new(GameConfig::default(), 7).unwrap()
    }

    #[test]
    fn rejects_invalid_geometry() {
        let mut config = GameConfig::default();
        config.pillars.ceiling_height = 5.0;
        assert!(matches!(
            Session::new(config, 1),
            Err(NeonError::InvalidConfig(_))
        ));
    }

    #[test]
    fn press_starts_the_run() {
        let mut s = session();
        assert_eq!(s.phase(), LifecyclePhase::Reset);
        s.run_for(0.5, FRAME);
        assert_eq!(s.player_position(), s.config().player.origin);

        s.key_down("Space");
        s.advance(FRAME);
        assert_eq!(s.phase(), LifecyclePhase::Tutorial);
        assert_eq!(s.state().game_speed.get(), 4.0);
        assert!(!s.start(), "a running game cannot be started again");
    }

    #[test]
    fn autopilot_clears_the_tutorial() {
        let mut s = session();
        s.set_autopilot(true);
        s.start();
        s.run_for(6.0, FRAME);
        assert_eq!(s.phase(), LifecyclePhase::Playing);
        assert!(!s.state().tutorial_active.get());
        assert_eq!(s.stats().hits_taken, 0);
        assert!(s.state().score.get() > 0);
    }

    #[test]
    fn death_game_over_and_reset() {
        let mut s = session();
        s.start();
        s.run_for(1.0, FRAME);
        let damaged = s.channels().damaged;
        for _ in 0..3 {
            s.bus().raise(damaged);
        }
        assert_eq!(s.phase(), LifecyclePhase::Died);
        assert_eq!(s.state().game_speed.get(), 0.0);
        let final_score = s.state().final_score.get();
        assert!(final_score > 0);
        assert!(s.stats().new_high_score);

        s.run_for(2.1, FRAME);
        assert_eq!(s.phase(), LifecyclePhase::GameOver);

        s.set_player_name("ace");
        s.key_down("KeyR");
        s.advance(FRAME);
        assert_eq!(s.phase(), LifecyclePhase::Reset);
        assert_eq!(
            s.take_pending_high_score(),
            Some(HighScoreEntry {
                name: "ace".into(),
                score: final_score
            })
        );
        assert_eq!(s.take_pending_high_score(), None);

        let stats = s.stats();
        assert_eq!(stats.health, 3);
        assert_eq!(stats.score, 0);
        assert!(stats.tutorial_active);
        assert!(stats.shield_active, "grace shield after reset");
        assert_eq!(s.player_position(), s.config().player.origin);
    }

    #[test]
    fn low_score_is_not_posted() {
        let mut s = session();
        s.set_min_high_score(10_000);
        s.start();
        s.run_for(0.5, FRAME);
        let died = s.channels().lifecycle.player_died;
        s.bus().raise(died);
        s.request_reset();
        assert_eq!(s.take_pending_high_score(), None);
    }

    #[test]
    fn pause_freezes_the_world() {
        let mut s = session();
        let paused = counter(s.bus(), s.channels().game_paused);
        s.start();
        s.run_for(0.5, FRAME);
        let score = s.state().score_float.get();

        s.key_down("Escape");
        s.advance(FRAME);
        assert!(s.is_paused());
        s.run_for(1.0, FRAME);
        assert_eq!(s.state().score_float.get(), score);

        s.toggle_pause();
        s.run_for(0.5, FRAME);
        assert!(s.state().score_float.get() > score);
        assert_eq!(paused.get(), 2);
    }

    fn end_tutorial(s: &mut Session) {
        s.start();
        let tutorial_end = s.channels().lifecycle.tutorial_end;
        s.bus().raise(tutorial_end);
        assert_eq!(s.phase(), LifecyclePhase::Playing);
    }

    #[test]
    fn pillar_contact_damages_once_then_shields() {
        let mut s = session();
        end_tutorial(&mut s);
        let at = s.player_position();
        {
            let mut pool = s.pillars.borrow_mut();
            let handle = pool.acquire_first_inactive().unwrap();
            pool.activate(handle);
            let pillar = pool.get_mut(handle).unwrap();
            pillar.body.center = at + Vec2::new(1.0, 0.0);
            pillar.set_height(3.0);
            pillar.set_width(3.0);
        }
        s.step(1.0 / 60.0);
        assert_eq!(s.stats().health, 2);
        assert!(s.state().shield_active.get());

        s.step(1.0 / 60.0);
        assert_eq!(s.stats().hits_taken, 1);
    }

    #[test]
    fn no_damage_during_tutorial() {
        let mut s = session();
        s.start();
        s.run_for(1.5, FRAME);
        assert!(s.state().tutorial_active.get());
        assert_eq!(s.stats().hits_taken, 0, "resting on the floor is harmless");
    }

    #[test]
    fn ground_contact_after_tutorial_hurts() {
        let mut s = session();
        end_tutorial(&mut s);
        s.run_for(1.0, FRAME);
        assert_eq!(s.stats().hits_taken, 1);
        assert_eq!(s.stats().health, 2);
    }

    #[test]
    fn pickup_is_collected_once() {
        let mut s = session();
        end_tutorial(&mut s);
        let at = s.player_position();
        {
            let mut pool = s.pickups.borrow_mut();
            let handle = pool.acquire_first_inactive().unwrap();
            let pickup = pool.get_mut(handle).unwrap();
            *pickup = Pickup::new(PickupEffect::Bonus(2), Vec2::new(0.6, 0.6));
            pickup.respawn(at);
            pool.activate(handle);
        }
        s.step(1.0 / 60.0);
        s.step(1.0 / 60.0);
        let stats = s.stats();
        assert_eq!(stats.bonus, 2);
        assert_eq!(stats.pickups_collected, 1);
        assert_eq!(s.pickups.borrow().active_count(), 0);
    }

    #[test]
    fn lethal_hit_ends_contacts_for_the_step() {
        let mut s = session();
        end_tutorial(&mut s);
        s.state().health.set(1);
        let at = s.player_position();
        {
            let mut pool = s.pillars.borrow_mut();
            let handle = pool.acquire_first_inactive().unwrap();
            pool.activate(handle);
            let pillar = pool.get_mut(handle).unwrap();
            pillar.body.center = at + Vec2::new(1.0, 0.0);
            pillar.set_height(3.0);
            pillar.set_width(3.0);
        }
        {
            let mut pool = s.pickups.borrow_mut();
            let handle = pool.acquire_first_inactive().unwrap();
            let pickup = pool.get_mut(handle).unwrap();
            *pickup = Pickup::new(PickupEffect::Heal(1), Vec2::new(0.6, 0.6));
            pickup.respawn(at);
            pool.activate(handle);
        }
        s.step(1.0 / 60.0);

        assert_eq!(s.phase(), LifecyclePhase::Died);
        let stats = s.stats();
        assert_eq!(stats.health, 0);
        assert_eq!(stats.pickups_collected, 0);
        assert!(!stats.shield_active);
        assert_eq!(s.pickups.borrow().active_count(), 1);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut s = session();
            s.set_autopilot(true);
            s.start();
            s.run_for(20.0, FRAME);
            s.stats()
        };
        assert_eq!(run(), run());
    }
}
