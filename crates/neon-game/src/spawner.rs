//! Procedural obstacle and pickup spawning
//!
//! The pillar spawner runs one routine from the end of the tutorial until the
//! player dies. Each iteration waits a delay scaled by game speed, asks the
//! pickup spawner for a pickup halfway through, then places a pillar pair.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use neon_core::Vec2;
use neon_runtime::{
    ChannelId, EventBus, FloatVariable, GameStateResponder, Outbox, Routine, Scheduler, Step,
    TaskGroup, Vec2Variable,
};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, trace};

use crate::config::{PickupConfig, PillarConfig};
use crate::entities::{Pickup, Pillar};
use crate::pool::ObjectPool;
use crate::state::SharedState;

pub type SharedRng = Rc<RefCell<StdRng>>;

/// Uniform sample from `[range.x, range.y)`, or `range.x` for an empty range
pub fn sample<R: Rng>(rng: &mut R, range: Vec2) -> f32 {
    if range.y > range.x {
        rng.gen_range(range.x..range.y)
    } else {
        range.x
    }
}

/// Geometry of one obstacle pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillarPair {
    pub lower_height: f32,
    pub gap_height: f32,
    pub upper_height: f32,
    pub width: f32,
    pub lower_center_y: f32,
    pub upper_center_y: f32,
}

impl PillarPair {
    /// Sample a pair that exactly spans ground to ceiling
    pub fn sample<R: Rng>(config: &PillarConfig, rng: &mut R) -> Self {
        let lower_height = sample(rng, config.lower_height_range);
        let gap_height = sample(rng, config.gap_height_range);
        let upper_height = (config.ceiling_height - lower_height - gap_height).max(0.0);
        let width = sample(rng, config.width_range);
        Self {
            lower_height,
            gap_height,
            upper_height,
            width,
            lower_center_y: config.ground_start + lower_height * 0.5,
            upper_center_y: config.ground_start + lower_height + gap_height + upper_height * 0.5,
        }
    }

    /// Vertical centre of the gap
    pub fn gap_center_y(&self) -> f32 {
        self.lower_center_y + self.lower_height * 0.5 + self.gap_height * 0.5
    }
}

/// Starts and stops the pillar routine with the lifecycle
pub struct PillarSpawner {
    pool: Rc<RefCell<ObjectPool<Pillar>>>,
    config: PillarConfig,
    rng: SharedRng,
    game_speed: FloatVariable,
    spawn_time_range: Vec2Variable,
    spawn_pickup: ChannelId,
    spawned: Rc<Cell<u32>>,
    tasks: TaskGroup,
}

impl PillarSpawner {
    pub fn new(
        config: &PillarConfig,
        state: &SharedState,
        pool: Rc<RefCell<ObjectPool<Pillar>>>,
        rng: SharedRng,
        spawn_pickup: ChannelId,
        scheduler: Rc<Scheduler>,
    ) -> Self {
        Self {
            pool,
            config: config.clone(),
            rng,
            game_speed: state.game_speed.clone(),
            spawn_time_range: state.pillar_spawn_time_range.clone(),
            spawn_pickup,
            spawned: Rc::new(Cell::new(0)),
            tasks: TaskGroup::new(scheduler, "pillar_spawner"),
        }
    }

    /// Pillar pairs placed since the session started
    pub fn spawned_pairs(&self) -> u32 {
        self.spawned.get()
    }

    pub fn is_running(&self) -> bool {
        self.tasks.is_running()
    }

    fn start(&mut self) {
        debug!("pillar spawner started");
        self.tasks.restart(SpawnLoop {
            phase: LoopPhase::Plan,
            half_delay: 0.0,
            pool: Rc::clone(&self.pool),
            config: self.config.clone(),
            rng: Rc::clone(&self.rng),
            game_speed: self.game_speed.clone(),
            spawn_time_range: self.spawn_time_range.clone(),
            spawn_pickup: self.spawn_pickup,
            spawned: Rc::clone(&self.spawned),
        });
    }
}

impl GameStateResponder for PillarSpawner {
    fn on_tutorial_end(&mut self, _out: &mut Outbox) {
        self.start();
    }

    fn on_player_died(&mut self, _out: &mut Outbox) {
        self.tasks.stop_all();
    }

    fn on_game_reset(&mut self, _out: &mut Outbox) {
        self.tasks.stop_all();
        self.pool.borrow_mut().deactivate_all();
    }
}

enum LoopPhase {
    Plan,
    Pickup,
    Pillars,
}

struct SpawnLoop {
    phase: LoopPhase,
    half_delay: f32,
    pool: Rc<RefCell<ObjectPool<Pillar>>>,
    config: PillarConfig,
    rng: SharedRng,
    game_speed: FloatVariable,
    spawn_time_range: Vec2Variable,
    spawn_pickup: ChannelId,
    spawned: Rc<Cell<u32>>,
}

impl SpawnLoop {
    /// Keep pillar spacing constant in world units at the current speed
    fn update_spawn_timing(&self, speed: f32) -> Vec2 {
        let range = Vec2::new(
            self.config.spawn_distance_range.x / speed,
            self.config.spawn_distance_range.y / speed,
        );
        self.spawn_time_range.set(range);
        range
    }

    fn spawn_pair(&self) {
        let pair = PillarPair::sample(&self.config, &mut *self.rng.borrow_mut());
        let mut pool = self.pool.borrow_mut();
        let x = self.config.spawn_x;
        let mut placed = 0;
        for (height, center_y) in [
            (pair.lower_height, pair.lower_center_y),
            (pair.upper_height, pair.upper_center_y),
        ] {
            let Some(handle) = pool.acquire_first_inactive() else {
                debug!("no pillar available, skipping");
                continue;
            };
            pool.activate(handle);
            if let Some(pillar) = pool.get_mut(handle) {
                pillar.body.center = Vec2::new(x, center_y);
                pillar.set_height(height);
                pillar.set_width(pair.width);
            }
            placed += 1;
        }
        if placed == 0 {
            return;
        }
        self.spawned.set(self.spawned.get() + 1);
        debug!(
            lower = pair.lower_height,
            gap = pair.gap_height,
            upper = pair.upper_height,
            "pillar pair spawned"
        );
    }
}

impl Routine for SpawnLoop {
    fn resume(&mut self, bus: &EventBus) -> Step {
        loop {
            match self.phase {
                LoopPhase::Plan => {
                    let speed = self.game_speed.get();
                    if speed <= 0.0 {
                        trace!("game speed is zero, waiting a frame");
                        return Step::NextFrame;
                    }
                    let range = self.update_spawn_timing(speed);
                    let delay = sample(&mut *self.rng.borrow_mut(), range);
                    self.half_delay = delay * 0.5;
                    self.phase = LoopPhase::Pickup;
                    return Step::Wait(self.half_delay);
                }
                LoopPhase::Pickup => {
                    bus.raise(self.spawn_pickup);
                    self.phase = LoopPhase::Pillars;
                    return Step::Wait(self.half_delay);
                }
                LoopPhase::Pillars => {
                    self.spawn_pair();
                    self.phase = LoopPhase::Plan;
                }
            }
        }
    }
}

/// Places a random pickup when `spawn_pickup` is raised
pub struct PickupSpawner {
    pool: Rc<RefCell<ObjectPool<Pickup>>>,
    rng: SharedRng,
    spawn_chance: FloatVariable,
    spawn_x: f32,
    height_range: Vec2,
    x_offset_range: Vec2,
    attempts: u32,
    spawned: u32,
}

impl PickupSpawner {
    pub fn new(
        config: &PickupConfig,
        spawn_x: f32,
        state: &SharedState,
        pool: Rc<RefCell<ObjectPool<Pickup>>>,
        rng: SharedRng,
    ) -> Self {
        Self {
            pool,
            rng,
            spawn_chance: state.pickup_spawn_chance.clone(),
            spawn_x,
            height_range: config.height_range,
            x_offset_range: config.x_offset_range,
            attempts: 0,
            spawned: 0,
        }
    }

    /// Times `spawn_pickup` was received
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn on_spawn_pickup(&mut self, _out: &mut Outbox) {
        self.attempts += 1;
        let mut rng = self.rng.borrow_mut();
        if rng.gen::<f32>() > self.spawn_chance.get() {
            return;
        }
        let mut pool = self.pool.borrow_mut();
        let Some(handle) = pool.acquire_random_inactive(&mut *rng) else {
            debug!("no pickup available, skipping");
            return;
        };
        let position = Vec2::new(
            self.spawn_x + sample(&mut *rng, self.x_offset_range),
            sample(&mut *rng, self.height_range),
        );
        if let Some(pickup) = pool.get_mut(handle) {
            pickup.respawn(position);
            debug!(effect = pickup.effect.name(), x = position.x, y = position.y, "pickup spawned");
        }
        pool.activate(handle);
        self.spawned += 1;
    }
}

impl GameStateResponder for PickupSpawner {
    fn on_game_reset(&mut self, _out: &mut Outbox) {
        self.pool.borrow_mut().deactivate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::GameChannels;
    use crate::config::GameConfig;
    use crate::pool::PoolMode;
    use neon_runtime::{listen, subscribe_responder};
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn geometry_spans_ground_to_ceiling() {
        let config = PillarConfig {
            ceiling_height: 10.0,
            lower_height_range: Vec2::new(3.0, 3.0),
            gap_height_range: Vec2::new(2.0, 2.0),
            ..PillarConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let pair = PillarPair::sample(&config, &mut rng);
        assert_eq!(pair.upper_height, 5.0);
        assert_eq!(pair.lower_center_y, 1.5);
        assert_eq!(pair.upper_center_y, 7.5);
        assert_eq!(pair.gap_center_y(), 4.0);
    }

    #[test]
    fn sampled_pairs_always_fill_the_column() {
        let config = PillarConfig::default();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let pair = PillarPair::sample(&config, &mut rng);
            let total = pair.lower_height + pair.gap_height + pair.upper_height;
            assert!((total - config.ceiling_height).abs() < 1e-4);
            assert!(pair.upper_height >= 0.0);
            assert!(pair.width >= config.width_range.x && pair.width <= config.width_range.y);
        }
    }

    struct Fixture {
        bus: EventBus,
        channels: GameChannels,
        scheduler: Rc<Scheduler>,
        state: SharedState,
        pillars: Rc<RefCell<ObjectPool<Pillar>>>,
        pickups: Rc<RefCell<ObjectPool<Pickup>>>,
        pillar_spawner: Rc<RefCell<PillarSpawner>>,
        pickup_spawner: Rc<RefCell<PickupSpawner>>,
    }

    fn fixture(spawn_chance: f32) -> Fixture {
        let bus = EventBus::new();
        let channels = GameChannels::new(&bus);
        let mut config = GameConfig::default();
        config.pickups.spawn_chance = spawn_chance;
        let state = SharedState::new(&config);
        let scheduler = Rc::new(Scheduler::new());
        let rng: SharedRng = Rc::new(RefCell::new(StdRng::seed_from_u64(42)));

        let pillars = Rc::new(RefCell::new(ObjectPool::new("pillars", PoolMode::Growable)));
        pillars.borrow_mut().initialize(vec![Pillar::new()], 1, None);
        let pickups = Rc::new(RefCell::new(ObjectPool::new("pickups", PoolMode::Fixed)));
        let protos = config.pickups.prototypes.iter().map(Pickup::from_prototype).collect();
        pickups.borrow_mut().initialize(protos, 1, None);

        let pillar_spawner = Rc::new(RefCell::new(PillarSpawner::new(
            &config.pillars,
            &state,
            pillars.clone(),
            rng.clone(),
            channels.spawn_pickup,
            scheduler.clone(),
        )));
        let pickup_spawner = Rc::new(RefCell::new(PickupSpawner::new(
            &config.pickups,
            config.pillars.spawn_x,
            &state,
            pickups.clone(),
            rng,
        )));
        let _ = subscribe_responder(&bus, &channels.lifecycle, pillar_spawner.clone());
        let _ = subscribe_responder(&bus, &channels.lifecycle, pickup_spawner.clone());
        listen(&bus, channels.spawn_pickup, pickup_spawner.clone(), PickupSpawner::on_spawn_pickup);

        Fixture {
            bus,
            channels,
            scheduler,
            state,
            pillars,
            pickups,
            pillar_spawner,
            pickup_spawner,
        }
    }

    fn run_for(f: &Fixture, secs: f32) {
        for _ in 0..(secs / DT).round() as usize {
            f.scheduler.tick(DT, &f.bus);
        }
    }

    #[test]
    fn one_interval_spawns_one_pair() {
        let f = fixture(1.0);
        f.state.game_speed.set(4.0);
        f.bus.raise(f.channels.lifecycle.tutorial_end);

        // At speed 4 one iteration takes 3-4s; the next pickup attempt comes
        // no earlier than 4.5s.
        run_for(&f, 4.2);
        assert_eq!(f.pillar_spawner.borrow().spawned_pairs(), 1);
        assert_eq!(f.pillars.borrow().active_count(), 2);
        assert_eq!(f.pickup_spawner.borrow().attempts(), 1);
        assert!(f.pickups.borrow().active_count() <= 1);

        let range = f.state.pillar_spawn_time_range.get();
        assert_eq!(range, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn pair_is_placed_at_spawn_x() {
        let f = fixture(0.0);
        f.state.game_speed.set(4.0);
        f.bus.raise(f.channels.lifecycle.tutorial_end);
        run_for(&f, 4.2);

        let pool = f.pillars.borrow();
        let mut pair: Vec<_> = pool.iter_active().map(|(_, p)| p.body).collect();
        assert_eq!(pair.len(), 2);
        pair.sort_by(|a, b| a.center.y.total_cmp(&b.center.y));
        assert_eq!(pair[0].center.x, 14.0);
        assert_eq!(pair[0].size.x, pair[1].size.x);
        let top = pair[1].max().y;
        assert!((top - 10.0).abs() < 1e-4);
        assert_eq!(f.pickups.borrow().active_count(), 0);
    }

    #[test]
    fn pool_grows_when_pillars_stay_on_screen() {
        let f = fixture(0.0);
        f.state.game_speed.set(4.0);
        f.bus.raise(f.channels.lifecycle.tutorial_end);
        run_for(&f, 12.5);
        let pairs = f.pillar_spawner.borrow().spawned_pairs();
        assert!(pairs >= 3);
        assert_eq!(f.pillars.borrow().active_count(), 2 * pairs as usize);
        assert!(f.pillars.borrow().len() >= 6);
    }

    #[test]
    fn pool_miss_spawns_no_pair() {
        let f = fixture(0.0);
        *f.pillars.borrow_mut() = ObjectPool::new("pillars", PoolMode::Fixed);
        f.state.game_speed.set(4.0);
        f.bus.raise(f.channels.lifecycle.tutorial_end);
        run_for(&f, 4.2);
        assert_eq!(f.pillar_spawner.borrow().spawned_pairs(), 0);
        assert_eq!(f.pillars.borrow().active_count(), 0);
        assert!(f.pillar_spawner.borrow().is_running());
    }

    #[test]
    fn death_stops_and_reset_clears() {
        let f = fixture(1.0);
        f.state.game_speed.set(4.0);
        f.bus.raise(f.channels.lifecycle.tutorial_end);
        run_for(&f, 4.2);
        f.bus.raise(f.channels.lifecycle.player_died);
        assert!(!f.pillar_spawner.borrow().is_running());

        run_for(&f, 10.0);
        assert_eq!(f.pillar_spawner.borrow().spawned_pairs(), 1);

        f.bus.raise(f.channels.lifecycle.game_reset);
        assert_eq!(f.pillars.borrow().active_count(), 0);
        assert_eq!(f.pickups.borrow().active_count(), 0);
    }

    #[test]
    fn zero_speed_waits_instead_of_dividing() {
        let f = fixture(1.0);
        f.state.game_speed.set(0.0);
        f.bus.raise(f.channels.lifecycle.tutorial_end);
        run_for(&f, 5.0);
        assert_eq!(f.pillar_spawner.borrow().spawned_pairs(), 0);
        assert!(f.pillar_spawner.borrow().is_running());

        f.state.game_speed.set(4.0);
        run_for(&f, 4.2);
        assert_eq!(f.pillar_spawner.borrow().spawned_pairs(), 1);
    }

    #[test]
    fn restart_keeps_a_single_loop() {
        let f = fixture(0.0);
        f.state.game_speed.set(4.0);
        f.bus.raise(f.channels.lifecycle.tutorial_end);
        f.bus.raise(f.channels.lifecycle.tutorial_end);
        run_for(&f, 4.2);
        assert_eq!(f.pillar_spawner.borrow().spawned_pairs(), 1);
        assert_eq!(f.scheduler.active_count(), 1);
    }

    #[test]
    fn fixed_pickup_pool_miss_is_ignored() {
        let f = fixture(1.0);
        let total = f.pickups.borrow().len();
        for _ in 0..total + 3 {
            f.bus.raise(f.channels.spawn_pickup);
        }
        assert_eq!(f.pickups.borrow().active_count(), total);
        assert_eq!(f.pickup_spawner.borrow().spawned() as usize, total);
        assert_eq!(f.pickup_spawner.borrow().attempts() as usize, total + 3);
    }
}
