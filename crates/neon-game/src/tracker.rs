//! Game speed and score trackers

use neon_runtime::{
    ChannelId, FloatVariable, GameStateResponder, IntVariable, Outbox, StringVariable, Variable,
};
use tracing::{debug, info};

use crate::config::SpeedConfig;
use crate::state::{HighScoreEntry, SharedState};

/// Raises game speed steadily once the tutorial is over
pub struct SpeedTracker {
    game_speed: FloatVariable,
    starting_speed: f32,
    /// Speed gained per second while accelerating
    acceleration: f32,
    accelerating: bool,
}

impl SpeedTracker {
    pub fn new(config: &SpeedConfig, state: &SharedState) -> Self {
        state.game_speed.set(0.0);
        Self {
            game_speed: state.game_speed.clone(),
            starting_speed: config.starting_speed,
            acceleration: config.speed_delta / config.speed_up_interval,
            accelerating: false,
        }
    }

    pub fn is_accelerating(&self) -> bool {
        self.accelerating
    }

    pub fn update(&mut self, dt: f32) {
        if self.accelerating {
            self.game_speed.update(|s| *s += self.acceleration * dt);
        }
    }
}

impl GameStateResponder for SpeedTracker {
    fn on_game_start(&mut self, _out: &mut Outbox) {
        self.game_speed.set(self.starting_speed);
    }

    fn on_tutorial_end(&mut self, _out: &mut Outbox) {
        self.accelerating = true;
    }

    fn on_player_died(&mut self, _out: &mut Outbox) {
        self.accelerating = false;
        self.game_speed.set(0.0);
    }

    fn on_game_reset(&mut self, _out: &mut Outbox) {
        self.accelerating = false;
        self.game_speed.set(0.0);
    }
}

/// Accumulates distance travelled into the score
pub struct ScoreTracker {
    game_speed: FloatVariable,
    score_float: FloatVariable,
    score: IntVariable,
    bonus: IntVariable,
    bonus_multiplier: IntVariable,
    final_score: IntVariable,
    scoring: bool,
}

impl ScoreTracker {
    pub fn new(state: &SharedState) -> Self {
        let tracker = Self {
            game_speed: state.game_speed.clone(),
            score_float: state.score_float.clone(),
            score: state.score.clone(),
            bonus: state.bonus.clone(),
            bonus_multiplier: state.bonus_multiplier.clone(),
            final_score: state.final_score.clone(),
            scoring: false,
        };
        tracker.clear();
        tracker
    }

    pub fn is_scoring(&self) -> bool {
        self.scoring
    }

    pub fn update(&mut self, dt: f32) {
        if !self.scoring {
            return;
        }
        let speed = self.game_speed.get();
        self.score_float.update(|s| *s += speed * dt);
        let score = self.score_float.get().round() as i32;
        self.score.set(score);
        self.final_score
            .set(score + self.bonus.get() * self.bonus_multiplier.get());
    }

    fn clear(&self) {
        self.score_float.set(0.0);
        self.score.set(0);
        self.bonus.set(0);
        self.final_score.set(0);
    }
}

impl GameStateResponder for ScoreTracker {
    fn on_game_start(&mut self, _out: &mut Outbox) {
        self.scoring = true;
    }

    fn on_player_died(&mut self, _out: &mut Outbox) {
        self.scoring = false;
        info!(final_score = self.final_score.get(), "scoring stopped");
    }

    fn on_game_reset(&mut self, _out: &mut Outbox) {
        self.scoring = false;
        self.clear();
    }
}

/// Decides at death whether the final score makes the leaderboard, and
/// queues the post when the game is reset
pub struct FinalScoreEvaluator {
    final_score: IntVariable,
    min_high_score: IntVariable,
    player_name: StringVariable,
    pending: Variable<Option<HighScoreEntry>>,
    post_high_score: ChannelId,
    /// Final score of the last death when it made the leaderboard
    qualified_score: Option<i32>,
}

impl FinalScoreEvaluator {
    pub fn new(state: &SharedState, post_high_score: ChannelId) -> Self {
        state.player_name.set(String::new());
        Self {
            final_score: state.final_score.clone(),
            min_high_score: state.min_high_score.clone(),
            player_name: state.player_name.clone(),
            pending: state.pending_high_score.clone(),
            post_high_score,
            qualified_score: None,
        }
    }

    /// Whether the last death produced a leaderboard score
    pub fn is_new_high_score(&self) -> bool {
        self.qualified_score.is_some()
    }
}

impl GameStateResponder for FinalScoreEvaluator {
    fn on_player_died(&mut self, _out: &mut Outbox) {
        let final_score = self.final_score.get();
        let qualifies = final_score > self.min_high_score.get();
        self.qualified_score = qualifies.then_some(final_score);
        debug!(final_score, qualifies, "final score evaluated");
    }

    fn on_game_reset(&mut self, out: &mut Outbox) {
        if let Some(score) = self.qualified_score.take() {
            // Other reset listeners zero the live score, so the entry carries
            // the value captured at death.
            self.pending.set(Some(HighScoreEntry {
                name: self.player_name.get(),
                score,
            }));
            out.raise(self.post_high_score);
        }
        self.player_name.set(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::GameChannels;
    use crate::config::GameConfig;
    use neon_runtime::{subscribe_responder, EventBus};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn simulate(tracker: &Rc<RefCell<SpeedTracker>>, secs: f32) {
        for _ in 0..(secs / DT).round() as usize {
            tracker.borrow_mut().update(DT);
        }
    }

    #[test]
    fn speed_follows_lifecycle() {
        let bus = EventBus::new();
        let channels = GameChannels::new(&bus);
        let mut config = GameConfig::default();
        config.speed.speed_delta = 2.0;
        config.speed.speed_up_interval = 4.0;
        let state = SharedState::new(&config);
        let tracker = Rc::new(RefCell::new(SpeedTracker::new(&config.speed, &state)));
        let _sub = subscribe_responder(&bus, &channels.lifecycle, tracker.clone());

        bus.raise(channels.lifecycle.game_start);
        assert_eq!(state.game_speed.get(), 4.0);

        simulate(&tracker, 1.0);
        assert_eq!(state.game_speed.get(), 4.0, "no acceleration during tutorial");

        bus.raise(channels.lifecycle.tutorial_end);
        simulate(&tracker, 4.0);
        assert!((state.game_speed.get() - 6.0).abs() < 1e-3);

        bus.raise(channels.lifecycle.player_died);
        assert_eq!(state.game_speed.get(), 0.0);
        simulate(&tracker, 1.0);
        assert_eq!(state.game_speed.get(), 0.0);
    }

    #[test]
    fn score_accumulates_speed_and_bonus() {
        let bus = EventBus::new();
        let channels = GameChannels::new(&bus);
        let config = GameConfig::default();
        let state = SharedState::new(&config);
        let tracker = Rc::new(RefCell::new(ScoreTracker::new(&state)));
        let _sub = subscribe_responder(&bus, &channels.lifecycle, tracker.clone());

        state.game_speed.set(5.0);
        tracker.borrow_mut().update(1.0);
        assert_eq!(state.score.get(), 0, "not scoring before start");

        bus.raise(channels.lifecycle.game_start);
        for _ in 0..60 {
            tracker.borrow_mut().update(DT);
        }
        state.bonus.set(2);
        tracker.borrow_mut().update(0.0);
        assert_eq!(state.score.get(), 5);
        assert_eq!(state.final_score.get(), 25);

        bus.raise(channels.lifecycle.player_died);
        tracker.borrow_mut().update(1.0);
        assert_eq!(state.score.get(), 5);

        bus.raise(channels.lifecycle.game_reset);
        assert_eq!(state.score.get(), 0);
        assert_eq!(state.bonus.get(), 0);
        assert_eq!(state.score_float.get(), 0.0);
    }

    #[test]
    fn qualifying_score_posted_on_reset() {
        let bus = EventBus::new();
        let channels = GameChannels::new(&bus);
        let config = GameConfig::default();
        let state = SharedState::new(&config);
        let evaluator = Rc::new(RefCell::new(FinalScoreEvaluator::new(
            &state,
            channels.post_high_score,
        )));
        let _sub = subscribe_responder(&bus, &channels.lifecycle, evaluator.clone());

        let posted = Rc::new(RefCell::new(Vec::new()));
        let p = posted.clone();
        let pending = state.pending_high_score.clone();
        bus.register(channels.post_high_score, move |_| {
            if let Some(entry) = pending.take() {
                p.borrow_mut().push(entry);
            }
        });

        state.min_high_score.set(100);
        state.final_score.set(150);
        bus.raise(channels.lifecycle.player_died);
        assert!(evaluator.borrow().is_new_high_score());
        state.player_name.set("ace".into());

        bus.raise(channels.lifecycle.game_reset);
        assert_eq!(
            *posted.borrow(),
            vec![HighScoreEntry {
                name: "ace".into(),
                score: 150
            }]
        );
        assert_eq!(state.player_name.get(), "");

        // A second reset without a new death posts nothing.
        bus.raise(channels.lifecycle.game_reset);
        assert_eq!(posted.borrow().len(), 1);
    }

    #[test]
    fn score_at_threshold_does_not_qualify() {
        let bus = EventBus::new();
        let channels = GameChannels::new(&bus);
        let config = GameConfig::default();
        let state = SharedState::new(&config);
        let evaluator = Rc::new(RefCell::new(FinalScoreEvaluator::new(
            &state,
            channels.post_high_score,
        )));
        let _sub = subscribe_responder(&bus, &channels.lifecycle, evaluator.clone());
        let raised = Rc::new(Cell::new(0));
        let r = raised.clone();
        bus.register(channels.post_high_score, move |_| r.set(r.get() + 1));

        state.min_high_score.set(100);
        state.final_score.set(100);
        bus.raise(channels.lifecycle.player_died);
        bus.raise(channels.lifecycle.game_reset);
        assert_eq!(raised.get(), 0);
    }
}
