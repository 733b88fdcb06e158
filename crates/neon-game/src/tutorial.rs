//! The tutorial course
//!
//! A fixed layout of practice pillars, a skip gate and a finish line that
//! scrolls in at the start of every run. Reaching the finish line or flying
//! through the skip gate ends the tutorial.

use neon_core::{EntityId, Rect, Vec2};
use neon_runtime::{BoolVariable, GameStateResponder, Outbox};
use tracing::debug;

use crate::config::{PillarConfig, TutorialConfig};
use crate::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialObjectKind {
    Obstacle,
    SkipGate,
    Finish,
}

#[derive(Debug, Clone)]
pub struct TutorialObject {
    pub id: EntityId,
    pub kind: TutorialObjectKind,
    pub body: Rect,
    start: Vec2,
    visible: bool,
}

impl TutorialObject {
    fn new(kind: TutorialObjectKind, body: Rect) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            body,
            start: body.center,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// What the player reached in the tutorial this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialTrigger {
    SkipGate,
    Finish,
}

pub struct Tutorial {
    objects: Vec<TutorialObject>,
    active: BoolVariable,
    despawn_x: f32,
}

impl Tutorial {
    pub fn new(config: &TutorialConfig, pillars: &PillarConfig, state: &SharedState) -> Self {
        let ground = pillars.ground_start;
        let ceiling = ground + pillars.ceiling_height;
        let width = pillars.width_range.x;
        let (gap_bottom, gap_top) = (config.pillar_gap.x, config.pillar_gap.y);

        let mut objects = Vec::new();
        for &x in &config.pillar_xs {
            let lower = gap_bottom - ground;
            let upper = ceiling - gap_top;
            objects.push(TutorialObject::new(
                TutorialObjectKind::Obstacle,
                Rect::new(Vec2::new(x, ground + lower * 0.5), Vec2::new(width, lower)),
            ));
            objects.push(TutorialObject::new(
                TutorialObjectKind::Obstacle,
                Rect::new(Vec2::new(x, gap_top + upper * 0.5), Vec2::new(width, upper)),
            ));
        }
        objects.push(TutorialObject::new(TutorialObjectKind::SkipGate, config.skip_gate));
        objects.push(TutorialObject::new(
            TutorialObjectKind::Finish,
            Rect::new(
                Vec2::new(config.finish_x, ground + pillars.ceiling_height * 0.5),
                Vec2::new(0.1, pillars.ceiling_height),
            ),
        ));

        state.tutorial_active.set(true);
        Self {
            objects,
            active: state.tutorial_active.clone(),
            despawn_x: pillars.despawn_x,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn objects(&self) -> &[TutorialObject] {
        &self.objects
    }

    /// Visible practice pillars
    pub fn obstacles(&self) -> impl Iterator<Item = &Rect> {
        self.objects
            .iter()
            .filter(|o| o.visible && o.kind == TutorialObjectKind::Obstacle)
            .map(|o| &o.body)
    }

    /// Move every visible object left by `dx`, hiding those past the
    /// despawn line
    pub fn scroll(&mut self, dx: f32) {
        if !self.is_active() {
            return;
        }
        for object in self.objects.iter_mut().filter(|o| o.visible) {
            object.body.center.x -= dx;
            if object.body.max().x < self.despawn_x {
                object.visible = false;
            }
        }
    }

    /// Check the player against the gate and the finish line.
    ///
    /// The finish line counts as reached once it has scrolled to the
    /// player's x position. At most one trigger fires; the object that fired
    /// is hidden so it cannot fire again.
    pub fn check(&mut self, player: &Rect) -> Option<TutorialTrigger> {
        if !self.is_active() {
            return None;
        }
        for object in self.objects.iter_mut().filter(|o| o.visible) {
            let trigger = match object.kind {
                TutorialObjectKind::SkipGate if object.body.overlaps(player) => {
                    TutorialTrigger::SkipGate
                }
                TutorialObjectKind::Finish if object.body.center.x <= player.center.x => {
                    TutorialTrigger::Finish
                }
                _ => continue,
            };
            object.visible = false;
            debug!(?trigger, "tutorial trigger");
            return Some(trigger);
        }
        None
    }
}

impl GameStateResponder for Tutorial {
    fn on_tutorial_end(&mut self, _out: &mut Outbox) {
        self.active.set(false);
        for object in &mut self.objects {
            object.visible = false;
        }
    }

    fn on_game_reset(&mut self, _out: &mut Outbox) {
        self.active.set(true);
        for object in &mut self.objects {
            object.body.center = object.start;
            object.visible = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn tutorial() -> (SharedState, Tutorial) {
        let config = GameConfig::default();
        let state = SharedState::new(&config);
        let tutorial = Tutorial::new(&config.tutorial, &config.pillars, &state);
        (state, tutorial)
    }

    fn player_at(y: f32) -> Rect {
        Rect::new(Vec2::new(0.0, y), Vec2::new(0.8, 0.8))
    }

    #[test]
    fn practice_pillars_leave_the_configured_gap() {
        let (_, tutorial) = tutorial();
        let obstacles: Vec<_> = tutorial.obstacles().copied().collect();
        assert_eq!(obstacles.len(), 4);
        assert_eq!(obstacles[0].max().y, 3.5);
        assert_eq!(obstacles[1].min().y, 6.5);
        assert_eq!(obstacles[1].max().y, 10.0);
    }

    #[test]
    fn finish_line_fires_once() {
        let (_, mut tutorial) = tutorial();
        let player = player_at(5.0);
        assert_eq!(tutorial.check(&player), None);

        tutorial.scroll(15.0);
        assert_eq!(tutorial.check(&player), Some(TutorialTrigger::Finish));
        assert_eq!(tutorial.check(&player), None);
    }

    #[test]
    fn skip_gate_overlap() {
        let (_, mut tutorial) = tutorial();
        tutorial.scroll(3.0);
        assert_eq!(tutorial.check(&player_at(5.0)), None);
        assert_eq!(tutorial.check(&player_at(9.4)), Some(TutorialTrigger::SkipGate));
    }

    #[test]
    fn end_hides_and_reset_restores() {
        let (state, mut tutorial) = tutorial();
        let mut out = Outbox::new();
        tutorial.scroll(4.0);
        tutorial.on_tutorial_end(&mut out);
        assert!(!state.tutorial_active.get());
        assert!(tutorial.objects().iter().all(|o| !o.is_visible()));
        assert_eq!(tutorial.check(&player_at(9.4)), None);

        tutorial.on_game_reset(&mut out);
        assert!(state.tutorial_active.get());
        assert!(tutorial.objects().iter().all(|o| o.is_visible()));
        assert_eq!(tutorial.objects()[0].body.center.x, 6.0);
    }

    #[test]
    fn objects_past_despawn_line_are_hidden() {
        let (_, mut tutorial) = tutorial();
        tutorial.scroll(22.0);
        let first = &tutorial.objects()[0];
        assert!(!first.is_visible());
        assert!(tutorial.objects().last().is_some_and(|o| o.is_visible()));
    }
}
