//! Turning input into player commands

use std::cell::RefCell;
use std::rc::Rc;

use neon_core::{Rect, Vec2};
use neon_runtime::{Command, CommandStream, InputState, ACTION_ASCEND};

/// Enqueues one ascend per press of the ascend action
pub struct PlayerController {
    commands: Rc<RefCell<CommandStream>>,
}

impl PlayerController {
    pub fn new(commands: Rc<RefCell<CommandStream>>) -> Self {
        Self { commands }
    }

    /// Returns true when a command was queued
    pub fn poll(&self, input: &InputState) -> bool {
        if input.is_action_just_pressed(ACTION_ASCEND) {
            self.commands.borrow_mut().enqueue(Command::Ascend);
            true
        } else {
            false
        }
    }
}

/// Flies the player through gaps for headless runs
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Height held when no gap is ahead
    cruise_height: f32,
    /// Only ascend while falling faster than this
    max_velocity: f32,
}

impl Autopilot {
    pub fn new(cruise_height: f32) -> Self {
        Self {
            cruise_height,
            max_velocity: -1.0,
        }
    }

    /// Centre of the nearest gap whose pillars the player has not yet
    /// passed, or the cruise height.
    ///
    /// A gap is the space between a pillar touching the ground and one
    /// directly above it at the same x.
    pub fn target_height<'a>(
        &self,
        player: &Rect,
        ground: f32,
        obstacles: impl IntoIterator<Item = &'a Rect>,
    ) -> f32 {
        let ahead: Vec<&Rect> = obstacles
            .into_iter()
            .filter(|r| r.max().x >= player.min().x)
            .collect();
        let nearest_lower = ahead
            .iter()
            .filter(|r| (r.min().y - ground).abs() < 1e-3)
            .min_by(|a, b| a.center.x.total_cmp(&b.center.x));
        let Some(lower) = nearest_lower else {
            return self.cruise_height;
        };
        let upper = ahead
            .iter()
            .filter(|r| (r.center.x - lower.center.x).abs() < 1e-3 && r.min().y > lower.max().y)
            .min_by(|a, b| a.min().y.total_cmp(&b.min().y));
        match upper {
            Some(upper) => (lower.max().y + upper.min().y) * 0.5,
            None => self.cruise_height.max(lower.max().y + 1.0),
        }
    }

    /// Whether to ascend this step
    pub fn should_ascend(&self, position: Vec2, velocity: f32, target: f32) -> bool {
        position.y < target && velocity < self.max_velocity
    }
}
