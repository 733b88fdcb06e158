//! Pooled world entities

use neon_core::{Color, Rect, Vec2};

use crate::config::PickupPrototype;
use crate::effects::PickupEffect;
use crate::pool::Poolable;

/// One half of an obstacle pair
#[derive(Debug, Clone, PartialEq)]
pub struct Pillar {
    pub body: Rect,
}

impl Pillar {
    pub fn new() -> Self {
        Self {
            body: Rect::new(Vec2::ZERO, Vec2::new(1.0, 1.0)),
        }
    }

    pub fn set_height(&mut self, height: f32) {
        self.body.size.y = height;
    }

    pub fn set_width(&mut self, width: f32) {
        self.body.size.x = width;
    }

    pub fn height(&self) -> f32 {
        self.body.size.y
    }
}

impl Default for Pillar {
    fn default() -> Self {
        Self::new()
    }
}

impl Poolable for Pillar {
    fn body(&self) -> &Rect {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Rect {
        &mut self.body
    }
}

/// A collectible that grants an effect
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub body: Rect,
    pub effect: PickupEffect,
    pub color: Color,
    picked_up: bool,
}

impl Pickup {
    pub fn new(effect: PickupEffect, size: Vec2) -> Self {
        Self {
            body: Rect::new(Vec2::ZERO, size),
            effect,
            color: effect_color(&effect),
            picked_up: false,
        }
    }

    pub fn from_prototype(proto: &PickupPrototype) -> Self {
        Self::new(proto.effect, proto.size)
    }

    /// Mark as collected. Returns false if it already was.
    pub fn pick_up(&mut self) -> bool {
        if self.picked_up {
            return false;
        }
        self.picked_up = true;
        true
    }

    pub fn is_picked_up(&self) -> bool {
        self.picked_up
    }

    /// Prepare a pooled pickup for reuse at `position`
    pub fn respawn(&mut self, position: Vec2) {
        self.body.center = position;
        self.picked_up = false;
    }
}

fn effect_color(effect: &PickupEffect) -> Color {
    match effect {
        PickupEffect::Bonus(_) => Color::from_hex(0xFFD700),
        PickupEffect::Heal(_) => Color::from_hex(0x39FF14),
        PickupEffect::Shield(_) => Color::MAGENTA,
        PickupEffect::Speed(d) if *d > 0.0 => Color::from_hex(0xFF3131),
        PickupEffect::Speed(_) => Color::CYAN,
    }
}

impl Poolable for Pickup {
    fn body(&self) -> &Rect {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Rect {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pillar_sizing() {
        let mut p = Pillar::new();
        p.set_height(3.5);
        p.set_width(1.2);
        assert_eq!(p.body.size, Vec2::new(1.2, 3.5));
        assert_eq!(p.height(), 3.5);
    }

    #[test]
    fn pickup_collected_once_until_respawn() {
        let mut p = Pickup::new(PickupEffect::Bonus(1), Vec2::new(0.5, 0.5));
        assert!(p.pick_up());
        assert!(!p.pick_up());
        p.respawn(Vec2::new(10.0, 4.0));
        assert!(!p.is_picked_up());
        assert!(p.pick_up());
        assert_eq!(p.body.center, Vec2::new(10.0, 4.0));
    }
}
