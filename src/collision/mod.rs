//! Axis-aligned collision primitives shared by movement, bullets, and pickups.
//!
//! World collision is whole-step: a proposed move is applied only when the
//! moved hitbox clears every solid collider in the loaded window, otherwise
//! the entity stays put for the frame. There is no sliding along an axis.

use bevy::prelude::*;

use crate::assets::EntityHitboxConfig;

/// True when the two rects share strictly positive area. Edge or corner
/// contact does not count as a collision.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

/// Hitbox for a live entity. The anchor `(x, y)` is the foot line: with zero
/// offsets the hitbox bottom edge lands exactly on `y` and the box extends
/// one scaled sprite height upward.
///
/// All scale math runs in f64 with truncation toward zero so table-driven
/// fractions produce the same integer pixels on every platform.
pub fn entity_hitbox(
    x: f32,
    y: f32,
    sprite_w: f32,
    sprite_h: f32,
    cfg: &EntityHitboxConfig,
) -> Rect {
    let w = (f64::from(sprite_w) * cfg.w).trunc();
    let h = (f64::from(sprite_h) * cfg.h).trunc();
    let hx = f64::from(x) + (f64::from(sprite_w) * cfg.x_off).trunc();
    let hy = f64::from(y) - (h * (1.0 + cfg.y_off)).trunc();
    Rect::new(hx as f32, hy as f32, (hx + w) as f32, (hy + h) as f32)
}

/// The same rect shifted by `delta`.
pub fn translated(rect: Rect, delta: Vec2) -> Rect {
    Rect::from_corners(rect.min + delta, rect.max + delta)
}

/// Component tracking health and damage.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Apply damage and return the amount actually dealt (never drops
    /// `current` below zero).
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    /// Restore health up to `max` and return the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let actual = amount.min(self.max - self.current).max(0.0);
        self.current += actual;
        actual
    }

    /// Grow the health pool and grant the same amount as current health.
    pub fn raise_max(&mut self, amount: f32) {
        self.max += amount;
        self.current += amount;
    }
}
