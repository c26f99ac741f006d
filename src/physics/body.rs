//! Physics bodies
//!
//! A body is plain data owned by the [`PhysicsWorld`](super::PhysicsWorld)
//! arena. Scene objects refer to it by [`BodyHandle`].

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geom::Rect;

slotmap::new_key_type! {
    /// Opaque, generational handle to a body in a `PhysicsWorld`
    pub struct BodyHandle;
}

/// Collidable footprint relative to the body's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub offset: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(offset: Vec2, size: Vec2) -> Self {
        Self { offset, size }
    }
}

/// Settings applied when creating or reconfiguring a body.
///
/// `None` fields leave the current value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyOptions {
    pub position: Option<Vec2>,
    pub velocity: Option<Vec2>,
    pub acceleration: Option<Vec2>,
    /// Visual bounds
    pub size: Option<Vec2>,
    pub hitbox: Option<Hitbox>,
    pub groups: Option<Vec<String>>,
}

/// A physics-enabled object
#[derive(Debug, Clone)]
pub struct Body {
    /// Top-left corner of the visual bounds
    pub position: Vec2,
    /// Position at the start of the last tick
    pub prev_position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Visual bounds; also the hitbox when no explicit one is set
    pub size: Vec2,
    pub hitbox: Option<Hitbox>,
    /// Integrate this body on tick
    pub physics_enabled: bool,
    pub(super) collision_enabled: bool,
    pub(super) groups: BTreeSet<String>,
    pub(super) attached: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            prev_position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            size: Vec2::ZERO,
            hitbox: None,
            physics_enabled: true,
            collision_enabled: true,
            groups: BTreeSet::new(),
            attached: false,
        }
    }
}

impl Body {
    /// Apply non-group options. Groups go through the world so membership stays in sync.
    pub(super) fn apply(&mut self, opts: &BodyOptions) {
        if let Some(position) = opts.position {
            self.position = position;
            self.prev_position = position;
        }
        if let Some(velocity) = opts.velocity {
            self.velocity = velocity;
        }
        if let Some(acceleration) = opts.acceleration {
            self.acceleration = acceleration;
        }
        if let Some(size) = opts.size {
            self.size = size;
        }
        if opts.hitbox.is_some() {
            self.hitbox = opts.hitbox;
        }
    }

    /// Semi-implicit Euler step: velocity first, then position from the new velocity
    pub(super) fn integrate(&mut self, dt: f32) {
        self.prev_position = self.position;
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Attached to the live scene
    pub fn is_active(&self) -> bool {
        self.attached
    }

    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    pub fn in_collision_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn stop_all_movement(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    // === Visual bounds ===

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    pub fn prev_rect(&self) -> Rect {
        Rect::from_pos_size(self.prev_position, self.size)
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    pub fn prev_bottom(&self) -> f32 {
        self.prev_position.y + self.size.y
    }

    pub fn set_left(&mut self, x: f32) -> &mut Self {
        self.position.x = x;
        self
    }

    pub fn set_right(&mut self, x: f32) -> &mut Self {
        self.position.x = x - self.size.x;
        self
    }

    pub fn set_top(&mut self, y: f32) -> &mut Self {
        self.position.y = y;
        self
    }

    pub fn set_bottom(&mut self, y: f32) -> &mut Self {
        self.position.y = y - self.size.y;
        self
    }

    pub fn set_center(&mut self, center: Vec2) -> &mut Self {
        self.position = center - self.size / 2.0;
        self
    }

    // === Hitbox ===

    fn hitbox_at(&self, position: Vec2) -> Rect {
        match self.hitbox {
            Some(hitbox) => Rect::from_pos_size(position + hitbox.offset, hitbox.size),
            None => Rect::from_pos_size(position, self.size),
        }
    }

    /// Hitbox in world coordinates, falling back to the visual bounds
    pub fn hitbox_rect(&self) -> Rect {
        self.hitbox_at(self.position)
    }

    /// Hitbox where the body was at the start of the last tick
    pub fn prev_hitbox_rect(&self) -> Rect {
        self.hitbox_at(self.prev_position)
    }
}
