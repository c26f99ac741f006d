//! Physics world
//!
//! Owns every body, integrates the active ones each tick and keeps the named
//! collision groups used for broad-phase AABB queries. A body only takes part
//! in either while it is attached to the live scene.

use std::collections::{BTreeSet, HashMap};

use glam::Vec2;
use slotmap::SlotMap;

use super::body::{Body, BodyHandle, BodyOptions};
use crate::dt_to_seconds;
use crate::geom::Rect;

/// One overlap found by [`PhysicsWorld::get_collisions`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub other: BodyHandle,
    /// Overlap of the two hitboxes
    pub intersection: Rect,
    /// From the queried hitbox centre to the other hitbox centre
    pub vector: Vec2,
}

/// Arena of bodies plus collision group registry
#[derive(Debug)]
pub struct PhysicsWorld {
    bodies: SlotMap<BodyHandle, Body>,
    groups: HashMap<String, BTreeSet<BodyHandle>>,
    enabled: bool,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            bodies: SlotMap::with_key(),
            groups: HashMap::new(),
            enabled: true,
        }
    }

    /// Pause or resume integration
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create a detached body
    pub fn create_body(&mut self, opts: BodyOptions) -> BodyHandle {
        let mut body = Body::default();
        body.apply(&opts);
        if let Some(groups) = &opts.groups {
            body.groups = groups.iter().cloned().collect();
        }
        self.bodies.insert(body)
    }

    /// Reapply options to an existing body. Returns false for a stale handle.
    pub fn configure(&mut self, handle: BodyHandle, opts: &BodyOptions) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.apply(opts);
        if let Some(groups) = &opts.groups {
            self.set_collision_groups(handle, groups.iter().map(String::as_str));
        }
        true
    }

    /// Detach and drop a body
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        self.leave_groups(handle);
        self.bodies.remove(handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutable access for motion and geometry. Group membership and the
    /// collision flag go through the world.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies currently attached to the scene
    pub fn active_bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter().filter(|(_, b)| b.attached)
    }

    /// Current members of a collision group
    pub fn group_members(&self, group: &str) -> impl Iterator<Item = BodyHandle> + '_ {
        self.groups.get(group).into_iter().flatten().copied()
    }

    /// Put a body on the live scene. Returns false for a stale handle.
    pub fn attach(&mut self, handle: BodyHandle) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        if !body.attached {
            body.attached = true;
            body.prev_position = body.position;
            self.join_groups(handle);
        }
        true
    }

    /// Take a body off the live scene. It keeps its state for a later attach.
    pub fn detach(&mut self, handle: BodyHandle) -> bool {
        self.leave_groups(handle);
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.attached = false;
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, handle: BodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(Body::is_active)
    }

    /// Replace a body's collision groups
    pub fn set_collision_groups<'a>(
        &mut self,
        handle: BodyHandle,
        groups: impl IntoIterator<Item = &'a str>,
    ) {
        if !self.bodies.contains_key(handle) {
            return;
        }
        self.leave_groups(handle);
        if let Some(body) = self.bodies.get_mut(handle) {
            body.groups = groups.into_iter().map(str::to_string).collect();
        }
        self.join_groups(handle);
    }

    pub fn set_collision_enabled(&mut self, handle: BodyHandle, enabled: bool) {
        let Some(body) = self.bodies.get_mut(handle) else {
            return;
        };
        body.collision_enabled = enabled;
        if enabled {
            self.join_groups(handle);
        } else {
            self.leave_groups(handle);
        }
    }

    pub fn in_collision_group(&self, handle: BodyHandle, group: &str) -> bool {
        self.bodies
            .get(handle)
            .is_some_and(|b| b.in_collision_group(group))
    }

    /// Register in every group of the body, if it is eligible
    fn join_groups(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get(handle) else {
            return;
        };
        if !(body.attached && body.collision_enabled) {
            return;
        }
        for group in &body.groups {
            self.groups.entry(group.clone()).or_default().insert(handle);
        }
    }

    fn leave_groups(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get(handle) else {
            return;
        };
        for group in &body.groups {
            if let Some(members) = self.groups.get_mut(group) {
                members.remove(&handle);
                if members.is_empty() {
                    self.groups.remove(group);
                }
            }
        }
    }

    /// Advance every active body by `dt`.
    ///
    /// `dt` is seconds, or milliseconds when above 1. Callers should clamp it
    /// (1/30 s keeps bodies from tunneling through thin platforms); any
    /// positive value is accepted.
    pub fn tick(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }
        let dt = dt_to_seconds(dt);
        if !(dt.is_finite() && dt > 0.0) {
            log::trace!("Ignoring physics tick with dt={}", dt);
            return;
        }

        for body in self
            .bodies
            .values_mut()
            .filter(|b| b.attached && b.physics_enabled)
        {
            body.integrate(dt);
        }
    }

    /// Every other active body in `group` whose hitbox overlaps this one's.
    ///
    /// Unknown or empty groups give an empty list.
    pub fn get_collisions(&self, handle: BodyHandle, group: &str) -> Vec<Collision> {
        let (Some(body), Some(members)) = (self.bodies.get(handle), self.groups.get(group)) else {
            return Vec::new();
        };
        let rect = body.hitbox_rect();

        members
            .iter()
            .filter(|&&other| other != handle)
            .filter_map(|&other| {
                let other_body = self.bodies.get(other)?;
                if !(other_body.attached && other_body.collision_enabled) {
                    return None;
                }
                let other_rect = other_body.hitbox_rect();
                let intersection = rect.intersection(&other_rect)?;
                Some(Collision {
                    other,
                    intersection,
                    vector: other_rect.center() - rect.center(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Hitbox;
    use proptest::prelude::*;

    fn boxed(world: &mut PhysicsWorld, pos: Vec2, size: Vec2, groups: &[&str]) -> BodyHandle {
        let handle = world.create_body(BodyOptions {
            position: Some(pos),
            size: Some(size),
            groups: Some(groups.iter().map(|g| g.to_string()).collect()),
            ..Default::default()
        });
        world.attach(handle);
        handle
    }

    #[test]
    fn test_golden_integration() {
        let mut world = PhysicsWorld::new();
        let h = world.create_body(BodyOptions {
            position: Some(Vec2::ZERO),
            velocity: Some(Vec2::new(10.0, 0.0)),
            acceleration: Some(Vec2::new(0.0, 100.0)),
            ..Default::default()
        });
        world.attach(h);

        world.tick(1.0);

        let body = world.body(h).unwrap();
        assert_eq!(body.velocity, Vec2::new(10.0, 100.0));
        // Position advances with the updated velocity
        assert_eq!(body.position, Vec2::new(10.0, 100.0));
        assert_eq!(body.prev_position, Vec2::ZERO);
    }

    #[test]
    fn test_tick_milliseconds() {
        let mut world = PhysicsWorld::new();
        let h = world.create_body(BodyOptions {
            velocity: Some(Vec2::new(100.0, 0.0)),
            ..Default::default()
        });
        world.attach(h);
        world.tick(500.0);
        assert!((world.body(h).unwrap().position.x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_detached_and_paused_bodies_do_not_move() {
        let mut world = PhysicsWorld::new();
        let opts = BodyOptions {
            velocity: Some(Vec2::new(1.0, 1.0)),
            ..Default::default()
        };
        let detached = world.create_body(opts.clone());
        let active = world.create_body(opts);
        world.attach(active);

        world.set_enabled(false);
        world.tick(0.5);
        assert_eq!(world.body(active).unwrap().position, Vec2::ZERO);

        world.set_enabled(true);
        world.tick(0.5);
        assert_eq!(world.body(detached).unwrap().position, Vec2::ZERO);
        assert_eq!(world.body(active).unwrap().position, Vec2::new(0.5, 0.5));

        world.body_mut(active).unwrap().physics_enabled = false;
        world.tick(0.5);
        assert_eq!(world.body(active).unwrap().position, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut world = PhysicsWorld::new();
        let h = world.create_body(BodyOptions {
            velocity: Some(Vec2::ONE),
            ..Default::default()
        });
        world.attach(h);
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            world.tick(dt);
        }
        assert_eq!(world.body(h).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_collisions_exclude_self() {
        let mut world = PhysicsWorld::new();
        let a = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &["ground"]);
        let b = boxed(&mut world, Vec2::splat(5.0), Vec2::splat(10.0), &["ground"]);

        let hits = world.get_collisions(a, "ground");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].other, b);
        assert_eq!(hits[0].intersection, Rect::new(5.0, 5.0, 5.0, 5.0));
        assert_eq!(hits[0].vector, Vec2::splat(5.0));
    }

    #[test]
    fn test_unknown_group_is_empty() {
        let mut world = PhysicsWorld::new();
        let a = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &[]);
        assert!(world.get_collisions(a, "nothing").is_empty());
    }

    #[test]
    fn test_detach_leaves_groups() {
        let mut world = PhysicsWorld::new();
        let player = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &["player"]);
        let coin = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &["coin"]);
        assert_eq!(world.get_collisions(player, "coin").len(), 1);

        world.detach(coin);
        assert!(!world.is_active(coin));
        assert!(world.get_collisions(player, "coin").is_empty());
        assert_eq!(world.group_members("coin").count(), 0);

        world.attach(coin);
        assert_eq!(world.get_collisions(player, "coin").len(), 1);
    }

    #[test]
    fn test_set_collision_groups_moves_membership() {
        let mut world = PhysicsWorld::new();
        let a = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &["x"]);
        world.set_collision_groups(a, ["y", "z"]);
        assert_eq!(world.group_members("x").count(), 0);
        assert_eq!(world.group_members("y").collect::<Vec<_>>(), vec![a]);
        assert!(world.in_collision_group(a, "z"));

        // Same groups again is a no-op
        world.set_collision_groups(a, ["y", "z"]);
        assert_eq!(world.group_members("y").count(), 1);
    }

    #[test]
    fn test_collision_disabled_body_is_invisible() {
        let mut world = PhysicsWorld::new();
        let a = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &[]);
        let b = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &["wall"]);
        world.set_collision_enabled(b, false);
        assert!(world.get_collisions(a, "wall").is_empty());
        world.set_collision_enabled(b, true);
        assert_eq!(world.get_collisions(a, "wall").len(), 1);
    }

    #[test]
    fn test_configure_and_remove() {
        let mut world = PhysicsWorld::new();
        let a = boxed(&mut world, Vec2::ZERO, Vec2::splat(10.0), &["g"]);
        assert!(world.configure(
            a,
            &BodyOptions {
                hitbox: Some(Hitbox::new(Vec2::splat(2.0), Vec2::splat(4.0))),
                groups: Some(vec!["h".to_string()]),
                ..Default::default()
            }
        ));
        assert_eq!(world.body(a).unwrap().hitbox_rect(), Rect::new(2.0, 2.0, 4.0, 4.0));
        assert!(world.in_collision_group(a, "h"));

        assert!(world.remove_body(a).is_some());
        assert_eq!(world.group_members("h").count(), 0);
        assert!(!world.configure(a, &BodyOptions::default()));
        assert!(!world.attach(a));
    }

    proptest! {
        #[test]
        fn prop_collision_symmetry(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0,
            aw in 1.0f32..40.0, ah in 1.0f32..40.0,
            bw in 1.0f32..40.0, bh in 1.0f32..40.0,
        ) {
            let mut world = PhysicsWorld::new();
            let a = boxed(&mut world, Vec2::new(ax, ay), Vec2::new(aw, ah), &["a"]);
            let b = boxed(&mut world, Vec2::new(bx, by), Vec2::new(bw, bh), &["b"]);

            let ab = world.get_collisions(a, "b");
            let ba = world.get_collisions(b, "a");
            prop_assert_eq!(ab.len(), ba.len());
            if let (Some(hit_ab), Some(hit_ba)) = (ab.first(), ba.first()) {
                prop_assert_eq!(hit_ab.other, b);
                prop_assert_eq!(hit_ba.other, a);
                prop_assert_eq!(hit_ab.intersection, hit_ba.intersection);
                prop_assert_eq!(hit_ab.vector, -hit_ba.vector);
            }
        }
    }
}
