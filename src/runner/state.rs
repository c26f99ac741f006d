//! Runner state and core gameplay types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level;
use crate::Result;
use crate::physics::{BodyHandle, BodyOptions, Hitbox, PhysicsWorld};
use crate::settings::RunnerConfig;
use crate::stream::{LayerConfig, LayerEvent, LayerId, ParallaxController};

/// Where the player spawns, in game-layer coordinates
pub const PLAYER_START: Vec2 = Vec2::new(50.0, 50.0);

pub const PLAYER_GROUP: &str = "player";
pub const GROUND_GROUP: &str = "ground";
pub const COIN_GROUP: &str = "coin";

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    /// Player fell off the course; waiting for restart
    Dead,
}

/// Gameplay outcomes of a tick, for animation and audio glue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Landed,
    Collected { score: u64 },
    Died { distance: f32 },
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (tap/space); ignored while airborne
    pub jump: bool,
    /// Demo mode - jump automatically at platform edges
    pub idle_mode: bool,
}

/// A running game: streaming layers, physics and the player
#[derive(Debug)]
pub struct Runner {
    pub(super) config: RunnerConfig,
    pub(super) parallax: ParallaxController,
    pub(super) world: PhysicsWorld,
    pub(super) game_layer: LayerId,
    pub(super) player: BodyHandle,
    pub(super) phase: RunPhase,
    pub(super) grounded: bool,
    pub(super) score: u64,
    pub(super) time: f32,
}

impl Runner {
    /// Build the layer stack and spawn the player.
    ///
    /// Fails if any configured layer distance is below 1.
    pub fn new(config: RunnerConfig) -> Result<Self> {
        let viewport = Vec2::new(config.viewport_width, config.viewport_height);
        let mut parallax = ParallaxController::new(viewport);

        for (i, layer) in config.scenery.iter().enumerate() {
            let seed = config.seed.wrapping_add(i as u64 + 1);
            parallax.add_layer(LayerConfig::new(layer.distance, level::scenery(layer, seed)))?;
        }
        let game_layer = parallax.add_layer(LayerConfig::new(
            config.game_layer_distance,
            level::platforms(&config),
        ))?;

        let mut world = PhysicsWorld::new();
        let player = world.create_body(player_options(&config));
        world.attach(player);

        let mut runner = Self {
            config,
            parallax,
            world,
            game_layer,
            player,
            phase: RunPhase::Running,
            grounded: false,
            score: 0,
            time: 0.0,
        };
        runner.sync_bodies();

        log::info!("Runner initialized with seed: {}", runner.config.seed);
        Ok(runner)
    }

    /// Start over from the beginning, reusing every pooled view and body
    pub fn restart(&mut self) {
        self.parallax.scroll_to(0.0, 0.0);
        self.parallax.clear();

        let opts = player_options(&self.config);
        self.world.configure(self.player, &opts);
        self.world.attach(self.player);
        self.sync_bodies();

        self.phase = RunPhase::Running;
        self.grounded = false;
        self.score = 0;
        self.time = 0.0;
        log::info!("Runner restarted");
    }

    /// Attach bodies for views that entered the game layer, detach those that left.
    ///
    /// Events from scenery layers carry no bodies and are dropped.
    pub(super) fn sync_bodies(&mut self) {
        for (layer_id, event) in self.parallax.drain_events() {
            if layer_id != self.game_layer {
                continue;
            }
            match event {
                LayerEvent::Spawned { id, .. } => {
                    let Some(layer) = self.parallax.layer_mut(layer_id) else {
                        continue;
                    };
                    // Spawned and evicted within the same pass
                    let Some(view) = layer.view_mut(id) else {
                        continue;
                    };
                    let group = match view.kind.as_str() {
                        level::PLATFORM_KIND => GROUND_GROUP,
                        level::COIN_KIND => COIN_GROUP,
                        _ => continue,
                    };
                    let opts = BodyOptions {
                        position: Some(view.frame.pos()),
                        velocity: Some(Vec2::ZERO),
                        size: Some(view.frame.size()),
                        groups: Some(vec![group.to_string()]),
                        ..Default::default()
                    };
                    // The live view knows its body even if it was recycled
                    // and obtained again since this event was queued
                    let handle = match view.body {
                        Some(handle) if self.world.configure(handle, &opts) => handle,
                        _ => {
                            let handle = self.world.create_body(opts);
                            if let Some(body) = self.world.body_mut(handle) {
                                body.physics_enabled = false;
                            }
                            handle
                        }
                    };
                    view.body = Some(handle);
                    self.world.attach(handle);
                }
                LayerEvent::Evicted {
                    body: Some(handle),
                    pooled,
                    ..
                } => {
                    if pooled {
                        self.world.detach(handle);
                    } else {
                        self.world.remove_body(handle);
                    }
                }
                LayerEvent::Evicted { body: None, .. } => {}
            }
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn parallax(&self) -> &ParallaxController {
        &self.parallax
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn game_layer(&self) -> LayerId {
        self.game_layer
    }

    pub fn player(&self) -> BodyHandle {
        self.player
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Seconds of simulated play since the last (re)start
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Horizontal distance run since the start
    pub fn distance(&self) -> f32 {
        self.world
            .body(self.player)
            .map_or(0.0, |b| b.position.x - PLAYER_START.x)
    }
}

fn player_options(config: &RunnerConfig) -> BodyOptions {
    let size = Vec2::new(config.player_width, config.player_height);
    let inset = config.player_hitbox_inset;
    BodyOptions {
        position: Some(PLAYER_START),
        velocity: Some(Vec2::new(config.run_speed, 0.0)),
        acceleration: Some(Vec2::new(config.run_acceleration, config.gravity)),
        size: Some(size),
        hitbox: Some(Hitbox::new(
            Vec2::new(inset, 0.0),
            Vec2::new(size.x - 2.0 * inset, size.y),
        )),
        groups: Some(vec![PLAYER_GROUP.to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;

    #[test]
    fn test_respawned_pooled_view_keeps_one_body() {
        let config = RunnerConfig {
            scenery: Vec::new(),
            ..Default::default()
        };
        let mut runner = Runner::new(config).unwrap();
        let bodies = runner.world.len();

        // Obtain, release and obtain the same pooled view between two syncs
        let layer = runner.parallax.layer_mut(runner.game_layer).unwrap();
        let frame = Rect::new(600.0, 300.0, 128.0, 64.0);
        let id = layer.obtain_view(level::PLATFORM_KIND, "spare", frame, Some(1)).id();
        assert!(layer.release_view(id));
        let again = layer.obtain_view(level::PLATFORM_KIND, "spare", frame, Some(1)).id();
        assert_eq!(again, id);

        runner.sync_bodies();

        assert_eq!(runner.world.len(), bodies + 1);
        let handle = runner
            .parallax
            .layer(runner.game_layer)
            .and_then(|l| l.view(id))
            .and_then(|v| v.body)
            .unwrap();
        assert!(runner.world.is_active(handle));
        assert_eq!(runner.world.body(handle).unwrap().rect(), frame);
        assert_eq!(
            runner
                .world
                .group_members(GROUND_GROUP)
                .filter(|h| runner.world.body(*h).unwrap().rect() == frame)
                .count(),
            1
        );
    }

    #[test]
    fn test_restart_resets_run() {
        let mut runner = Runner::new(RunnerConfig::default()).unwrap();
        runner.score = 30;
        runner.phase = RunPhase::Dead;
        runner.world.detach(runner.player);

        runner.restart();

        assert_eq!(runner.score(), 0);
        assert_eq!(runner.phase(), RunPhase::Running);
        assert!(runner.world.is_active(runner.player));
        assert_eq!(runner.distance(), 0.0);
    }
}
