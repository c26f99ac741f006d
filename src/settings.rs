//! Runner configuration
//!
//! Persisted as JSON. Missing fields fall back to defaults so older config
//! files keep loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::consts::{DEFAULT_POOL_CAPACITY, LANDING_TOLERANCE, MAX_DT};

/// Decorative layer behind the game plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneryLayer {
    /// Object kind spawned on this layer
    pub kind: String,
    /// Parallax distance, >= 1
    pub distance: f32,
    /// Width of one piece of scenery
    pub piece_width: f32,
    pub piece_height: f32,
    /// Extra random spacing after each piece, 0..max_gap
    pub max_gap: f32,
    /// Piece bottom sits this far above the layer bottom
    pub baseline: f32,
}

impl SceneryLayer {
    pub fn new(kind: &str, distance: f32, piece_width: f32, piece_height: f32) -> Self {
        Self {
            kind: kind.to_string(),
            distance,
            piece_width,
            piece_height,
            max_gap: 0.0,
            baseline: 0.0,
        }
    }
}

/// Tunables for the reference runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Visible area in pixels
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Layers ===
    /// Parallax distance of the layer gameplay happens on
    pub game_layer_distance: f32,
    /// Background layers, farthest first
    pub scenery: Vec<SceneryLayer>,
    /// Platform widths to pick from
    pub platform_widths: Vec<f32>,
    pub platform_height: f32,
    /// Random horizontal gap after each platform, 0..max
    pub max_platform_gap: f32,
    /// Platform tops vary over this fraction of half the layer height,
    /// starting at the middle (0 gives a flat course)
    pub platform_y_variance: f32,
    /// Chance (0-1) of a coin above each platform
    pub coin_chance: f32,
    pub coin_size: f32,
    /// Initial capacity for each view pool
    pub pool_capacity: usize,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    /// Collidable inset on each side of the player sprite
    pub player_hitbox_inset: f32,
    pub run_speed: f32,
    /// Forward acceleration while running (px/s²)
    pub run_acceleration: f32,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_velocity: f32,

    // === Simulation ===
    /// Largest step fed to physics per frame (seconds)
    pub max_dt: f32,
    pub landing_tolerance: f32,
    /// Falling this far below the viewport bottom ends the run
    pub death_margin: f32,
    pub coin_score: u64,
    /// Seed for level generation
    pub seed: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            viewport_height: 576.0,

            game_layer_distance: 1.0,
            scenery: vec![
                SceneryLayer {
                    max_gap: 0.0,
                    baseline: 38.0,
                    ..SceneryLayer::new("farground", 20.0, 1024.0, 212.0)
                },
                SceneryLayer {
                    max_gap: 0.0,
                    baseline: 0.0,
                    ..SceneryLayer::new("midground", 10.0, 1024.0, 212.0)
                },
                SceneryLayer {
                    max_gap: 300.0,
                    baseline: 200.0,
                    ..SceneryLayer::new("cloud", 5.0, 200.0, 100.0)
                },
            ],
            platform_widths: vec![256.0, 512.0, 768.0, 1024.0],
            platform_height: 64.0,
            max_platform_gap: 100.0,
            platform_y_variance: 0.5,
            coin_chance: 0.3,
            coin_size: 32.0,
            pool_capacity: DEFAULT_POOL_CAPACITY,

            player_width: 64.0,
            player_height: 64.0,
            player_hitbox_inset: 12.0,
            run_speed: 200.0,
            run_acceleration: 20.0,
            gravity: 1400.0,
            jump_velocity: -650.0,

            max_dt: MAX_DT,
            landing_tolerance: LANDING_TOLERANCE,
            death_margin: 200.0,
            coin_score: 10,
            seed: 1,
        }
    }
}

impl RunnerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
