//! Parallax Runner - core of an endless side-scrolling platformer
//!
//! Core modules:
//! - `stream`: Parallax layers that populate content ahead of the camera and evict it behind
//! - `physics`: Body integration and grouped AABB collision queries
//! - `geom`: Axis-aligned rectangles shared by both
//! - `runner`: Reference game loop wiring the two together
//! - `settings`: Data-driven configuration

pub mod error;
pub mod geom;
pub mod physics;
pub mod runner;
pub mod settings;
pub mod stream;

pub use error::{Error, Result};
pub use geom::Rect;
pub use settings::RunnerConfig;

/// Simulation constants
pub mod consts {
    /// Largest step the game loop feeds the physics (bounds tunneling through thin platforms)
    pub const MAX_DT: f32 = 1.0 / 30.0;
    /// A `dt` above this is taken to be milliseconds
    pub const DT_MS_THRESHOLD: f32 = 1.0;

    /// Pool capacity when `obtain_view` is given no hint
    pub const DEFAULT_POOL_CAPACITY: usize = 15;
    /// Layers are stacked so that nearer (smaller distance) layers draw on top
    pub const MAX_Z_INDEX: f32 = 1_000_000.0;
    /// Horizontal gap kept between the focused object and the left edge
    pub const FOCUS_MARGIN: f32 = 50.0;

    /// How far a previous bottom edge may sit below a platform top and still land
    pub const LANDING_TOLERANCE: f32 = 10.0;
}

/// Convert a frame delta to seconds.
///
/// Values above [`consts::DT_MS_THRESHOLD`] are treated as milliseconds.
#[inline]
pub fn dt_to_seconds(dt: f32) -> f32 {
    if dt > consts::DT_MS_THRESHOLD {
        dt / 1000.0
    } else {
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dt_to_seconds() {
        assert_eq!(dt_to_seconds(0.016), 0.016);
        assert_eq!(dt_to_seconds(1.0), 1.0);
        assert!((dt_to_seconds(16.0) - 0.016).abs() < 1e-6);
    }
}
