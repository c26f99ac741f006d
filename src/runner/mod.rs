//! Reference game loop
//!
//! Drives the streaming and physics cores the way a real front end would:
//! scroll the camera to the player, tick physics, and turn collisions into
//! gameplay events. Rendering and input devices stay outside; callers feed
//! a [`TickInput`] per frame and consume the returned [`GameEvent`]s.

pub mod level;
pub mod state;
pub mod tick;

pub use state::{GameEvent, PLAYER_START, RunPhase, Runner, TickInput};
pub use tick::tick;
