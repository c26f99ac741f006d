//! Lightweight 2D physics
//!
//! - Constant-acceleration, semi-implicit Euler integration
//! - Axis-aligned hitboxes, no rotation
//! - Named collision groups for broad-phase overlap queries
//!
//! Bodies are attached and detached explicitly by whoever owns the scene;
//! only attached bodies move or collide.

pub mod body;
pub mod landing;
pub mod world;

pub use body::{Body, BodyHandle, BodyOptions, Hitbox};
pub use landing::{is_landing, land_on};
pub use world::{Collision, PhysicsWorld};
