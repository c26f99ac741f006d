//! Infinite-world content streaming
//!
//! Layers generate content ahead of the camera through a populate callback
//! and hand evicted objects back to per-kind pools. The parallax controller
//! fans a single scroll position out to every layer, scaled by distance.

pub mod layer;
pub mod parallax;
pub mod pool;

pub use layer::{LayerEvent, PoolKey, Populate, StreamingLayer, View, ViewId, ViewInit};
pub use parallax::{LayerConfig, LayerId, ParallaxController};
pub use pool::ObjectPool;
