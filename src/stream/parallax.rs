//! Parallax controller
//!
//! Owns a stack of streaming layers and one canonical scroll position. Each
//! layer sees the scroll divided by its distance, so distant layers drift
//! slowly while the game layer (distance 1) tracks the camera exactly.

use glam::Vec2;

use super::layer::{LayerEvent, Populate, StreamingLayer, View, ViewInit};
use crate::Result;
use crate::consts::FOCUS_MARGIN;
use crate::geom::Rect;

/// Index of a layer inside its controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

/// Everything needed to add a layer
pub struct LayerConfig {
    /// Parallax factor, must be >= 1
    pub distance: f32,
    pub populate: Option<Box<dyn Populate>>,
}

impl LayerConfig {
    pub fn new(distance: f32, populate: impl Populate + 'static) -> Self {
        Self {
            distance,
            populate: Some(Box::new(populate)),
        }
    }
}

/// Drives every layer from a single scroll position
#[derive(Debug)]
pub struct ParallaxController {
    offset: Vec2,
    viewport: Vec2,
    layers: Vec<StreamingLayer>,
    background: Vec<View>,
}

impl ParallaxController {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport,
            layers: Vec::new(),
            background: Vec::new(),
        }
    }

    /// Current scroll position
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Add a layer aligned with the current scroll position.
    ///
    /// Fails if the distance is below 1.
    pub fn add_layer(&mut self, config: LayerConfig) -> Result<LayerId> {
        let mut layer = StreamingLayer::new(config.distance, self.viewport, config.populate)?;

        let scroll = self.offset / config.distance;
        layer.scroll_to(scroll.x, scroll.y);

        let id = LayerId(self.layers.len());
        log::info!(
            "Added parallax layer {} (distance {}, z {})",
            id.0,
            layer.distance(),
            layer.z_index()
        );
        self.layers.push(layer);
        Ok(id)
    }

    /// Add a decoration that never scrolls
    pub fn add_background_view(&mut self, kind: &str, init: impl Into<ViewInit>) {
        self.background.push(View::standalone(kind, init.into()));
    }

    pub fn background_views(&self) -> &[View] {
        &self.background
    }

    pub fn layer(&self, id: LayerId) -> Option<&StreamingLayer> {
        self.layers.get(id.0)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut StreamingLayer> {
        self.layers.get_mut(id.0)
    }

    pub fn layers(&self) -> &[StreamingLayer] {
        &self.layers
    }

    /// Take pending lifecycle events from every layer
    pub fn drain_events(&mut self) -> Vec<(LayerId, LayerEvent)> {
        self.layers
            .iter_mut()
            .enumerate()
            .flat_map(|(i, layer)| {
                layer
                    .drain_events()
                    .into_iter()
                    .map(move |event| (LayerId(i), event))
            })
            .collect()
    }

    /// Populated frontier of one layer
    pub fn frontier(&self, id: LayerId) -> Option<f32> {
        self.layer(id).map(StreamingLayer::frontier_x)
    }

    /// Scroll every layer so the camera sits at (x, y)
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.offset = Vec2::new(x, y);
        for layer in &mut self.layers {
            let d = layer.distance();
            layer.scroll_to(x / d, y / d);
        }
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.scroll_to(self.offset.x + dx, self.offset.y + dy);
    }

    /// Scroll using one layer's local coordinates
    pub fn scroll_layer_to(&mut self, id: LayerId, x: f32, y: f32) {
        if let Some(d) = self.layer(id).map(StreamingLayer::distance) {
            self.scroll_to(x * d, y * d);
        }
    }

    pub fn scroll_layer_by(&mut self, id: LayerId, dx: f32, dy: f32) {
        if let Some(d) = self.layer(id).map(StreamingLayer::distance) {
            self.scroll_by(dx * d, dy * d);
        }
    }

    /// Bring `target` (in the layer's coordinates) into view near the left
    /// edge, with a vertical scroll of `dy` in the same coordinates.
    ///
    /// The margin is in camera units, so on a layer at distance `d` the
    /// target ends up `FOCUS_MARGIN / d` from the edge.
    pub fn focus(&mut self, id: LayerId, target: &Rect, dy: f32) {
        if let Some(d) = self.layer(id).map(StreamingLayer::distance) {
            self.scroll_to(target.x * d - FOCUS_MARGIN, dy * d);
        }
    }

    /// Clear and repopulate every layer in place
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
    }
}
