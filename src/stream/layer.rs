//! A single streaming band of content
//!
//! The layer keeps a populated frontier: everything left of `frontier_x` has
//! already been generated. Scrolling moves the visible window; whenever the
//! window's right edge passes the frontier the populate callback is asked for
//! more content, and anything that has slid fully off the left edge is
//! evicted back into its pool.

use std::collections::HashMap;

use glam::Vec2;

use super::pool::ObjectPool;
use crate::consts::{DEFAULT_POOL_CAPACITY, MAX_Z_INDEX};
use crate::geom::Rect;
use crate::physics::BodyHandle;
use crate::{Error, Result};

/// Content generator for a layer.
///
/// Called with the layer and the frontier x. Returns the width of content
/// placed starting at x. Zero, negative or NaN means "nothing more right now"
/// and ends the current pass.
pub trait Populate {
    fn populate(&mut self, layer: &mut StreamingLayer, x: f32) -> f32;
}

impl<F> Populate for F
where
    F: FnMut(&mut StreamingLayer, f32) -> f32,
{
    fn populate(&mut self, layer: &mut StreamingLayer, x: f32) -> f32 {
        self(layer, x)
    }
}

/// Opaque identity of a view within its layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u32);

/// Pools are keyed by object kind and a caller-chosen group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub kind: String,
    pub group: String,
}

/// Parameters a pooled view is (re)initialised with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewInit {
    pub frame: Rect,
    pub opacity: f32,
}

impl From<Rect> for ViewInit {
    fn from(frame: Rect) -> Self {
        Self {
            frame,
            opacity: 1.0,
        }
    }
}

/// A spawned object living in a layer
#[derive(Debug, Clone)]
pub struct View {
    id: ViewId,
    pub kind: String,
    /// Frame in layer-local coordinates
    pub frame: Rect,
    pub opacity: f32,
    pub visible: bool,
    /// Physics body backing this view, if any
    pub body: Option<BodyHandle>,
    pool: Option<PoolKey>,
}

impl View {
    fn new(id: ViewId, kind: &str, pool: Option<PoolKey>) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            frame: Rect::default(),
            opacity: 1.0,
            visible: false,
            body: None,
            pool,
        }
    }

    /// A view owned by no layer, e.g. a fixed background
    pub(crate) fn standalone(kind: &str, init: ViewInit) -> Self {
        let mut view = Self::new(ViewId(0), kind, None);
        view.reset(init);
        view
    }

    fn reset(&mut self, init: ViewInit) {
        self.frame = init.frame;
        self.opacity = init.opacity;
        self.visible = true;
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Pool this view returns to on eviction (None for unpooled views)
    pub fn pool_key(&self) -> Option<&PoolKey> {
        self.pool.as_ref()
    }
}

/// View lifecycle notifications, drained by the scene boundary so it can
/// attach or detach physics bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerEvent {
    /// View became active (fresh or reused from a pool)
    Spawned { id: ViewId, body: Option<BodyHandle> },
    /// View left the layer; `pooled` views may come back later with the same id
    Evicted {
        id: ViewId,
        body: Option<BodyHandle>,
        pooled: bool,
    },
}

fn next_view_id(counter: &mut u32) -> ViewId {
    let id = ViewId(*counter);
    *counter += 1;
    id
}

/// One horizontally streaming band of content
pub struct StreamingLayer {
    distance: f32,
    /// Visual offset; always the negated scroll position
    offset: Vec2,
    viewport: Vec2,
    frontier_x: f32,
    objects: Vec<View>,
    pools: HashMap<PoolKey, ObjectPool<View>>,
    populator: Option<Box<dyn Populate>>,
    events: Vec<LayerEvent>,
    next_id: u32,
}

impl std::fmt::Debug for StreamingLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingLayer")
            .field("distance", &self.distance)
            .field("offset", &self.offset)
            .field("frontier_x", &self.frontier_x)
            .field("objects", &self.objects.len())
            .field("pools", &self.pools.len())
            .finish()
    }
}

impl StreamingLayer {
    /// Create a layer. `distance` must be finite and at least 1.
    pub fn new(distance: f32, viewport: Vec2, populator: Option<Box<dyn Populate>>) -> Result<Self> {
        if !distance.is_finite() || distance < 1.0 {
            return Err(Error::InvalidDistance(distance));
        }
        Ok(Self {
            distance,
            offset: Vec2::ZERO,
            viewport,
            frontier_x: 0.0,
            objects: Vec::new(),
            pools: HashMap::new(),
            populator,
            events: Vec::new(),
            next_id: 1,
        })
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Nearer layers stack above farther ones
    pub fn z_index(&self) -> f32 {
        MAX_Z_INDEX - self.distance
    }

    /// Visual offset of the layer (negated scroll position)
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Layer-local x of the left edge of the visible window
    pub fn scroll_x(&self) -> f32 {
        -self.offset.x
    }

    pub fn scroll_y(&self) -> f32 {
        -self.offset.y
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn width(&self) -> f32 {
        self.viewport.x
    }

    pub fn height(&self) -> f32 {
        self.viewport.y
    }

    /// World x up to which content has been generated
    pub fn frontier_x(&self) -> f32 {
        self.frontier_x
    }

    /// Right edge of the visible window
    pub fn window_end(&self) -> f32 {
        self.scroll_x() + self.viewport.x
    }

    /// Active views, oldest first
    pub fn objects(&self) -> &[View] {
        &self.objects
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.objects.iter().find(|v| v.id == id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.objects.iter_mut().find(|v| v.id == id)
    }

    pub fn pool(&self, kind: &str, group: &str) -> Option<&ObjectPool<View>> {
        self.pools.get(&PoolKey {
            kind: kind.to_string(),
            group: group.to_string(),
        })
    }

    pub fn set_populator(&mut self, populator: Box<dyn Populate>) {
        self.populator = Some(populator);
    }

    /// Take the lifecycle events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<LayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move the layer so its visible window starts at (x, y), then populate
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.offset = Vec2::new(-x, -y);
        self.populate();
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.scroll_to(self.scroll_x() + dx, self.scroll_y() + dy);
    }

    /// Fill the window up to its right edge, then evict what scrolled off.
    ///
    /// Returns how many times the populate callback was invoked.
    pub fn populate(&mut self) -> usize {
        let mut calls = 0;

        if let Some(mut populator) = self.populator.take() {
            let window_end = self.window_end();
            while self.frontier_x < window_end {
                let x = self.frontier_x;
                let width = populator.populate(self, x);
                calls += 1;

                if !(width.is_finite() && width > 0.0) {
                    log::trace!("populate at x={} returned {}, stopping this pass", x, width);
                    break;
                }
                self.frontier_x += width;
            }
            self.populator = Some(populator);
        }

        if calls > 0 {
            log::debug!(
                "Layer d={} populated to x={} ({} calls)",
                self.distance,
                self.frontier_x,
                calls
            );
        }

        self.evict_offscreen();
        calls
    }

    /// Evict every view whose right edge is left of the visible window
    fn evict_offscreen(&mut self) {
        let left = self.scroll_x();
        let (keep, gone): (Vec<View>, Vec<View>) = std::mem::take(&mut self.objects)
            .into_iter()
            .partition(|v| v.frame.right() >= left);
        self.objects = keep;
        for view in gone {
            self.recycle(view);
        }
    }

    fn recycle(&mut self, mut view: View) {
        view.visible = false;
        self.events.push(LayerEvent::Evicted {
            id: view.id,
            body: view.body,
            pooled: view.pool.is_some(),
        });

        if let Some(pool) = view.pool.as_ref().and_then(|key| self.pools.get_mut(key)) {
            pool.release(view);
        }
    }

    /// Get a view of `kind` from the `(kind, group)` pool and initialise it.
    ///
    /// The pool is created on first use, pre-filled to `pool_size_hint`
    /// (default 15). An exhausted pool grows.
    pub fn obtain_view(
        &mut self,
        kind: &str,
        group: &str,
        init: impl Into<ViewInit>,
        pool_size_hint: Option<usize>,
    ) -> &mut View {
        let key = PoolKey {
            kind: kind.to_string(),
            group: group.to_string(),
        };
        let counter = &mut self.next_id;

        let pool = self.pools.entry(key.clone()).or_insert_with(|| {
            let capacity = pool_size_hint.unwrap_or(DEFAULT_POOL_CAPACITY);
            log::info!("New pool for {}/{} (capacity {})", kind, group, capacity);
            ObjectPool::with_capacity(capacity, || {
                View::new(next_view_id(counter), kind, Some(key.clone()))
            })
        });

        let mut view = pool.obtain(|| View::new(next_view_id(counter), kind, Some(key.clone())));
        view.reset(init.into());
        self.push_spawned(view)
    }

    /// Add a view that isn't pooled; eviction drops it
    pub fn add_view(&mut self, kind: &str, init: impl Into<ViewInit>) -> &mut View {
        let mut view = View::new(next_view_id(&mut self.next_id), kind, None);
        view.reset(init.into());
        self.push_spawned(view)
    }

    fn push_spawned(&mut self, view: View) -> &mut View {
        self.events.push(LayerEvent::Spawned {
            id: view.id,
            body: view.body,
        });
        let index = self.objects.len();
        self.objects.push(view);
        &mut self.objects[index]
    }

    /// Remove one view before it scrolls off (e.g. a collected pickup).
    ///
    /// Returns false if the view isn't active in this layer.
    pub fn release_view(&mut self, id: ViewId) -> bool {
        match self.objects.iter().position(|v| v.id == id) {
            Some(index) => {
                let view = self.objects.remove(index);
                self.recycle(view);
                true
            }
            None => false,
        }
    }

    /// Evict everything, rewind the frontier to the left edge and repopulate
    pub fn clear(&mut self) {
        for view in std::mem::take(&mut self.objects) {
            self.recycle(view);
        }
        self.frontier_x = self.scroll_x();
        self.populate();
    }
}
