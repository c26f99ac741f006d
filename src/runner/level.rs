//! Level content generators
//!
//! Populate callbacks for the game layer (platforms and coins) and for the
//! scenery layers. Each owns a seeded RNG so a given seed always produces
//! the same course.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::geom::Rect;
use crate::settings::{RunnerConfig, SceneryLayer};
use crate::stream::{Populate, StreamingLayer};

pub const PLATFORM_KIND: &str = "platform";
pub const COIN_KIND: &str = "coin";
const COIN_GROUP: &str = "pickups";
const SCENERY_GROUP: &str = "scenery";

/// Platforms of random width at a random height in the lower half of the
/// layer, with the occasional coin floating above
pub fn platforms(config: &RunnerConfig) -> impl Populate + use<> {
    let mut rng = Pcg32::seed_from_u64(config.seed);
    let widths = config.platform_widths.clone();
    let height = config.platform_height;
    let max_gap = config.max_platform_gap;
    let y_variance = config.platform_y_variance;
    let coin_chance = config.coin_chance;
    let coin_size = config.coin_size;
    let capacity = config.pool_capacity;

    move |layer: &mut StreamingLayer, x: f32| -> f32 {
        if widths.is_empty() {
            return 0.0;
        }
        let width = widths[rng.random_range(0..widths.len())];
        let half_h = layer.height() / 2.0;
        let y = (half_h + half_h * y_variance * rng.random::<f32>()).floor();

        // One pool per platform size, like one sprite per size
        layer.obtain_view(
            PLATFORM_KIND,
            &format!("{width}"),
            Rect::new(x, y, width, height),
            Some(capacity),
        );

        if rng.random::<f32>() < coin_chance {
            let coin_x = x + (width - coin_size) / 2.0;
            let coin_y = y - coin_size * 2.5;
            layer.obtain_view(
                COIN_KIND,
                COIN_GROUP,
                Rect::new(coin_x, coin_y, coin_size, coin_size),
                Some(capacity),
            );
        }

        width + (rng.random::<f32>() * max_gap).floor()
    }
}

/// Repeating decoration pieces along the bottom of a background layer
pub fn scenery(layer_config: &SceneryLayer, seed: u64) -> impl Populate + use<> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let kind = layer_config.kind.clone();
    let width = layer_config.piece_width;
    let height = layer_config.piece_height;
    let max_gap = layer_config.max_gap;
    let baseline = layer_config.baseline;

    move |layer: &mut StreamingLayer, x: f32| -> f32 {
        let y = layer.height() - baseline - height;
        let view = layer.obtain_view(&kind, SCENERY_GROUP, Rect::new(x, y, width, height), None);
        if max_gap > 0.0 {
            view.opacity = rng.random_range(0.3..=1.0);
        }
        width + (rng.random::<f32>() * max_gap).floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn layer_with(populate: impl Populate + 'static) -> StreamingLayer {
        StreamingLayer::new(1.0, Vec2::new(1024.0, 576.0), Some(Box::new(populate))).unwrap()
    }

    #[test]
    fn test_platforms_fill_window_in_lower_half() {
        let config = RunnerConfig::default();
        let mut layer = layer_with(platforms(&config));
        layer.populate();

        assert!(layer.frontier_x() >= 1024.0);
        let platforms: Vec<_> = layer
            .objects()
            .iter()
            .filter(|v| v.kind == PLATFORM_KIND)
            .collect();
        assert!(!platforms.is_empty());
        for p in platforms {
            assert!(p.frame.y >= 288.0 && p.frame.y <= 432.0);
            assert!(config.platform_widths.contains(&p.frame.width));
        }
    }

    #[test]
    fn test_same_seed_same_course() {
        let config = RunnerConfig::default();
        let mut a = layer_with(platforms(&config));
        let mut b = layer_with(platforms(&config));
        a.scroll_to(5000.0, 0.0);
        b.scroll_to(5000.0, 0.0);

        let frames = |l: &StreamingLayer| l.objects().iter().map(|v| v.frame).collect::<Vec<_>>();
        assert_eq!(frames(&a), frames(&b));
    }

    #[test]
    fn test_zero_variance_gives_flat_course() {
        let config = RunnerConfig {
            platform_y_variance: 0.0,
            ..Default::default()
        };
        let mut layer = layer_with(platforms(&config));
        layer.scroll_to(3000.0, 0.0);
        assert!(
            layer
                .objects()
                .iter()
                .filter(|v| v.kind == PLATFORM_KIND)
                .all(|v| v.frame.y == 288.0)
        );
    }

    #[test]
    fn test_no_widths_stops_population() {
        let config = RunnerConfig {
            platform_widths: Vec::new(),
            ..Default::default()
        };
        let mut layer = layer_with(platforms(&config));
        assert_eq!(layer.populate(), 1);
        assert_eq!(layer.frontier_x(), 0.0);
    }

    #[test]
    fn test_scenery_sits_on_baseline() {
        let config = SceneryLayer {
            baseline: 40.0,
            ..SceneryLayer::new("hills", 10.0, 512.0, 100.0)
        };
        let mut layer = layer_with(scenery(&config, 3));
        layer.populate();
        assert_eq!(layer.objects().len(), 2);
        assert!(layer.objects().iter().all(|v| v.frame.bottom() == 576.0 - 40.0));
    }
}
