//! Ground collision response
//!
//! A ground overlap only counts as a landing when the body came from above:
//! its hitbox bottom last tick was at or above the platform top (within a
//! tolerance) and it is not moving upward. Side and underside hits fail the
//! first test, jumps through a platform from below fail the second.

use super::body::Body;
use crate::geom::Rect;

/// Whether an overlap with `platform` should be treated as landing on it
pub fn is_landing(body: &Body, platform: &Rect, tolerance: f32) -> bool {
    body.prev_hitbox_rect().bottom() <= platform.top() + tolerance && body.velocity.y >= 0.0
}

/// Rest the body's hitbox on top of `platform` and stop its fall
pub fn land_on(body: &mut Body, platform: &Rect) {
    let overlap = body.hitbox_rect().bottom() - platform.top();
    body.position.y -= overlap;
    body.velocity.y = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::LANDING_TOLERANCE;
    use glam::Vec2;

    const PLATFORM: Rect = Rect {
        x: 0.0,
        y: 100.0,
        width: 200.0,
        height: 20.0,
    };

    fn falling(prev_y: f32, y: f32, vy: f32) -> Body {
        Body {
            position: Vec2::new(50.0, y),
            prev_position: Vec2::new(50.0, prev_y),
            velocity: Vec2::new(0.0, vy),
            size: Vec2::new(20.0, 30.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_landing_from_above() {
        // Bottom went from 95 to 105
        let body = falling(65.0, 75.0, 200.0);
        assert!(is_landing(&body, &PLATFORM, LANDING_TOLERANCE));
    }

    #[test]
    fn test_landing_within_tolerance() {
        // Previous bottom 108 is below the top but within 10px
        let body = falling(78.0, 85.0, 50.0);
        assert!(is_landing(&body, &PLATFORM, LANDING_TOLERANCE));
        assert!(!is_landing(&body, &PLATFORM, 0.0));
    }

    #[test]
    fn test_side_hit_is_not_landing() {
        // Already well inside the platform's vertical span last tick
        let body = falling(90.0, 90.0, 0.0);
        assert!(!is_landing(&body, &PLATFORM, LANDING_TOLERANCE));
    }

    #[test]
    fn test_rising_body_is_not_landing() {
        let body = falling(72.0, 71.0, -100.0);
        assert!(!is_landing(&body, &PLATFORM, LANDING_TOLERANCE));
    }

    #[test]
    fn test_land_on_snaps_to_top() {
        let mut body = falling(65.0, 78.0, 300.0);
        land_on(&mut body, &PLATFORM);
        assert_eq!(body.bottom(), 100.0);
        assert_eq!(body.velocity.y, 0.0);
    }
}
