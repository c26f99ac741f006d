//! Per-frame update
//!
//! Order within a frame: input, physics integration, camera, streaming
//! bookkeeping, then collision response. Collision response runs after the
//! camera so bodies for freshly streamed platforms are already attached.

use super::state::{COIN_GROUP, GROUND_GROUP, GameEvent, RunPhase, Runner, TickInput};
use crate::dt_to_seconds;
use crate::physics::{Body, is_landing, land_on};

/// How far ahead of a platform edge idle mode jumps, in seconds of running
const IDLE_JUMP_LOOKAHEAD: f32 = 0.15;

/// Advance the runner by one frame.
///
/// `dt` is seconds (or milliseconds when above 1) and is clamped to the
/// configured `max_dt` before reaching physics. A NaN, infinite or
/// non-positive `dt` leaves the runner untouched.
pub fn tick(runner: &mut Runner, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if runner.phase == RunPhase::Dead {
        return events;
    }

    let dt = dt_to_seconds(dt);
    if !dt.is_finite() || dt <= 0.0 {
        return events;
    }
    let dt = dt.min(runner.config.max_dt);
    runner.time += dt;

    let jump = input.jump || (input.idle_mode && should_auto_jump(runner));
    if jump && runner.grounded {
        if let Some(player) = runner.world.body_mut(runner.player) {
            player.velocity.y = runner.config.jump_velocity;
            runner.grounded = false;
            events.push(GameEvent::Jumped);
        }
    }

    runner.world.tick(dt);
    follow_player(runner);
    runner.sync_bodies();

    resolve_ground(runner, &mut events);
    collect_coins(runner, &mut events);
    check_death(runner, &mut events);

    events
}

/// Keep the player near the left edge; scroll up (never down) when it climbs
/// above the middle of the screen
fn follow_player(runner: &mut Runner) {
    let Some(rect) = runner.world.body(runner.player).map(Body::rect) else {
        return;
    };
    let half_h = runner.config.viewport_height / 2.0;
    let dy = (rect.y - half_h).min(0.0) / 2.0;
    runner.parallax.focus(runner.game_layer, &rect, dy);
}

fn resolve_ground(runner: &mut Runner, events: &mut Vec<GameEvent>) {
    let was_grounded = runner.grounded;
    runner.grounded = false;

    let tolerance = runner.config.landing_tolerance;
    for hit in runner.world.get_collisions(runner.player, GROUND_GROUP) {
        let Some(platform) = runner.world.body(hit.other).map(Body::hitbox_rect) else {
            continue;
        };
        let Some(player) = runner.world.body_mut(runner.player) else {
            return;
        };
        if is_landing(player, &platform, tolerance) {
            land_on(player, &platform);
            runner.grounded = true;
        }
    }

    if runner.grounded && !was_grounded {
        events.push(GameEvent::Landed);
    }
}

fn collect_coins(runner: &mut Runner, events: &mut Vec<GameEvent>) {
    let hits = runner.world.get_collisions(runner.player, COIN_GROUP);
    if hits.is_empty() {
        return;
    }

    if let Some(layer) = runner.parallax.layer_mut(runner.game_layer) {
        for hit in hits {
            let coin = layer
                .objects()
                .iter()
                .find(|v| v.body == Some(hit.other))
                .map(|v| v.id());
            if let Some(id) = coin {
                layer.release_view(id);
                runner.score += runner.config.coin_score;
                events.push(GameEvent::Collected {
                    score: runner.score,
                });
            }
        }
    }
    runner.sync_bodies();
}

fn check_death(runner: &mut Runner, events: &mut Vec<GameEvent>) {
    let Some(top) = runner.world.body(runner.player).map(Body::top) else {
        return;
    };
    if top > runner.config.viewport_height + runner.config.death_margin {
        runner.phase = RunPhase::Dead;
        runner.world.detach(runner.player);
        let distance = runner.distance();
        log::info!("Run ended after {:.0}px, score {}", distance, runner.score);
        events.push(GameEvent::Died { distance });
    }
}

/// Jump when every platform under the player ends within the lookahead
fn should_auto_jump(runner: &Runner) -> bool {
    if !runner.grounded {
        return false;
    }
    let Some(player) = runner.world.body(runner.player) else {
        return false;
    };
    let feet = player.hitbox_rect();
    let lookahead = player.velocity.x * IDLE_JUMP_LOOKAHEAD;
    let tolerance = runner.config.landing_tolerance;

    runner
        .world
        .group_members(GROUND_GROUP)
        .filter_map(|h| runner.world.body(h).map(Body::hitbox_rect))
        .filter(|p| {
            p.left() <= feet.right()
                && p.right() >= feet.left()
                && (p.top() - feet.bottom()).abs() <= tolerance
        })
        .all(|p| p.right() < feet.right() + lookahead)
}
