//! Parallax Runner entry point
//!
//! Headless demo: runs the reference game loop in idle mode at a fixed frame
//! rate and logs what happens. Pass a JSON config path to override defaults.

use parallax_runner::runner::{GameEvent, RunPhase, Runner, TickInput, tick};
use parallax_runner::{Result, RunnerConfig};

/// Simulated frame length (ms), as a browser frame callback would report it
const FRAME_MS: f32 = 16.0;
/// Frames to simulate (one minute at ~60 fps)
const FRAMES: u32 = 3600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Parallax Runner (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Embedders drive `Runner` from their own frame callback
}

#[cfg_attr(target_arch = "wasm32", allow(dead_code))]
fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    let mut runner = Runner::new(config)?;

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let mut runs = 1;
    let mut best = 0.0f32;

    for _ in 0..FRAMES {
        for event in tick(&mut runner, &input, FRAME_MS) {
            match event {
                GameEvent::Collected { score } => log::debug!("Coin! score {}", score),
                GameEvent::Died { distance } => best = best.max(distance),
                GameEvent::Jumped | GameEvent::Landed => {}
            }
        }

        if runner.phase() == RunPhase::Dead {
            runs += 1;
            runner.restart();
        }
    }

    best = best.max(runner.distance());
    let layer = runner.parallax().layer(runner.game_layer());
    log::info!(
        "{} runs, best distance {:.0}px, {} bodies, {} live views",
        runs,
        best,
        runner.world().len(),
        layer.map_or(0, |l| l.objects().len())
    );
    Ok(())
}
