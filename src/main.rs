use std::env;

use anyhow::Context;
use riposte::{app::App, autopilot::parse_blunder_rate, config::GameConfig, constants::LOOP_TIME, logging};
use tracing::info;

/// Runs one autopiloted round headlessly and prints the result.
///
/// `RIPOSTE_SEED` fixes the random sequence, `RIPOSTE_FAST` skips real-time pacing and
/// `RIPOSTE_BLUNDER` sets how often the autopilot swings the wrong attack.
pub fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let seed = env::var("RIPOSTE_SEED")
        .ok()
        .map(|value| value.parse::<u64>())
        .transpose()
        .context("RIPOSTE_SEED must be an unsigned integer")?;
    let paced = env::var_os("RIPOSTE_FAST").is_none();
    let blunder_rate = env::var("RIPOSTE_BLUNDER")
        .ok()
        .map(|value| parse_blunder_rate(&value))
        .transpose()
        .context("invalid RIPOSTE_BLUNDER")?
        .unwrap_or(0.15);

    let config = GameConfig { seed, ..GameConfig::default() };
    let mut app = App::new(config, paced, blunder_rate)?;

    info!(loop_time = ?LOOP_TIME, "Starting game loop");
    while app.run() {}

    let player = app.game.player();
    let waves = app.game.spawner().waves_emitted();
    println!("Final score: {} ({} waves)", player.score(), waves);
    for line in app.game.timings().summary() {
        info!("{line}");
    }
    Ok(())
}
