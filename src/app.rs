use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, info};

use crate::autopilot::Autopilot;
use crate::collaborators::{Collaborators, MemoryAudio, MemoryDisplay, MemoryHighScores, MemoryLeaderboard, MemoryScenes};
use crate::config::GameConfig;
use crate::constants::LOOP_TIME;
use crate::game::Game;
use crate::systems::GameStage;

/// Headless application: the game, a scripted player and in-memory collaborators.
pub struct App {
    pub game: Game,
    autopilot: Autopilot,
    pub display: MemoryDisplay,
    pub leaderboard: MemoryLeaderboard,
    last_tick: Instant,
    /// When false, ticks run back to back with a fixed step instead of in real time.
    paced: bool,
}

impl App {
    /// # Errors
    ///
    /// Fails when the configuration is rejected.
    pub fn new(config: GameConfig, paced: bool, blunder_rate: f64) -> anyhow::Result<Self> {
        let display = MemoryDisplay::default();
        let leaderboard = MemoryLeaderboard::default();
        let collaborators = Collaborators {
            display: Some(Box::new(display.clone())),
            audio: Some(Box::new(MemoryAudio::default())),
            scenes: Some(Box::new(MemoryScenes::default())),
            leaderboard: Some(Box::new(leaderboard.clone())),
            high_scores: Some(Box::new(MemoryHighScores::default())),
        };

        let autopilot = Autopilot::new(config.seed, blunder_rate);
        let game = Game::new(config, collaborators).context("could not create game")?;
        info!(paced, blunder_rate, "Application initialization completed successfully");

        Ok(App {
            game,
            autopilot,
            display,
            leaderboard,
            last_tick: Instant::now(),
            paced,
        })
    }

    /// Executes a single frame. Returns `false` once the round is over or the game asked to exit.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();
        let dt = if self.paced {
            self.last_tick.elapsed().as_secs_f32()
        } else {
            LOOP_TIME.as_secs_f32()
        };
        self.last_tick = start;

        if let Some(command) = self.autopilot.decide(&mut self.game) {
            self.game.send(command);
        }

        if self.game.tick(dt) || self.game.stage() == GameStage::GameOver {
            debug!(stage = ?self.game.stage(), "Main loop finished");
            return false;
        }

        if self.paced {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        }

        true
    }
}
