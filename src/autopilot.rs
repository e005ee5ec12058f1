//! A scripted player for headless runs.
//!
//! It swings at the real projectile of each wave once it is close enough for the attack's wind-up
//! to land, picks up powerups between waves, and blunders now and then so rounds end.

use anyhow::{ensure, Context};
use glam::Vec2;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::debug;

use crate::events::{GameCommand, MouseButton};
use crate::game::Game;
use crate::systems::{GameStage, ShapeKind};

/// Parses a blunder rate, a probability in `0.0..=1.0`.
pub fn parse_blunder_rate(value: &str) -> anyhow::Result<f64> {
    let rate = value.trim().parse::<f64>().context("blunder rate must be a number")?;
    ensure!((0.0..=1.0).contains(&rate), "blunder rate must be within 0..=1, got {rate}");
    Ok(rate)
}

pub struct Autopilot {
    rng: SmallRng,
    /// Chance of swinging the wrong attack.
    blunder_rate: f64,
    /// Wave number of the last swing, so each wave gets one attempt.
    last_swing: Option<u32>,
}

impl Autopilot {
    pub fn new(seed: Option<u64>, blunder_rate: f64) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed ^ 0x5EED),
            None => SmallRng::from_os_rng(),
        };
        Self {
            rng,
            blunder_rate: if blunder_rate.is_finite() { blunder_rate.clamp(0.0, 1.0) } else { 0.0 },
            last_swing: None,
        }
    }

    /// The command to send this tick, if any.
    pub fn decide(&mut self, game: &mut Game) -> Option<GameCommand> {
        if game.stage() != GameStage::Playing || game.is_paused() {
            return None;
        }

        let projectiles = game.projectiles();
        if projectiles.is_empty() {
            let (_, position) = game.powerups().into_iter().next()?;
            debug!(x = position.x, y = position.y, "Autopilot collecting powerup");
            return Some(GameCommand::Press {
                button: MouseButton::Left,
                position,
            });
        }

        let wave = game.spawner().waves_emitted();
        if self.last_swing == Some(wave) {
            return None;
        }

        let (projectile, position) = projectiles.into_iter().find(|(projectile, _)| projectile.real)?;
        if position.x.abs() > self.trigger_distance(game, projectile.speed) {
            return None;
        }

        self.last_swing = Some(wave);
        let mut button = match projectile.shape {
            ShapeKind::Square => MouseButton::Left,
            ShapeKind::Circle => MouseButton::Right,
        };
        if self.rng.random_bool(self.blunder_rate) {
            button = match button {
                MouseButton::Left => MouseButton::Right,
                MouseButton::Right => MouseButton::Left,
            };
            debug!(wave, "Autopilot blunders");
        }

        Some(GameCommand::Press {
            button,
            position: Vec2::new(projectile.side.sign() * 2.0, 0.0),
        })
    }

    /// Distance from the centre at which a swing started now connects just inside the hitbox.
    fn trigger_distance(&self, game: &Game, speed: f32) -> f32 {
        let config = game.config();
        let reach = config.hitbox.offset_right.x.abs() + config.hitbox.size.x * 0.5 + config.projectile.radius;
        let frame = 1.0 / config.animation.fps;
        let windup = config.animation.attack_window.first as f32 * frame;
        reach + speed * (windup + frame * 0.5)
    }
}
