//! Wave scheduling.
//!
//! The spawner waits for the screen to clear, waits out the current delay, then emits one wave and
//! ratchets the difficulty. It is the only place projectiles are created.

use bevy_ecs::{
    event::EventWriter,
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use rand::{seq::IndexedRandom, Rng};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, info, warn};

use crate::config::SpawnerConfig;
use crate::systems::{AudioEvent, DeltaTime, GameRng, Position, Projectile, ShapeKind, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPhase {
    /// Waiting for every live projectile to be resolved.
    WaitingForClear,
    /// The screen is clear; the next wave fires when `remaining` runs out.
    WaitingDelay { remaining: f32 },
    Stopped,
}

/// Current speed and delay. Both only ever move toward their caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDifficulty {
    pub speed: f32,
    pub delay: f32,
}

impl WaveDifficulty {
    pub fn initial(config: &SpawnerConfig) -> Self {
        Self {
            speed: config.initial_speed,
            delay: config.initial_delay,
        }
    }

    pub fn ratchet(&mut self, config: &SpawnerConfig) {
        self.speed = (self.speed + config.speed_increase).min(config.max_speed);
        self.delay = (self.delay - config.delay_decrease).max(config.min_delay);
    }
}

/// One projectile of a wave, before it is placed in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileSpec {
    pub shape: ShapeKind,
    pub real: bool,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub projectiles: SmallVec<[ProjectileSpec; 2]>,
    /// Speed every projectile of this wave travels at.
    pub speed: f32,
}

/// Rolls the composition of a single wave.
///
/// A normal wave is a pair of identical shapes on opposite sides, exactly one of them real. Under
/// true sight the decoy is left out and a single real projectile comes from a random side.
/// Returns `None` when no shapes are available.
pub fn roll_wave<R: Rng + ?Sized>(rng: &mut R, shapes: &[ShapeKind], true_sight: bool) -> Option<SmallVec<[ProjectileSpec; 2]>> {
    let shape = *shapes.choose(rng)?;

    if true_sight {
        let side = if rng.random_bool(0.5) { Side::Left } else { Side::Right };
        return Some(smallvec![ProjectileSpec { shape, real: true, side }]);
    }

    let left_is_real = rng.random_bool(0.5);
    Some(smallvec![
        ProjectileSpec {
            shape,
            real: left_is_real,
            side: Side::Left,
        },
        ProjectileSpec {
            shape,
            real: !left_is_real,
            side: Side::Right,
        },
    ])
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Spawner {
    config: SpawnerConfig,
    phase: SpawnPhase,
    difficulty: WaveDifficulty,
    /// Seconds of true sight left, if active.
    true_sight: Option<f32>,
    waves_emitted: u32,
}

impl Spawner {
    /// Creates a spawner that is already waiting for a clear screen.
    pub fn new(config: SpawnerConfig) -> Self {
        let difficulty = WaveDifficulty::initial(&config);
        Self {
            config,
            phase: SpawnPhase::WaitingForClear,
            difficulty,
            true_sight: None,
            waves_emitted: 0,
        }
    }

    pub fn start_spawning(&mut self) {
        if self.phase == SpawnPhase::Stopped {
            debug!("Spawner started");
            self.phase = SpawnPhase::WaitingForClear;
        }
    }

    /// Cancels any pending wait. No wave is emitted until restarted.
    pub fn stop_spawning(&mut self) {
        if self.phase != SpawnPhase::Stopped {
            debug!(waves = self.waves_emitted, "Spawner stopped");
            self.phase = SpawnPhase::Stopped;
        }
    }

    pub fn is_spawning(&self) -> bool {
        self.phase != SpawnPhase::Stopped
    }

    pub fn activate_true_sight(&mut self, duration: f32) {
        info!(duration, "True sight activated");
        self.true_sight = Some(duration);
    }

    pub fn is_true_sight_active(&self) -> bool {
        self.true_sight.is_some()
    }

    pub fn true_sight_remaining(&self) -> f32 {
        self.true_sight.unwrap_or(0.0)
    }

    /// Counts true sight down, ending it once the duration has run out.
    pub fn tick_true_sight(&mut self, dt: f32) {
        let Some(remaining) = self.true_sight.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            debug!("True sight expired");
            self.true_sight = None;
        }
    }

    /// Advances the scheduler by `dt`. Returns true when a wave should be emitted now.
    pub fn advance(&mut self, dt: f32, screen_clear: bool) -> bool {
        match self.phase {
            SpawnPhase::Stopped => false,
            SpawnPhase::WaitingForClear if !screen_clear => false,
            // The frame that finds the screen clear already counts toward the delay
            SpawnPhase::WaitingForClear => self.count_down(self.difficulty.delay, dt),
            SpawnPhase::WaitingDelay { remaining } => self.count_down(remaining, dt),
        }
    }

    fn count_down(&mut self, remaining: f32, dt: f32) -> bool {
        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.phase = SpawnPhase::WaitingDelay { remaining };
            return false;
        }
        self.phase = SpawnPhase::WaitingForClear;
        true
    }

    /// Rolls the next wave at the current speed, then ratchets the difficulty.
    ///
    /// With no shapes configured the spawn loop ends instead.
    pub fn emit_wave<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Wave> {
        let Some(projectiles) = roll_wave(rng, &self.config.shapes, self.is_true_sight_active()) else {
            warn!("No projectile shapes configured, spawning stops");
            self.phase = SpawnPhase::Stopped;
            return None;
        };

        let wave = Wave {
            projectiles,
            speed: self.difficulty.speed,
        };
        self.difficulty.ratchet(&self.config);
        self.waves_emitted += 1;
        Some(wave)
    }

    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    pub fn difficulty(&self) -> WaveDifficulty {
        self.difficulty
    }

    pub fn current_speed(&self) -> f32 {
        self.difficulty.speed
    }

    pub fn current_delay(&self) -> f32 {
        self.difficulty.delay
    }

    pub fn waves_emitted(&self) -> u32 {
        self.waves_emitted
    }

    pub fn spawn_distance(&self) -> f32 {
        self.config.spawn_distance
    }
}

pub fn spawner_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut spawner: ResMut<Spawner>,
    mut rng: ResMut<GameRng>,
    projectiles: Query<(), With<Projectile>>,
    mut audio: EventWriter<AudioEvent>,
) {
    spawner.tick_true_sight(dt.seconds);

    if !spawner.advance(dt.seconds, projectiles.is_empty()) {
        return;
    }
    let Some(wave) = spawner.emit_wave(&mut rng.0) else {
        return;
    };

    let distance = spawner.spawn_distance();
    for spec in &wave.projectiles {
        let projectile = Projectile::new(spec.shape, spec.real, wave.speed, spec.side);
        if spec.real {
            audio.write(AudioEvent::PlayAt(projectile.approach_sound(), spec.side));
        }
        commands.spawn((projectile, Position(Vec2::new(spec.side.sign() * distance, 0.0))));
    }

    debug!(
        wave = spawner.waves_emitted(),
        count = wave.projectiles.len(),
        speed = wave.speed,
        next_speed = spawner.current_speed(),
        next_delay = spawner.current_delay(),
        "Wave emitted"
    );
}
