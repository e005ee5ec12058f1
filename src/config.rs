//! Immutable game configuration, split from the runtime state it seeds.

use bevy_ecs::resource::Resource;
use glam::Vec2;
use smallvec::{smallvec, SmallVec};
use strum::{EnumCount, IntoEnumIterator};

use crate::constants;
use crate::error::ConfigError;
use crate::systems::{AnimationState, PowerupKind, ShapeKind};

/// Top-level configuration handed to `Game::new`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Fixed RNG seed. `None` seeds from the operating system.
    pub seed: Option<u64>,
    pub spawner: SpawnerConfig,
    pub projectile: ProjectileConfig,
    pub player: PlayerConfig,
    pub animation: AnimationConfig,
    pub hitbox: HitboxConfig,
    pub powerups: PowerupConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnerConfig {
    pub initial_speed: f32,
    pub max_speed: f32,
    pub speed_increase: f32,
    pub initial_delay: f32,
    pub min_delay: f32,
    pub delay_decrease: f32,
    pub spawn_distance: f32,
    /// Shapes a wave may be drawn from. An empty list ends the spawn loop.
    pub shapes: SmallVec<[ShapeKind; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileConfig {
    pub radius: f32,
    pub center_epsilon: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    pub max_misses: u32,
    pub points_per_hit: u32,
}

/// Inclusive range of frames during which an attack hitbox is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub first: usize,
    pub last: usize,
}

impl FrameWindow {
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn contains(&self, frame: usize) -> bool {
        (self.first..=self.last).contains(&frame)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub fps: f32,
    /// Frame count per state, indexed by `AnimationState as usize`.
    pub frames: [usize; AnimationState::COUNT],
    pub attack_window: FrameWindow,
    pub attack2_window: FrameWindow,
}

impl AnimationConfig {
    pub fn frame_count(&self, state: AnimationState) -> usize {
        self.frames[state as usize]
    }

    /// The hitbox window for an attacking state, if it has one.
    pub fn window(&self, state: AnimationState) -> Option<FrameWindow> {
        match state {
            AnimationState::Attack => Some(self.attack_window),
            AnimationState::Attack2 => Some(self.attack2_window),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitboxConfig {
    pub offset_right: Vec2,
    pub offset_left: Vec2,
    pub size: Vec2,
}

/// Spawn parameters for one powerup kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerupSpawnData {
    pub kind: PowerupKind,
    pub weight: f32,
    pub lifetime: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerupConfig {
    pub kinds: SmallVec<[PowerupSpawnData; 3]>,
    pub interval_min: f32,
    pub interval_max: f32,
    pub area_min: Vec2,
    pub area_max: Vec2,
    pub max_active: usize,
    pub true_sight_duration: f32,
}

impl PowerupConfig {
    pub fn data(&self, kind: PowerupKind) -> Option<&PowerupSpawnData> {
        self.kinds.iter().find(|data| data.kind == kind)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            spawner: SpawnerConfig::default(),
            projectile: ProjectileConfig::default(),
            player: PlayerConfig::default(),
            animation: AnimationConfig::default(),
            hitbox: HitboxConfig::default(),
            powerups: PowerupConfig::default(),
        }
    }
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        use constants::spawner::*;
        Self {
            initial_speed: INITIAL_SPEED,
            max_speed: MAX_SPEED,
            speed_increase: SPEED_INCREASE,
            initial_delay: INITIAL_DELAY,
            min_delay: MIN_DELAY,
            delay_decrease: DELAY_DECREASE,
            spawn_distance: SPAWN_DISTANCE,
            shapes: ShapeKind::iter().collect(),
        }
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            radius: constants::projectile::RADIUS,
            center_epsilon: constants::projectile::CENTER_EPSILON,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_misses: constants::player::MAX_MISSES,
            points_per_hit: constants::player::POINTS_PER_HIT,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        use constants::animation::*;
        let mut frames = [0; AnimationState::COUNT];
        frames[AnimationState::Idle as usize] = IDLE_FRAMES;
        frames[AnimationState::Attack as usize] = ATTACK_FRAMES;
        frames[AnimationState::Attack2 as usize] = ATTACK2_FRAMES;
        frames[AnimationState::Hit as usize] = HIT_FRAMES;
        frames[AnimationState::Death as usize] = DEATH_FRAMES;
        Self {
            fps: FPS,
            frames,
            attack_window: FrameWindow::new(ATTACK_WINDOW.0, ATTACK_WINDOW.1),
            attack2_window: FrameWindow::new(ATTACK2_WINDOW.0, ATTACK2_WINDOW.1),
        }
    }
}

impl Default for HitboxConfig {
    fn default() -> Self {
        Self {
            offset_right: constants::hitbox::OFFSET_RIGHT,
            offset_left: constants::hitbox::OFFSET_LEFT,
            size: constants::hitbox::SIZE,
        }
    }
}

impl Default for PowerupConfig {
    fn default() -> Self {
        use constants::powerup::*;
        let data = |kind, weight| PowerupSpawnData {
            kind,
            weight,
            lifetime: LIFETIME,
            radius: RADIUS,
        };
        Self {
            kinds: smallvec![
                data(PowerupKind::Heart, HEART_WEIGHT),
                data(PowerupKind::Score, SCORE_WEIGHT),
                data(PowerupKind::TrueSight, TRUE_SIGHT_WEIGHT),
            ],
            interval_min: INTERVAL_MIN,
            interval_max: INTERVAL_MAX,
            area_min: AREA_MIN,
            area_max: AREA_MAX,
            max_active: MAX_ACTIVE,
            true_sight_duration: TRUE_SIGHT_DURATION,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

impl GameConfig {
    /// Returns a default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Checks every tunable for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let spawner = &self.spawner;
        positive("spawner.initial_speed", spawner.initial_speed)?;
        ordered("spawner.speed", spawner.initial_speed, spawner.max_speed)?;
        ordered("spawner.speed_increase", 0.0, spawner.speed_increase)?;
        ordered("spawner.delay", spawner.min_delay, spawner.initial_delay)?;
        ordered("spawner.min_delay", 0.0, spawner.min_delay)?;
        ordered("spawner.delay_decrease", 0.0, spawner.delay_decrease)?;
        positive("spawner.spawn_distance", spawner.spawn_distance)?;

        positive("projectile.radius", self.projectile.radius)?;
        positive("projectile.center_epsilon", self.projectile.center_epsilon)?;

        if self.player.max_misses == 0 {
            return Err(ConfigError::Zero {
                field: "player.max_misses",
            });
        }

        positive("animation.fps", self.animation.fps)?;
        for state in [AnimationState::Attack, AnimationState::Attack2] {
            let Some(window) = self.animation.window(state) else {
                continue;
            };
            let frames = self.animation.frame_count(state);
            if window.first > window.last || window.last >= frames {
                return Err(ConfigError::WindowOutOfRange {
                    state,
                    first: window.first,
                    last: window.last,
                    frames,
                });
            }
        }

        positive("hitbox.size.x", self.hitbox.size.x)?;
        positive("hitbox.size.y", self.hitbox.size.y)?;

        let powerups = &self.powerups;
        ordered("powerups.interval", powerups.interval_min, powerups.interval_max)?;
        ordered("powerups.interval_min", 0.0, powerups.interval_min)?;
        ordered("powerups.area.x", powerups.area_min.x, powerups.area_max.x)?;
        ordered("powerups.area.y", powerups.area_min.y, powerups.area_max.y)?;
        ordered("powerups.true_sight_duration", 0.0, powerups.true_sight_duration)?;
        for data in &powerups.kinds {
            if data.weight < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    kind: data.kind.into(),
                    weight: data.weight,
                });
            }
            positive("powerups.lifetime", data.lifetime)?;
            positive("powerups.radius", data.radius)?;
        }

        Ok(())
    }
}
