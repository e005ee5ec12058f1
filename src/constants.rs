//! This module contains all the default tunables used by the game.

use std::time::Duration;

use glam::Vec2;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The point every projectile travels toward, and the player's position.
pub const CENTER: Vec2 = Vec2::ZERO;

/// Wave scheduling and difficulty ramp.
pub mod spawner {
    /// Projectile speed of the first wave, in world units per second.
    pub const INITIAL_SPEED: f32 = 5.0;
    pub const MAX_SPEED: f32 = 15.0;
    /// Speed added after every emitted wave.
    pub const SPEED_INCREASE: f32 = 0.3;
    /// Seconds between the screen clearing and the first wave.
    pub const INITIAL_DELAY: f32 = 1.5;
    pub const MIN_DELAY: f32 = 0.5;
    /// Seconds removed from the delay after every emitted wave.
    pub const DELAY_DECREASE: f32 = 0.05;
    /// Horizontal distance from the centre at which projectiles appear.
    pub const SPAWN_DISTANCE: f32 = 10.0;
}

pub mod projectile {
    pub const RADIUS: f32 = 0.5;
    /// A projectile closer than this to the centre has arrived.
    pub const CENTER_EPSILON: f32 = 0.1;
}

pub mod player {
    pub const MAX_MISSES: u32 = 3;
    pub const POINTS_PER_HIT: u32 = 100;
}

pub mod animation {
    pub const FPS: f32 = 10.0;

    pub const IDLE_FRAMES: usize = 4;
    pub const ATTACK_FRAMES: usize = 6;
    pub const ATTACK2_FRAMES: usize = 6;
    pub const HIT_FRAMES: usize = 3;
    pub const DEATH_FRAMES: usize = 8;

    /// Inclusive frame window in which an attack's hitbox is live.
    pub const ATTACK_WINDOW: (usize, usize) = (2, 4);
    pub const ATTACK2_WINDOW: (usize, usize) = (2, 4);
}

pub mod hitbox {
    use glam::Vec2;

    pub const OFFSET_RIGHT: Vec2 = Vec2::new(0.3, 0.0);
    pub const OFFSET_LEFT: Vec2 = Vec2::new(-0.3, 0.0);
    pub const SIZE: Vec2 = Vec2::new(0.5, 0.5);
}

pub mod powerup {
    use glam::Vec2;

    /// Bounds of the random wait between spawn attempts, in seconds.
    pub const INTERVAL_MIN: f32 = 5.0;
    pub const INTERVAL_MAX: f32 = 15.0;
    pub const AREA_MIN: Vec2 = Vec2::new(-8.0, -4.0);
    pub const AREA_MAX: Vec2 = Vec2::new(8.0, 4.0);
    pub const MAX_ACTIVE: usize = 2;
    pub const LIFETIME: f32 = 5.0;
    pub const RADIUS: f32 = 0.5;
    pub const TRUE_SIGHT_DURATION: f32 = 3.0;

    pub const HEART_WEIGHT: f32 = 1.0;
    pub const SCORE_WEIGHT: f32 = 1.0;
    pub const TRUE_SIGHT_WEIGHT: f32 = 1.0;
}

pub mod leaderboard {
    /// Number of entries fetched for the leaderboard panel.
    pub const TOP_ENTRIES: usize = 10;
}
