use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::Vec2;
use rand::{rngs::SmallRng, SeedableRng};
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::systems::{SpriteAnimator, SwordHitbox};

/// A tag component for the entity that is controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// World-space position. The player stands at the origin.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

/// The two projectile shapes, each answered by one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr, Display)]
pub enum ShapeKind {
    /// Answered by the left button.
    Square,
    /// Answered by the right button.
    Circle,
}

/// Which half of the arena something is in, relative to the centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Display)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The side of a horizontal coordinate. The centre line counts as right.
    pub fn of(x: f32) -> Self {
        if x < 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn from_facing(facing_right: bool) -> Self {
        if facing_right {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// -1 for left, +1 for right.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Resource, Default)]
pub struct GlobalState {
    pub exit: bool,
    /// Set by the restart command; `Game::tick` rebuilds the world once the frame ends.
    pub restart_requested: bool,
}

/// Per-frame timing, already scaled by the game clock.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DeltaTime {
    /// Scaled seconds elapsed this frame. Zero while the clock is frozen.
    pub seconds: f32,
    /// Number of simulation ticks this frame represents.
    pub ticks: u32,
}

impl DeltaTime {
    pub fn from_seconds(seconds: f32) -> Self {
        Self { seconds, ticks: 1 }
    }

    pub fn frozen() -> Self {
        Self { seconds: 0.0, ticks: 0 }
    }
}

/// The single source of randomness for every gameplay decision.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_os_rng()),
        }
    }
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub animator: SpriteAnimator,
    pub hitbox: SwordHitbox,
}
