use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    system::{Commands, Query, Res},
};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::GameConfig;
use crate::constants::CENTER;
use crate::systems::{AudioEvent, DeltaTime, PlayerAction, Position, ShapeKind, Side, Sound};

/// A shape flying toward the centre. Exactly one per normal wave is real; its twin is a decoy.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub shape: ShapeKind,
    pub real: bool,
    pub speed: f32,
    /// The half of the arena it approaches from. Projectiles never cross the centre.
    pub side: Side,
    resolved: bool,
}

impl Projectile {
    pub fn new(shape: ShapeKind, real: bool, speed: f32, side: Side) -> Self {
        Self {
            shape,
            real,
            speed,
            side,
            resolved: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Marks the projectile as resolved. Returns `false` if it already was.
    pub fn mark_resolved(&mut self) -> bool {
        !std::mem::replace(&mut self.resolved, true)
    }

    /// A hit is correct only on a real projectile, with the matching attack, swung toward its side.
    pub fn is_correct_hit(&self, attack: ShapeKind, attack_side: Side) -> bool {
        self.real && self.shape == attack && self.side == attack_side
    }

    /// The looping cue a real projectile plays while approaching.
    pub fn approach_sound(&self) -> Sound {
        match self.shape {
            ShapeKind::Square => Sound::ApproachFireball,
            ShapeKind::Circle => Sound::ApproachElectric,
        }
    }
}

/// Moves `current` toward `target` by at most `max_delta`, landing exactly on it when close enough.
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let offset = target - current;
    let distance = offset.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + offset / distance * max_delta
    }
}

/// A projectile that is being removed along with the rest of its wave.
#[derive(Debug, Clone, Copy)]
pub struct Cleared {
    pub entity: Entity,
    pub projectile: Projectile,
}

/// Despawns every projectile in `wave` and silences the approach cues of the real ones.
pub fn clear_wave(commands: &mut Commands, audio: &mut EventWriter<AudioEvent>, wave: impl IntoIterator<Item = Cleared>) {
    let mut count = 0usize;
    for cleared in wave {
        if cleared.projectile.real {
            audio.write(AudioEvent::StopAt(cleared.projectile.side));
        }
        commands.entity(cleared.entity).try_despawn();
        count += 1;
    }
    trace!(count, "Wave cleared");
}

pub fn projectile_movement_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    config: Res<GameConfig>,
    mut projectiles: Query<(Entity, &mut Position, &mut Projectile)>,
    mut actions: EventWriter<PlayerAction>,
    mut audio: EventWriter<AudioEvent>,
) {
    let epsilon = config.projectile.center_epsilon;
    let mut missed = false;

    for (entity, mut position, mut projectile) in projectiles.iter_mut() {
        if projectile.is_resolved() {
            continue;
        }

        position.0 = move_towards(position.0, CENTER, projectile.speed * dt.seconds);
        if position.0.distance(CENTER) >= epsilon {
            continue;
        }

        if projectile.real {
            missed = true;
        } else {
            projectile.mark_resolved();
            trace!(?entity, shape = %projectile.shape, "Decoy reached the centre");
            commands.entity(entity).try_despawn();
        }
    }

    if !missed {
        return;
    }

    let wave: SmallVec<[Cleared; 2]> = projectiles
        .iter_mut()
        .filter_map(|(entity, _, mut projectile)| {
            projectile.mark_resolved().then(|| Cleared {
                entity,
                projectile: *projectile,
            })
        })
        .collect();

    debug!("Real projectile reached the centre");
    actions.write(PlayerAction::Miss);
    clear_wave(&mut commands, &mut audio, wave);
}
