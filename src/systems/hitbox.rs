use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::With,
    system::{Commands, Query, Res},
};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::debug;

use crate::config::{GameConfig, HitboxConfig};
use crate::systems::{
    clear_wave, AudioEvent, Cleared, PlayerAction, PlayerControlled, Position, Projectile, ShapeKind, Side, SpriteAnimator,
};

/// The sword's box, live only during an attack's frame window.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SwordHitbox {
    pub active: bool,
    /// The attack that armed the box. `None` while inactive.
    pub attack: Option<ShapeKind>,
    pub facing_right: bool,
    pub offset_right: Vec2,
    pub offset_left: Vec2,
    pub size: Vec2,
}

impl SwordHitbox {
    pub fn new(config: &HitboxConfig) -> Self {
        Self {
            active: false,
            attack: None,
            facing_right: true,
            offset_right: config.offset_right,
            offset_left: config.offset_left,
            size: config.size,
        }
    }

    pub fn side(&self) -> Side {
        Side::from_facing(self.facing_right)
    }

    /// The box centre in world space for an owner standing at `owner`.
    pub fn center(&self, owner: Vec2) -> Vec2 {
        owner
            + if self.facing_right {
                self.offset_right
            } else {
                self.offset_left
            }
    }

    /// Circle-versus-box overlap test.
    pub fn overlaps_circle(&self, owner: Vec2, circle: Vec2, radius: f32) -> bool {
        let center = self.center(owner);
        let half = self.size * 0.5;
        let closest = circle.clamp(center - half, center + half);
        closest.distance_squared(circle) <= radius * radius
    }

    /// Re-arms the box from the animator. Attack and facing are captured at the frame it turns on.
    pub fn sync(&mut self, animator: &SpriteAnimator) {
        let active = animator.hitbox_active();
        if active && !self.active {
            self.attack = animator.state().attack_shape();
            self.facing_right = animator.facing_right();
        } else if !active {
            self.attack = None;
        }
        self.active = active;
    }
}

pub fn hitbox_sync_system(mut hitboxes: Query<(&SpriteAnimator, &mut SwordHitbox)>) {
    for (animator, mut hitbox) in hitboxes.iter_mut() {
        let before = *hitbox;
        hitbox.sync(animator);
        if before.active != hitbox.active {
            debug!(active = hitbox.active, side = %hitbox.side(), "Sword hitbox toggled");
        }
    }
}

/// Resolves the first live projectile the sword touches; the rest of its wave goes with it.
pub fn sword_collision_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    swords: Query<(&Position, &SwordHitbox), With<PlayerControlled>>,
    mut projectiles: Query<(Entity, &Position, &mut Projectile)>,
    mut actions: EventWriter<PlayerAction>,
    mut audio: EventWriter<AudioEvent>,
) {
    let radius = config.projectile.radius;

    for (owner, sword) in swords.iter() {
        let Some(attack) = sword.attack.filter(|_| sword.active) else {
            continue;
        };

        let struck = projectiles
            .iter()
            .find(|(_, position, projectile)| {
                !projectile.is_resolved() && sword.overlaps_circle(owner.0, position.0, radius)
            })
            .map(|(entity, _, projectile)| (entity, *projectile));
        let Some((entity, projectile)) = struck else {
            continue;
        };

        let correct = projectile.is_correct_hit(attack, sword.side());
        debug!(?entity, correct, shape = %projectile.shape, real = projectile.real, "Sword connected");
        actions.write(PlayerAction::ClickResult { correct });

        let wave: SmallVec<[Cleared; 2]> = projectiles
            .iter_mut()
            .filter_map(|(entity, _, mut projectile)| {
                projectile.mark_resolved().then(|| Cleared {
                    entity,
                    projectile: *projectile,
                })
            })
            .collect();
        clear_wave(&mut commands, &mut audio, wave);
    }
}
