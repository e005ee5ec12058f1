//! Collectible powerups and their weighted spawner.
//!
//! A powerup sits in the arena until it is clicked or its lifetime runs out, whichever happens
//! first. The spawner periodically draws one kind from those currently eligible, weighted by the
//! configured spawn weights.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};
use tracing::{debug, error, trace};

use crate::config::{GameConfig, PowerupConfig, PowerupSpawnData};
use crate::systems::{AudioEvent, DeltaTime, GameRng, PlayerAction, PlayerState, PointerState, Position, Sound, Spawner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr, Display)]
pub enum PowerupKind {
    /// Restores one life.
    Heart,
    /// Raises the score multiplier.
    Score,
    /// Removes decoys from the next waves for a while.
    TrueSight,
}

impl PowerupKind {
    /// Whether this kind is worth offering right now. Nothing is offered to a dead player.
    pub fn can_spawn(self, player: &PlayerState, spawner: &Spawner) -> bool {
        player.is_alive()
            && match self {
                PowerupKind::Heart => player.is_damaged(),
                PowerupKind::Score => true,
                PowerupKind::TrueSight => !spawner.is_true_sight_active(),
            }
    }

    /// Applies the effect. Player changes go through `PlayerAction`s.
    pub fn apply_effect(self, actions: &mut EventWriter<PlayerAction>, spawner: &mut Spawner, true_sight_duration: f32) {
        match self {
            PowerupKind::Heart => {
                actions.write(PlayerAction::Heal);
            }
            PowerupKind::Score => {
                actions.write(PlayerAction::AddMultiplier);
            }
            PowerupKind::TrueSight => spawner.activate_true_sight(true_sight_duration),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupStatus {
    Active,
    Collected,
    Expired,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Powerup {
    pub kind: PowerupKind,
    pub radius: f32,
    lifetime: f32,
    elapsed: f32,
    status: PowerupStatus,
}

impl Powerup {
    pub fn new(kind: PowerupKind, lifetime: f32, radius: f32) -> Self {
        Self {
            kind,
            radius,
            lifetime,
            elapsed: 0.0,
            status: PowerupStatus::Active,
        }
    }

    pub fn from_data(data: &PowerupSpawnData) -> Self {
        Self::new(data.kind, data.lifetime, data.radius)
    }

    pub fn status(&self) -> PowerupStatus {
        self.status
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Ages the powerup. Returns true on the tick it expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.status != PowerupStatus::Active {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.lifetime {
            self.status = PowerupStatus::Expired;
            return true;
        }
        false
    }

    /// Claims the powerup. Returns false if it was already collected or has expired.
    pub fn collect(&mut self) -> bool {
        if self.status != PowerupStatus::Active {
            return false;
        }
        self.status = PowerupStatus::Collected;
        true
    }

    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        center.distance_squared(point) <= self.radius * self.radius
    }
}

/// Picks one item with probability proportional to its weight.
///
/// Non-positive weights are never picked. Returns `None` when nothing has positive weight.
pub fn select_weighted<T: Copy, R: Rng + ?Sized>(rng: &mut R, items: &[(T, f32)]) -> Option<T> {
    let total: f32 = items.iter().map(|(_, weight)| weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last = None;
    for (item, weight) in items.iter().filter(|(_, weight)| *weight > 0.0) {
        cumulative += weight;
        if roll < cumulative {
            return Some(*item);
        }
        last = Some(*item);
    }
    // Float rounding can leave the roll a hair above the final bucket.
    last
}

/// A uniformly random point in the rectangle spanned by `min` and `max`.
pub fn random_point_in<R: Rng + ?Sized>(rng: &mut R, min: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(rng.random_range(min.x..=max.x), rng.random_range(min.y..=max.y))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerupPhase {
    /// An interval will be rolled on the next tick.
    Idle,
    Waiting { remaining: f32 },
    Stopped,
    /// A required collaborator is missing; the spawner never runs again.
    Disabled,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PowerupSpawner {
    config: PowerupConfig,
    phase: PowerupPhase,
}

impl PowerupSpawner {
    pub fn new(config: PowerupConfig) -> Self {
        Self {
            config,
            phase: PowerupPhase::Idle,
        }
    }

    pub fn start_spawning(&mut self) {
        if self.phase == PowerupPhase::Stopped {
            self.phase = PowerupPhase::Idle;
        }
    }

    pub fn stop_spawning(&mut self) {
        if matches!(self.phase, PowerupPhase::Idle | PowerupPhase::Waiting { .. }) {
            debug!("Powerup spawner stopped");
            self.phase = PowerupPhase::Stopped;
        }
    }

    pub fn disable(&mut self) {
        self.phase = PowerupPhase::Disabled;
    }

    pub fn is_spawning(&self) -> bool {
        matches!(self.phase, PowerupPhase::Idle | PowerupPhase::Waiting { .. })
    }

    pub fn phase(&self) -> PowerupPhase {
        self.phase
    }

    pub fn config(&self) -> &PowerupConfig {
        &self.config
    }

    /// Advances the wait. Returns true when a spawn attempt is due.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        match self.phase {
            PowerupPhase::Idle => {
                let remaining = rng.random_range(self.config.interval_min..=self.config.interval_max);
                trace!(remaining, "Next powerup attempt scheduled");
                self.phase = PowerupPhase::Waiting { remaining };
                false
            }
            PowerupPhase::Waiting { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = PowerupPhase::Waiting { remaining };
                    false
                } else {
                    self.phase = PowerupPhase::Idle;
                    true
                }
            }
            PowerupPhase::Stopped | PowerupPhase::Disabled => false,
        }
    }

    /// Draws the kind to spawn from those currently eligible, or `None` if nothing qualifies.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R, player: &PlayerState, spawner: &Spawner) -> Option<&PowerupSpawnData> {
        let eligible: SmallVec<[(usize, f32); 3]> = self
            .config
            .kinds
            .iter()
            .enumerate()
            .filter(|(_, data)| data.kind.can_spawn(player, spawner))
            .map(|(index, data)| (index, data.weight))
            .collect();

        select_weighted(rng, &eligible).map(|index| &self.config.kinds[index])
    }
}

pub fn powerup_lifetime_system(mut commands: Commands, dt: Res<DeltaTime>, mut powerups: Query<(Entity, &mut Powerup)>) {
    for (entity, mut powerup) in powerups.iter_mut() {
        if powerup.tick(dt.seconds) {
            debug!(kind = %powerup.kind, "Powerup expired");
            commands.entity(entity).try_despawn();
        }
    }
}

/// Collects every live powerup under the pointer when a button goes down.
pub fn powerup_click_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    pointer: Res<PointerState>,
    mut spawner: ResMut<Spawner>,
    mut powerups: Query<(Entity, &Position, &mut Powerup)>,
    mut actions: EventWriter<PlayerAction>,
    mut audio: EventWriter<AudioEvent>,
) {
    if pointer.pressed.is_empty() {
        return;
    }

    for (entity, position, mut powerup) in powerups.iter_mut() {
        if !powerup.contains(position.0, pointer.position) || !powerup.collect() {
            continue;
        }

        debug!(kind = %powerup.kind, "Powerup collected");
        // The effect's own cue reports whether anything changed
        audio.write(AudioEvent::Play(Sound::Collect));
        powerup
            .kind
            .apply_effect(&mut actions, &mut spawner, config.powerups.true_sight_duration);
        commands.entity(entity).try_despawn();
    }
}

pub fn powerup_spawner_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut powerup_spawner: ResMut<PowerupSpawner>,
    player: Option<Res<PlayerState>>,
    spawner: Res<Spawner>,
    mut rng: ResMut<GameRng>,
    powerups: Query<(), With<Powerup>>,
) {
    if !powerup_spawner.is_spawning() {
        return;
    }
    let Some(player) = player else {
        error!("PlayerState not found, powerup spawner disabled");
        powerup_spawner.disable();
        return;
    };

    if !powerup_spawner.advance(dt.seconds, &mut rng.0) {
        return;
    }

    let live = powerups.iter().count();
    if live >= powerup_spawner.config().max_active {
        trace!(live, "Powerup cap reached, skipping attempt");
        return;
    }

    let Some(data) = powerup_spawner.choose(&mut rng.0, &player, &spawner).copied() else {
        trace!("No eligible powerup, skipping attempt");
        return;
    };

    let config = powerup_spawner.config();
    let position = random_point_in(&mut rng.0, config.area_min, config.area_max);
    debug!(kind = %data.kind, x = position.x, y = position.y, "Powerup spawned");
    commands.spawn((Powerup::from_data(&data), Position(position)));
}
