use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
    world::World,
};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::collaborators::{DisplayResource, HighScoreResource};
use crate::events::{GameCommand, GameEvent};
use crate::systems::{
    clear_wave, AnimationState, AudioEvent, Cleared, GameClock, PlayerControlled, PlayerState, Powerup, PowerupSpawner,
    Projectile, ScoreSubmission, Spawner, SpriteAnimator,
};

/// Lifecycle of a round.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStage {
    #[default]
    Playing,
    /// The player is out of lives and the death animation is running.
    Dying,
    /// Terminal. The clock is frozen and the leaderboard accepts one submission.
    GameOver,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseState {
    #[default]
    Inactive,
    Active,
}

impl PauseState {
    pub fn active(&self) -> bool {
        matches!(self, PauseState::Active)
    }
}

pub fn handle_pause_command(mut events: EventReader<GameEvent>, mut pause_state: ResMut<PauseState>, stage: Res<GameStage>) {
    for event in events.read() {
        if let GameEvent::Command(GameCommand::TogglePause) = event {
            if *stage == GameStage::GameOver {
                debug!("Pause ignored after game over");
                continue;
            }
            *pause_state = match *pause_state {
                PauseState::Active => {
                    info!("Game resumed");
                    PauseState::Inactive
                }
                PauseState::Inactive => {
                    info!("Game paused");
                    PauseState::Active
                }
            };
        }
    }
}

/// Watches for the player's death and starts the end of the round, exactly once.
#[allow(clippy::too_many_arguments)]
pub fn stage_system(
    mut commands: Commands,
    mut stage: ResMut<GameStage>,
    player: Res<PlayerState>,
    mut spawner: ResMut<Spawner>,
    mut powerup_spawner: ResMut<PowerupSpawner>,
    projectiles: Query<(Entity, &Projectile)>,
    powerups: Query<Entity, With<Powerup>>,
    mut animators: Query<&mut SpriteAnimator, With<PlayerControlled>>,
    mut audio: EventWriter<AudioEvent>,
) {
    if *stage != GameStage::Playing || player.is_alive() {
        return;
    }

    info!(score = player.score(), "Round over, playing death");
    *stage = GameStage::Dying;
    spawner.stop_spawning();
    powerup_spawner.stop_spawning();

    let wave: SmallVec<[Cleared; 2]> = projectiles
        .iter()
        .map(|(entity, projectile)| Cleared {
            entity,
            projectile: *projectile,
        })
        .collect();
    clear_wave(&mut commands, &mut audio, wave);
    for entity in powerups.iter() {
        commands.entity(entity).try_despawn();
    }

    match animators.single_mut() {
        Ok(mut animator) => {
            if !animator.play_then(AnimationState::Death, Box::new(finish_round)) {
                warn!("Death animation refused, ending the round immediately");
                commands.queue(finish_round);
            }
        }
        Err(_) => commands.queue(finish_round),
    }
}

/// Completes the death sequence: freezes time, shows the final score, records the high score and
/// arms the leaderboard submission.
pub fn finish_round(world: &mut World) {
    let Some(mut stage) = world.get_resource_mut::<GameStage>() else {
        return;
    };
    if *stage != GameStage::Dying {
        return;
    }
    *stage = GameStage::GameOver;

    if let Some(mut clock) = world.get_resource_mut::<GameClock>() {
        clock.freeze();
    }

    let score = world.get_resource::<PlayerState>().map(PlayerState::score).unwrap_or(0);
    info!(score, "Game over");

    if let Some(mut display) = world.get_resource_mut::<DisplayResource>() {
        if let Some(display) = display.0.as_mut() {
            display.show_final_score(score);
        }
    }

    if let Some(mut store) = world.get_resource_mut::<HighScoreResource>() {
        if let Some(store) = store.0.as_mut() {
            let best = store.get().unwrap_or(0);
            if score > best {
                info!(score, previous = best, "New high score");
                store.put(score);
            }
        }
    }

    if let Some(mut submission) = world.get_resource_mut::<ScoreSubmission>() {
        submission.arm(score);
    }
}
