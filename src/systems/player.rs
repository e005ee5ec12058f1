use bevy_ecs::{
    event::{Event, EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{Query, Res, ResMut},
};
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::config::PlayerConfig;
use crate::error::GameError;
use crate::systems::{AnimationState, AudioEvent, Buttons, PlayerControlled, PointerState, Side, Sound, SpriteAnimator};

/// Requests to change the player's state. The controller is the only writer of `PlayerState`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// A sword strike was resolved against a projectile.
    ClickResult { correct: bool },
    /// A real projectile reached the centre.
    Miss,
    AddMultiplier,
    Heal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Scored { points: u32 },
    Missed { died: bool },
    MultiplierRaised { multiplier: u32 },
    Healed { misses: u32 },
    /// Nothing changed: the player is dead, or there was nothing to heal.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartState {
    Full,
    Empty,
}

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    score: u32,
    misses: u32,
    max_misses: u32,
    multiplier: u32,
    points_per_hit: u32,
    alive: bool,
}

impl PlayerState {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            score: 0,
            misses: 0,
            max_misses: config.max_misses,
            multiplier: 1,
            points_per_hit: config.points_per_hit,
            alive: true,
        }
    }

    pub fn process_click_result(&mut self, correct: bool) -> ActionOutcome {
        if !self.alive {
            return ActionOutcome::Ignored;
        }
        if !correct {
            return self.register_miss();
        }

        let points = self.points_per_hit.saturating_mul(self.multiplier);
        self.score = self.score.saturating_add(points);
        ActionOutcome::Scored { points }
    }

    /// Costs a life and resets the multiplier. Reaching the miss limit kills the player.
    pub fn register_miss(&mut self) -> ActionOutcome {
        if !self.alive {
            return ActionOutcome::Ignored;
        }

        self.misses = (self.misses + 1).min(self.max_misses);
        self.multiplier = 1;
        let died = self.misses >= self.max_misses;
        if died {
            self.alive = false;
        }
        ActionOutcome::Missed { died }
    }

    pub fn add_multiplier(&mut self) -> ActionOutcome {
        if !self.alive {
            return ActionOutcome::Ignored;
        }
        self.multiplier = self.multiplier.saturating_add(1);
        ActionOutcome::MultiplierRaised {
            multiplier: self.multiplier,
        }
    }

    /// Restores one life. Does nothing at full health.
    pub fn heal(&mut self) -> ActionOutcome {
        if !self.alive || self.misses == 0 {
            return ActionOutcome::Ignored;
        }
        self.misses -= 1;
        ActionOutcome::Healed { misses: self.misses }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn max_misses(&self) -> u32 {
        self.max_misses
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_damaged(&self) -> bool {
        self.misses > 0
    }

    /// One heart per allowed miss; the first `max_misses - misses` are full.
    pub fn hearts(&self) -> SmallVec<[HeartState; 4]> {
        let full = self.max_misses - self.misses;
        (0..self.max_misses)
            .map(|i| if i < full { HeartState::Full } else { HeartState::Empty })
            .collect()
    }
}

/// Turns a button press into an attack, unless the player is dead or mid-animation.
pub fn player_input_system(
    pointer: Res<PointerState>,
    player: Res<PlayerState>,
    mut players: Query<&mut SpriteAnimator, With<PlayerControlled>>,
    mut audio: EventWriter<AudioEvent>,
    mut errors: EventWriter<GameError>,
) {
    if pointer.pressed.is_empty() || !player.is_alive() {
        return;
    }

    let mut animator = match players.single_mut() {
        Ok(animator) => animator,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No single player animator found, cannot attack: {e}"
            )));
            return;
        }
    };

    if animator.is_animation_playing() {
        trace!(state = %animator.state(), "Attack ignored, animation in flight");
        return;
    }

    let state = if pointer.pressed.contains(Buttons::LEFT) {
        AnimationState::Attack
    } else {
        AnimationState::Attack2
    };
    let side = Side::of(pointer.position.x);
    animator.set_facing(side == Side::Right);
    if animator.play(state, false) {
        debug!(%state, %side, "Attack started");
        audio.write(AudioEvent::Play(Sound::Swing));
    }
}

/// Applies queued `PlayerAction`s and emits their feedback.
pub fn player_action_system(
    mut actions: EventReader<PlayerAction>,
    mut player: ResMut<PlayerState>,
    mut players: Query<&mut SpriteAnimator, With<PlayerControlled>>,
    mut audio: EventWriter<AudioEvent>,
) {
    for action in actions.read() {
        let outcome = match action {
            PlayerAction::ClickResult { correct } => player.process_click_result(*correct),
            PlayerAction::Miss => player.register_miss(),
            PlayerAction::AddMultiplier => player.add_multiplier(),
            PlayerAction::Heal => player.heal(),
        };

        match outcome {
            ActionOutcome::Scored { points } => {
                debug!(points, score = player.score(), "Hit");
                audio.write(AudioEvent::Play(Sound::Hit));
            }
            ActionOutcome::Missed { died } => {
                debug!(misses = player.misses(), died, "Miss");
                audio.write(AudioEvent::Play(Sound::Miss));
                if !died {
                    if let Ok(mut animator) = players.single_mut() {
                        animator.play(AnimationState::Hit, false);
                    }
                } else {
                    info!(score = player.score(), "Player died");
                }
            }
            ActionOutcome::MultiplierRaised { multiplier } => {
                debug!(multiplier, "Multiplier raised");
                audio.write(AudioEvent::Play(Sound::Multiplier));
            }
            ActionOutcome::Healed { misses } => {
                debug!(misses, "Healed");
                audio.write(AudioEvent::Play(Sound::Heal));
            }
            ActionOutcome::Ignored => trace!(?action, "Player action ignored"),
        }
    }
}
