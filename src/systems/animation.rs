//! Frame-based sprite animation for the player.
//!
//! The animator owns the only timing the combat system trusts: the attack hitbox is live exactly
//! while an attack animation sits inside its configured frame window, and the input gate stays
//! closed while any non-looping animation is in flight.

use std::fmt;

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::{Event, EventWriter},
    system::{Commands, Query, Res},
    world::World,
};
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};
use tracing::{trace, warn};

use crate::config::AnimationConfig;
use crate::systems::{DeltaTime, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr, Display)]
pub enum AnimationState {
    Idle,
    /// Left-button attack, answers squares.
    Attack,
    /// Right-button attack, answers circles.
    Attack2,
    Hit,
    /// Absorbing: nothing else may play once death has started.
    Death,
}

impl AnimationState {
    /// The projectile shape an attacking state answers.
    pub fn attack_shape(self) -> Option<ShapeKind> {
        match self {
            AnimationState::Attack => Some(ShapeKind::Square),
            AnimationState::Attack2 => Some(ShapeKind::Circle),
            _ => None,
        }
    }
}

/// A one-shot callback run against the world when a non-looping animation completes.
pub type CompletionCallback = Box<dyn FnOnce(&mut World) + Send + Sync>;

/// Result of a tick that finished a non-looping animation.
pub struct Completion {
    pub state: AnimationState,
    pub callback: Option<CompletionCallback>,
}

/// Written whenever a non-looping animation reaches its last frame.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFinished {
    pub entity: Entity,
    pub state: AnimationState,
}

#[derive(Component)]
pub struct SpriteAnimator {
    clips: AnimationConfig,
    state: AnimationState,
    previous: AnimationState,
    frame: usize,
    frame_timer: f32,
    playing: bool,
    looping: bool,
    facing_right: bool,
    on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for SpriteAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteAnimator")
            .field("state", &self.state)
            .field("previous", &self.previous)
            .field("frame", &self.frame)
            .field("playing", &self.playing)
            .field("looping", &self.looping)
            .field("facing_right", &self.facing_right)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl SpriteAnimator {
    /// Creates an animator already looping its idle clip.
    pub fn new(clips: AnimationConfig) -> Self {
        let mut animator = Self {
            clips,
            state: AnimationState::Idle,
            previous: AnimationState::Idle,
            frame: 0,
            frame_timer: 0.0,
            playing: false,
            looping: true,
            facing_right: true,
            on_complete: None,
        };
        animator.play(AnimationState::Idle, true);
        animator
    }

    /// Starts `state`. Returns whether the request was accepted.
    pub fn play(&mut self, state: AnimationState, looping: bool) -> bool {
        self.start(state, looping, None)
    }

    /// Starts a non-looping `state` and runs `callback` once it completes.
    pub fn play_then(&mut self, state: AnimationState, callback: CompletionCallback) -> bool {
        self.start(state, false, Some(callback))
    }

    fn start(&mut self, state: AnimationState, looping: bool, callback: Option<CompletionCallback>) -> bool {
        if self.state == AnimationState::Death && state != AnimationState::Death {
            trace!(requested = %state, "Animation request ignored, death is absorbing");
            return false;
        }
        if self.state == state && self.playing {
            return false;
        }

        self.previous = self.state;
        self.state = state;
        self.looping = looping;
        self.on_complete = callback;
        self.frame = 0;
        self.frame_timer = 0.0;

        if self.clips.frame_count(state) == 0 {
            warn!(state = %state, "Animation has no frames");
            self.playing = false;
        } else {
            self.playing = true;
        }
        true
    }

    /// Advances the current clip by `dt` seconds.
    ///
    /// Returns a `Completion` when a non-looping clip reaches its last frame; any registered
    /// callback is handed over exactly once.
    pub fn tick(&mut self, dt: f32) -> Option<Completion> {
        let frames = self.clips.frame_count(self.state);
        if !self.playing || frames == 0 {
            return None;
        }

        let frame_length = 1.0 / self.clips.fps;
        self.frame_timer += dt;
        while self.frame_timer >= frame_length {
            self.frame_timer -= frame_length;
            self.frame += 1;
            if self.frame < frames {
                continue;
            }

            if self.looping {
                self.frame = 0;
                continue;
            }

            self.frame = frames - 1;
            self.playing = false;
            let finished = self.state;
            let callback = self.on_complete.take();
            if !matches!(finished, AnimationState::Idle | AnimationState::Death) {
                self.play(AnimationState::Idle, true);
            }
            return Some(Completion {
                state: finished,
                callback,
            });
        }

        None
    }

    /// True while a non-looping clip is running. Attacks are refused meanwhile.
    pub fn is_animation_playing(&self) -> bool {
        self.playing && !self.looping
    }

    /// Whether the current (state, frame) pair lies inside an attack window.
    pub fn hitbox_active(&self) -> bool {
        self.clips
            .window(self.state)
            .is_some_and(|window| window.contains(self.frame))
    }

    pub fn set_facing(&mut self, right: bool) {
        self.facing_right = right;
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn previous_state(&self) -> AnimationState {
        self.previous
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

pub fn animation_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut animators: Query<(Entity, &mut SpriteAnimator)>,
    mut finished: EventWriter<AnimationFinished>,
) {
    for (entity, mut animator) in animators.iter_mut() {
        let Some(completion) = animator.tick(dt.seconds) else {
            continue;
        };

        trace!(?entity, state = %completion.state, "Animation finished");
        if let Some(callback) = completion.callback {
            commands.queue(callback);
        }
        finished.write(AnimationFinished {
            entity,
            state: completion.state,
        });
    }
}
