//! Centralized error types for the game.
//!
//! `GameError` doubles as an ECS event so systems can report problems without
//! panicking; a drain system logs whatever was written during the frame.

use bevy_ecs::event::Event;

use crate::systems::AnimationState;

/// Main error type for the game.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Leaderboard error: {0}")]
    Leaderboard(#[from] LeaderboardError),

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Rejections produced by `GameConfig::validate`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} range is inverted: {min} > {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("hitbox window {first}..={last} of {state} does not fit its {frames} frames")]
    WindowOutOfRange {
        state: AnimationState,
        first: usize,
        last: usize,
        frames: usize,
    },

    #[error("spawn weight for {kind} must not be negative, got {weight}")]
    NegativeWeight { kind: &'static str, weight: f32 },
}

/// Failures surfaced by the leaderboard collaborator or the submission guard.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("a score was already submitted this round")]
    AlreadySubmitted,

    #[error("the round has not ended yet")]
    RoundInProgress,

    #[error("no leaderboard is configured")]
    Unavailable,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("fetch failed: {0}")]
    Fetch(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

/// Logs every `GameError` written during the frame.
pub fn error_log_system(mut errors: bevy_ecs::event::EventReader<GameError>) {
    for error in errors.read() {
        tracing::error!(%error, "Game error");
    }
}
