//! Round-level commands: restart, return to menu, mute, exit, and the one-shot leaderboard
//! submission armed at game over.

use bevy_ecs::{
    event::{EventReader, EventWriter},
    resource::Resource,
    system::ResMut,
};
use tracing::{debug, info};

use crate::collaborators::{Leaderboard, LeaderboardEntry, SceneResource};
use crate::error::LeaderboardError;
use crate::events::{GameCommand, GameEvent};
use crate::systems::{AudioEvent, AudioState, GameClock, GlobalState, Sound};

/// Guards the leaderboard so each finished round is submitted at most once.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreSubmission {
    /// Final score of the round, set once the round is over.
    score: Option<u32>,
    submitted: bool,
}

impl ScoreSubmission {
    pub fn arm(&mut self, score: u32) {
        self.score = Some(score);
        self.submitted = false;
    }

    pub fn is_armed(&self) -> bool {
        self.score.is_some() && !self.submitted
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Uploads the final score under `username`. A failed upload leaves the guard armed.
    pub fn submit(&mut self, leaderboard: &mut dyn Leaderboard, username: &str) -> Result<u32, LeaderboardError> {
        let score = self.score.ok_or(LeaderboardError::RoundInProgress)?;
        if self.submitted {
            return Err(LeaderboardError::AlreadySubmitted);
        }

        leaderboard.submit_score(username, score)?;
        info!(username, score, "Score submitted");
        self.submitted = true;
        Ok(score)
    }
}

/// Fetches at most `limit` entries, best first, whatever the collaborator returns.
///
/// When every entry carries a rank the service's ordering is kept. Otherwise entries are ordered by
/// score and ranked 1..=n.
pub fn fetch_top(leaderboard: &mut dyn Leaderboard, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let mut entries = leaderboard.fetch_top(limit)?;
    if entries.iter().all(|entry| entry.rank > 0) {
        entries.sort_by_key(|entry| entry.rank);
    } else {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        for (rank, entry) in (1..).zip(entries.iter_mut()) {
            entry.rank = rank;
        }
    }
    entries.truncate(limit);
    Ok(entries)
}

pub fn session_command_system(
    mut events: EventReader<GameEvent>,
    mut state: ResMut<GlobalState>,
    mut clock: ResMut<GameClock>,
    mut scenes: ResMut<SceneResource>,
    mut audio_state: ResMut<AudioState>,
    mut audio: EventWriter<AudioEvent>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = event;
        match command {
            GameCommand::Restart => {
                info!("Restart requested");
                audio.write(AudioEvent::Play(Sound::ButtonClick));
                clock.resume();
                if let Some(scenes) = scenes.0.as_mut() {
                    scenes.restart();
                }
                state.restart_requested = true;
            }
            GameCommand::ReturnToMenu => {
                info!("Returning to menu");
                audio.write(AudioEvent::Play(Sound::ButtonClick));
                clock.resume();
                if let Some(scenes) = scenes.0.as_mut() {
                    scenes.return_to_menu();
                }
                state.exit = true;
            }
            GameCommand::ToggleMute => {
                audio_state.muted = !audio_state.muted;
                debug!(muted = audio_state.muted, "Mute toggled");
            }
            GameCommand::Exit => {
                state.exit = true;
            }
            GameCommand::Press { .. } | GameCommand::TogglePause => {}
        }
    }
}
