//! Interfaces to everything outside the simulation: the HUD, the speakers, scene loading, the
//! online leaderboard and the local high score.
//!
//! The simulation only talks to these traits. Each one is optional; a missing audio sink or
//! display is skipped silently, a missing leaderboard turns submissions into errors.

use bevy_ecs::resource::Resource;

use crate::error::LeaderboardError;
use crate::systems::{HudSnapshot, Side, Sound};

pub mod memory;

pub use memory::{AudioCall, MemoryAudio, MemoryDisplay, MemoryHighScores, MemoryLeaderboard, MemoryScenes};

/// Receives player-state snapshots whenever they change.
pub trait Display: Send + Sync {
    fn update(&mut self, snapshot: &HudSnapshot);
    fn show_final_score(&mut self, score: u32);
}

pub trait AudioSink: Send + Sync {
    /// Plays a one-shot cue, optionally panned toward `side`.
    fn play(&mut self, sound: Sound, side: Option<Side>);
    /// Stops whatever is playing on `side`.
    fn stop(&mut self, side: Side);
    fn stop_all(&mut self);
    fn set_muted(&mut self, muted: bool);
}

pub trait SceneDirector: Send + Sync {
    fn restart(&mut self);
    fn return_to_menu(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1-based position on the board. Zero when the service did not rank the entry.
    pub rank: u32,
    pub username: String,
    pub score: u32,
}

pub trait Leaderboard: Send + Sync {
    fn submit_score(&mut self, username: &str, score: u32) -> Result<(), LeaderboardError>;
    /// Returns up to `limit` entries, best first, ranked by the service when it can.
    fn fetch_top(&mut self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

pub trait HighScoreStore: Send + Sync {
    fn get(&self) -> Option<u32>;
    fn put(&mut self, score: u32);
}

/// Everything `Game::new` needs from the outside world.
#[derive(Default)]
pub struct Collaborators {
    pub display: Option<Box<dyn Display>>,
    pub audio: Option<Box<dyn AudioSink>>,
    pub scenes: Option<Box<dyn SceneDirector>>,
    pub leaderboard: Option<Box<dyn Leaderboard>>,
    pub high_scores: Option<Box<dyn HighScoreStore>>,
}

#[derive(Resource, Default)]
pub struct DisplayResource(pub Option<Box<dyn Display>>);

#[derive(Resource, Default)]
pub struct AudioResource(pub Option<Box<dyn AudioSink>>);

#[derive(Resource, Default)]
pub struct SceneResource(pub Option<Box<dyn SceneDirector>>);

#[derive(Resource, Default)]
pub struct LeaderboardResource(pub Option<Box<dyn Leaderboard>>);

#[derive(Resource, Default)]
pub struct HighScoreResource(pub Option<Box<dyn HighScoreStore>>);

impl Collaborators {
    /// Splits the bundle into the resources the schedule reads.
    pub(crate) fn into_resources(
        self,
    ) -> (
        DisplayResource,
        AudioResource,
        SceneResource,
        LeaderboardResource,
        HighScoreResource,
    ) {
        (
            DisplayResource(self.display),
            AudioResource(self.audio),
            SceneResource(self.scenes),
            LeaderboardResource(self.leaderboard),
            HighScoreResource(self.high_scores),
        )
    }

    /// Reassembles the bundle from resources taken back out of a world.
    pub(crate) fn from_resources(
        display: Option<DisplayResource>,
        audio: Option<AudioResource>,
        scenes: Option<SceneResource>,
        leaderboard: Option<LeaderboardResource>,
        high_scores: Option<HighScoreResource>,
    ) -> Self {
        Self {
            display: display.and_then(|r| r.0),
            audio: audio.and_then(|r| r.0),
            scenes: scenes.and_then(|r| r.0),
            leaderboard: leaderboard.and_then(|r| r.0),
            high_scores: high_scores.and_then(|r| r.0),
        }
    }
}
