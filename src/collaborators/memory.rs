//! In-memory collaborators. Each keeps its record behind an `Arc<Mutex<..>>`, so a clone handed
//! to the game can be inspected from outside it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::collaborators::{AudioSink, Display, HighScoreStore, Leaderboard, LeaderboardEntry, SceneDirector};
use crate::error::LeaderboardError;
use crate::systems::{HudSnapshot, Side, Sound};

#[derive(Debug, Default)]
pub struct DisplayLog {
    pub snapshots: Vec<HudSnapshot>,
    pub final_scores: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    pub log: Arc<Mutex<DisplayLog>>,
}

impl MemoryDisplay {
    pub fn last_snapshot(&self) -> Option<HudSnapshot> {
        self.log.lock().snapshots.last().cloned()
    }

    pub fn final_scores(&self) -> Vec<u32> {
        self.log.lock().final_scores.clone()
    }
}

impl Display for MemoryDisplay {
    fn update(&mut self, snapshot: &HudSnapshot) {
        self.log.lock().snapshots.push(snapshot.clone());
    }

    fn show_final_score(&mut self, score: u32) {
        self.log.lock().final_scores.push(score);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    Play(Sound, Option<Side>),
    Stop(Side),
    StopAll,
    Muted(bool),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAudio {
    pub calls: Arc<Mutex<Vec<AudioCall>>>,
}

impl MemoryAudio {
    pub fn played(&self, sound: Sound) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, AudioCall::Play(played, _) if *played == sound))
            .count()
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().clone()
    }
}

impl AudioSink for MemoryAudio {
    fn play(&mut self, sound: Sound, side: Option<Side>) {
        self.calls.lock().push(AudioCall::Play(sound, side));
    }

    fn stop(&mut self, side: Side) {
        self.calls.lock().push(AudioCall::Stop(side));
    }

    fn stop_all(&mut self) {
        self.calls.lock().push(AudioCall::StopAll);
    }

    fn set_muted(&mut self, muted: bool) {
        self.calls.lock().push(AudioCall::Muted(muted));
    }
}

#[derive(Debug, Default)]
pub struct SceneLog {
    pub restarts: u32,
    pub menu_returns: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryScenes {
    pub log: Arc<Mutex<SceneLog>>,
}

impl SceneDirector for MemoryScenes {
    fn restart(&mut self) {
        self.log.lock().restarts += 1;
    }

    fn return_to_menu(&mut self) {
        self.log.lock().menu_returns += 1;
    }
}

/// A leaderboard kept in memory, sorted best first. Uploads can be made to fail on demand.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    pub entries: Arc<Mutex<Vec<LeaderboardEntry>>>,
    /// While set, every upload fails with this message.
    pub failure: Arc<Mutex<Option<String>>>,
}

impl MemoryLeaderboard {
    pub fn fail_uploads(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }
}

impl Leaderboard for MemoryLeaderboard {
    fn submit_score(&mut self, username: &str, score: u32) -> Result<(), LeaderboardError> {
        if let Some(message) = self.failure.lock().as_ref() {
            return Err(LeaderboardError::Upload(message.clone()));
        }

        let mut entries = self.entries.lock();
        entries.push(LeaderboardEntry {
            rank: 0,
            username: username.to_string(),
            score,
        });
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        for (rank, entry) in (1..).zip(entries.iter_mut()) {
            entry.rank = rank;
        }
        Ok(())
    }

    fn fetch_top(&mut self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.entries.lock().iter().take(limit).cloned().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHighScores {
    pub best: Arc<Mutex<Option<u32>>>,
}

impl HighScoreStore for MemoryHighScores {
    fn get(&self) -> Option<u32> {
        *self.best.lock()
    }

    fn put(&mut self, score: u32) {
        *self.best.lock() = Some(score);
    }
}
