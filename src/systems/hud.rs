use bevy_ecs::change_detection::DetectChanges;
use bevy_ecs::system::{Res, ResMut};
use smallvec::SmallVec;
use thousands::Separable;
use tracing::trace;

use crate::collaborators::DisplayResource;
use crate::systems::{HeartState, PlayerState};

/// What the HUD shows, captured after every player-state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub score: u32,
    pub misses: u32,
    pub max_misses: u32,
    pub multiplier: u32,
    pub hearts: SmallVec<[HeartState; 4]>,
}

impl From<&PlayerState> for HudSnapshot {
    fn from(player: &PlayerState) -> Self {
        Self {
            score: player.score(),
            misses: player.misses(),
            max_misses: player.max_misses(),
            multiplier: player.multiplier(),
            hearts: player.hearts(),
        }
    }
}

impl HudSnapshot {
    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score.separate_with_commas())
    }

    pub fn misses_text(&self) -> String {
        format!("Misses: {}/{}", self.misses, self.max_misses)
    }

    pub fn multiplier_text(&self) -> String {
        format!("x{}", self.multiplier)
    }

    pub fn full_hearts(&self) -> usize {
        self.hearts.iter().filter(|heart| **heart == HeartState::Full).count()
    }
}

/// Pushes a snapshot to the display whenever the player state changed this frame.
pub fn hud_system(player: Res<PlayerState>, mut display: ResMut<DisplayResource>) {
    if !player.is_changed() {
        return;
    }
    let Some(display) = display.0.as_mut() else {
        return;
    };

    let snapshot = HudSnapshot::from(&*player);
    trace!(score = snapshot.score, misses = snapshot.misses, "HUD updated");
    display.update(&snapshot);
}
