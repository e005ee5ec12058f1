//! Simulated-time control.
//!
//! Every timer in the game (spawn delays, true sight, powerup lifetimes, animation frames) reads
//! the scaled `DeltaTime`, so freezing the clock pauses all of them uniformly.

use bevy_ecs::{resource::Resource, system::Res};
use tracing::debug;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GameClock {
    time_scale: f32,
    elapsed: f32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            elapsed: 0.0,
        }
    }
}

impl GameClock {
    pub fn freeze(&mut self) {
        if !self.is_frozen() {
            debug!(elapsed = self.elapsed, "Game clock frozen");
        }
        self.time_scale = 0.0;
    }

    pub fn resume(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_frozen(&self) -> bool {
        self.time_scale == 0.0
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Scaled seconds accumulated since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Scales a raw frame duration and accumulates it, returning the scaled value.
    pub fn advance(&mut self, raw_seconds: f32) -> f32 {
        let scaled = raw_seconds * self.time_scale;
        self.elapsed += scaled;
        scaled
    }
}

/// Run condition: true while simulated time is flowing.
pub fn clock_running(clock: Res<GameClock>) -> bool {
    !clock.is_frozen()
}
