//! Routes gameplay sound cues to the audio collaborator.

use bevy_ecs::{
    event::{Event, EventReader},
    resource::Resource,
    system::ResMut,
};
use strum_macros::{Display, EnumIter, IntoStaticStr};
use tracing::{debug, trace};

use crate::collaborators::AudioResource;
use crate::systems::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Display)]
pub enum Sound {
    /// Correct hit.
    Hit,
    Miss,
    Heal,
    Multiplier,
    Swing,
    Collect,
    ButtonClick,
    Submit,
    /// Looping approach cue of a real square.
    ApproachFireball,
    /// Looping approach cue of a real circle.
    ApproachElectric,
}

/// Resource for tracking audio state
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioState {
    pub muted: bool,
    /// Mute state last pushed to the sink.
    applied: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    Play(Sound),
    /// Play a cue panned toward one side.
    PlayAt(Sound, Side),
    /// Stop whatever plays on one side.
    StopAt(Side),
    StopAll,
}

pub fn audio_system(mut audio: ResMut<AudioResource>, mut state: ResMut<AudioState>, mut events: EventReader<AudioEvent>) {
    let Some(sink) = audio.0.as_mut() else {
        events.clear();
        return;
    };

    if state.applied != state.muted {
        debug!(muted = state.muted, "Audio mute state changed");
        sink.set_muted(state.muted);
        state.applied = state.muted;
    }

    for event in events.read() {
        match *event {
            AudioEvent::Play(sound) | AudioEvent::PlayAt(sound, _) if state.muted => {
                trace!(%sound, "Skipping sound, audio muted");
            }
            AudioEvent::Play(sound) => {
                trace!(%sound, "Playing sound");
                sink.play(sound, None);
            }
            AudioEvent::PlayAt(sound, side) => {
                trace!(%sound, %side, "Playing sound");
                sink.play(sound, Some(side));
            }
            AudioEvent::StopAt(side) => sink.stop(side),
            AudioEvent::StopAll => sink.stop_all(),
        }
    }
}
