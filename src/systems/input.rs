use bevy_ecs::{event::EventReader, resource::Resource, system::ResMut};
use bitflags::bitflags;
use glam::Vec2;

use crate::events::{GameCommand, GameEvent, MouseButton};

bitflags! {
    /// Buttons that went down this frame.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
    }
}

impl From<MouseButton> for Buttons {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Buttons::LEFT,
            MouseButton::Right => Buttons::RIGHT,
        }
    }
}

/// Pointer position in world space and the presses of the current frame.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub pressed: Buttons,
}

/// Folds this frame's press commands into `PointerState`. Presses last a single frame.
pub fn pointer_system(mut events: EventReader<GameEvent>, mut pointer: ResMut<PointerState>) {
    let mut pressed = Buttons::empty();
    for event in events.read() {
        if let GameEvent::Command(GameCommand::Press { button, position }) = *event {
            pointer.position = position;
            pressed |= Buttons::from(button);
        }
    }

    if pointer.pressed != pressed {
        pointer.pressed = pressed;
    }
}
