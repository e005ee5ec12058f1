use bevy_ecs::prelude::*;
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Square attack.
    Left,
    /// Circle attack.
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameCommand {
    /// A button went down with the pointer at `position` (world space).
    Press { button: MouseButton, position: Vec2 },
    Restart,
    ReturnToMenu,
    TogglePause,
    ToggleMute,
    Exit,
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Command(GameCommand),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}
