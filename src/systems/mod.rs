//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod animation;
pub mod audio;
pub mod clock;
pub mod components;
pub mod hitbox;
pub mod hud;
pub mod input;
pub mod player;
pub mod powerup;
pub mod profiling;
pub mod projectile;
pub mod session;
pub mod spawner;
pub mod state;

pub use self::animation::*;
pub use self::audio::*;
pub use self::clock::*;
pub use self::components::*;
pub use self::hitbox::*;
pub use self::hud::*;
pub use self::input::*;
pub use self::player::*;
pub use self::powerup::*;
pub use self::projectile::*;
pub use self::session::*;
pub use self::spawner::*;
pub use self::state::*;
