#![allow(dead_code)]

use bevy_ecs::{
    entity::Entity,
    event::{Event, Events},
    world::World,
};
use glam::Vec2;
use riposte::{
    collaborators::{
        AudioResource, Collaborators, DisplayResource, HighScoreResource, LeaderboardResource, MemoryAudio, MemoryDisplay,
        MemoryHighScores, MemoryLeaderboard, MemoryScenes, SceneResource,
    },
    config::GameConfig,
    error::GameError,
    events::{GameCommand, GameEvent, MouseButton},
    game::Game,
    systems::{
        AnimationFinished, AudioEvent, AudioState, Buttons, DeltaTime, GameClock, GameRng, GameStage, GlobalState,
        PauseState, PlayerAction, PlayerBundle, PlayerControlled, PlayerState, PointerState, Position, Powerup, PowerupKind,
        PowerupSpawner, Projectile, ScoreSubmission, ShapeKind, Side, Spawner, SpriteAnimator, SwordHitbox,
    },
};

pub const SEED: u64 = 0x51DE;
pub const FRAME: f32 = 1.0 / 60.0;

/// Creates a basic test world with required resources for ECS systems
pub fn create_test_world() -> World {
    let mut world = World::new();
    let config = GameConfig::seeded(SEED);

    world.insert_resource(Events::<GameEvent>::default());
    world.insert_resource(Events::<GameError>::default());
    world.insert_resource(Events::<AudioEvent>::default());
    world.insert_resource(Events::<PlayerAction>::default());
    world.insert_resource(Events::<AnimationFinished>::default());

    world.insert_resource(GameRng::new(config.seed));
    world.insert_resource(PlayerState::new(&config.player));
    world.insert_resource(Spawner::new(config.spawner.clone()));
    world.insert_resource(PowerupSpawner::new(config.powerups.clone()));
    world.insert_resource(config);
    world.insert_resource(GlobalState::default());
    world.insert_resource(GameClock::default());
    world.insert_resource(GameStage::default());
    world.insert_resource(PauseState::default());
    world.insert_resource(PointerState::default());
    world.insert_resource(AudioState::default());
    world.insert_resource(ScoreSubmission::default());
    world.insert_resource(DisplayResource::default());
    world.insert_resource(AudioResource::default());
    world.insert_resource(SceneResource::default());
    world.insert_resource(LeaderboardResource::default());
    world.insert_resource(HighScoreResource::default());
    world.insert_resource(DeltaTime::from_seconds(FRAME)); // 60 FPS

    world
}

pub fn set_delta(world: &mut World, seconds: f32) {
    world.insert_resource(DeltaTime::from_seconds(seconds));
}

/// Spawns the player at the centre with a fresh animator and sword
pub fn spawn_test_player(world: &mut World) -> Entity {
    let config = world.resource::<GameConfig>().clone();
    world
        .spawn(PlayerBundle {
            player: PlayerControlled,
            position: Position(Vec2::ZERO),
            animator: SpriteAnimator::new(config.animation.clone()),
            hitbox: SwordHitbox::new(&config.hitbox),
        })
        .id()
}

pub fn spawn_projectile(world: &mut World, shape: ShapeKind, real: bool, side: Side, distance: f32) -> Entity {
    world
        .spawn((
            Projectile::new(shape, real, 5.0, side),
            Position(Vec2::new(side.sign() * distance, 0.0)),
        ))
        .id()
}

/// Spawns a pair of projectiles like a normal wave: the real one on `real_side`
pub fn spawn_wave(world: &mut World, shape: ShapeKind, real_side: Side, distance: f32) -> (Entity, Entity) {
    let real = spawn_projectile(world, shape, true, real_side, distance);
    let decoy = spawn_projectile(world, shape, false, real_side.opposite(), distance);
    (real, decoy)
}

pub fn spawn_powerup(world: &mut World, kind: PowerupKind, position: Vec2) -> Entity {
    world.spawn((Powerup::new(kind, 5.0, 0.5), Position(position))).id()
}

/// Sends a game event to the world
pub fn send_game_event(world: &mut World, event: GameEvent) {
    let mut events = world.resource_mut::<Events<GameEvent>>();
    events.send(event);
}

pub fn send_player_action(world: &mut World, action: PlayerAction) {
    world.resource_mut::<Events<PlayerAction>>().send(action);
}

/// Marks a button as pressed this frame at `position`
pub fn press(world: &mut World, button: MouseButton, position: Vec2) {
    world.insert_resource(PointerState {
        position,
        pressed: Buttons::from(button),
    });
}

/// Events of type `E` written since the last update
pub fn written<E: Event + Clone>(world: &World) -> Vec<E> {
    world.resource::<Events<E>>().iter_current_update_events().cloned().collect()
}

pub fn count<C: bevy_ecs::component::Component>(world: &mut World) -> usize {
    world.query::<&C>().iter(world).count()
}

pub fn player_animator(world: &mut World) -> &SpriteAnimator {
    world
        .query_filtered::<&SpriteAnimator, bevy_ecs::query::With<PlayerControlled>>()
        .single(world)
        .expect("exactly one player")
}

pub fn player_animator_mut(world: &mut World) -> bevy_ecs::world::Mut<'_, SpriteAnimator> {
    world
        .query_filtered::<&mut SpriteAnimator, bevy_ecs::query::With<PlayerControlled>>()
        .single_mut(world)
        .expect("exactly one player")
}

/// Handles to the in-memory collaborators wired into a test game
#[derive(Clone, Default)]
pub struct Recorders {
    pub display: MemoryDisplay,
    pub audio: MemoryAudio,
    pub scenes: MemoryScenes,
    pub leaderboard: MemoryLeaderboard,
    pub high_scores: MemoryHighScores,
}

impl Recorders {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            display: Some(Box::new(self.display.clone())),
            audio: Some(Box::new(self.audio.clone())),
            scenes: Some(Box::new(self.scenes.clone())),
            leaderboard: Some(Box::new(self.leaderboard.clone())),
            high_scores: Some(Box::new(self.high_scores.clone())),
        }
    }
}

pub fn create_test_game(config: GameConfig) -> (Game, Recorders) {
    let recorders = Recorders::default();
    let game = Game::new(config, recorders.collaborators()).expect("valid configuration");
    (game, recorders)
}

/// Ticks at 60 FPS until `done` holds, returning the number of ticks taken
pub fn tick_until(game: &mut Game, max_ticks: usize, mut done: impl FnMut(&mut Game) -> bool) -> Option<usize> {
    for tick in 0..max_ticks {
        if done(game) {
            return Some(tick);
        }
        game.tick(FRAME);
    }
    done(game).then_some(max_ticks)
}

pub fn press_command(button: MouseButton, position: Vec2) -> GameCommand {
    GameCommand::Press { button, position }
}
