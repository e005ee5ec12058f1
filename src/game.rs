//! The game: a `World` holding every component and resource, advanced one step at a time by a
//! `Schedule`.

use bevy_ecs::{
    event::{event_update_system, EventRegistry, Events},
    observer::Trigger,
    query::With,
    schedule::{IntoScheduleConfigs, Schedule, SystemSet},
    system::{Res, ResMut},
    world::{Mut, World},
};
use glam::Vec2;
use tracing::{debug, info, warn};

use crate::collaborators::{
    AudioResource, Collaborators, DisplayResource, HighScoreResource, LeaderboardEntry, LeaderboardResource, SceneResource,
};
use crate::config::GameConfig;
use crate::constants::{self, CENTER};
use crate::error::{error_log_system, GameError, GameResult, LeaderboardError};
use crate::events::{GameCommand, GameEvent};
use crate::formatter;
use crate::systems::{
    self, animation_system, audio_system, clock_running, fetch_top, handle_pause_command, hitbox_sync_system, hud_system,
    player_action_system, player_input_system, pointer_system, powerup_click_system, powerup_lifetime_system,
    powerup_spawner_system,
    profiling::{profile, SystemId, SystemTimings, Timing},
    projectile_movement_system, session_command_system, spawner_system, stage_system, sword_collision_system,
    AnimationFinished, AudioEvent, AudioState, DeltaTime, GameClock, GameRng, GameStage, GlobalState, PauseState,
    PlayerAction, PlayerBundle, PlayerControlled, PlayerState, PointerState, Position, Powerup, PowerupSpawner, Projectile,
    ScoreSubmission, Sound, Spawner, SpriteAnimator, SwordHitbox,
};

/// System set for all gameplay systems to ensure they run after input processing
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Systems that turn commands into state
    Input,
    /// Animation, movement and collision
    Update,
    /// Systems that react to what happened during the update
    Respond,
    /// Wave and powerup scheduling
    Schedule,
}

/// Systems that push state outward to collaborators
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum OutputSet {
    Present,
}

/// Core game state manager built on the Bevy ECS architecture.
///
/// Holds a `World` with the player, the live projectiles and powerups, and every resource the
/// systems share. Collaborators (display, audio, scenes, leaderboard, high score) live in the
/// world as resources and survive a restart.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    config: GameConfig,
}

impl Game {
    /// Validates `config` and builds a fresh round.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Config` when the configuration is rejected.
    pub fn new(config: GameConfig, collaborators: Collaborators) -> GameResult<Game> {
        config.validate()?;
        info!(seed = ?config.seed, "Starting game initialization");

        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, &config, collaborators);
        Self::spawn_player(&mut world, &config);
        Self::configure_schedule(&mut schedule);

        debug!("Game initialization complete");
        Ok(Game { world, schedule, config })
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameError>(world);
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<AudioEvent>(world);
        EventRegistry::register_event::<PlayerAction>(world);
        EventRegistry::register_event::<AnimationFinished>(world);

        world.add_observer(|event: Trigger<GameEvent>, mut state: ResMut<GlobalState>| {
            if matches!(*event, GameEvent::Command(GameCommand::Exit)) {
                info!("Exit requested");
                state.exit = true;
            }
        });
    }

    fn insert_resources(world: &mut World, config: &GameConfig, collaborators: Collaborators) {
        let (display, audio, scenes, leaderboard, high_scores) = collaborators.into_resources();
        world.insert_resource(display);
        world.insert_resource(audio);
        world.insert_resource(scenes);
        world.insert_resource(leaderboard);
        world.insert_resource(high_scores);

        world.insert_resource(config.clone());
        world.insert_resource(GameRng::new(config.seed));
        world.insert_resource(GlobalState::default());
        world.insert_resource(GameClock::default());
        world.insert_resource(DeltaTime::frozen());
        world.insert_resource(GameStage::default());
        world.insert_resource(PauseState::default());
        world.insert_resource(PlayerState::new(&config.player));
        world.insert_resource(Spawner::new(config.spawner.clone()));
        world.insert_resource(PowerupSpawner::new(config.powerups.clone()));
        world.insert_resource(ScoreSubmission::default());
        world.insert_resource(PointerState::default());
        world.insert_resource(AudioState::default());
        world.insert_resource(SystemTimings::default());
        world.insert_resource(Timing::default());
    }

    fn spawn_player(world: &mut World, config: &GameConfig) {
        world.spawn(PlayerBundle {
            player: PlayerControlled,
            position: Position(CENTER),
            animator: SpriteAnimator::new(config.animation.clone()),
            hitbox: SwordHitbox::new(&config.hitbox),
        });
    }

    fn configure_schedule(schedule: &mut Schedule) {
        let pointer_system = profile(SystemId::Input, pointer_system);
        let pause_system = profile(SystemId::Input, handle_pause_command);
        let session_system = profile(SystemId::Session, session_command_system);
        let player_input_system = profile(SystemId::PlayerInput, player_input_system);
        let animation_system = profile(SystemId::Animation, animation_system);
        let hitbox_sync_system = profile(SystemId::Hitbox, hitbox_sync_system);
        let sword_collision_system = profile(SystemId::SwordCollision, sword_collision_system);
        let projectile_movement_system = profile(SystemId::ProjectileMovement, projectile_movement_system);
        let powerup_lifetime_system = profile(SystemId::PowerupLifetime, powerup_lifetime_system);
        let powerup_click_system = profile(SystemId::PowerupClick, powerup_click_system);
        let player_action_system = profile(SystemId::PlayerActions, player_action_system);
        let stage_system = profile(SystemId::Stage, stage_system);
        let spawner_system = profile(SystemId::Spawner, spawner_system);
        let powerup_spawner_system = profile(SystemId::PowerupSpawner, powerup_spawner_system);
        let hud_system = profile(SystemId::Hud, hud_system);
        let audio_system = profile(SystemId::Audio, audio_system);
        let error_system = profile(SystemId::Errors, error_log_system);

        let gameplay_allowed = |paused: Res<PauseState>, clock: Res<GameClock>| !paused.active() && clock_running(clock);

        schedule
            .add_systems((
                (pointer_system, pause_system, session_system).chain().in_set(GameplaySet::Input),
                (
                    player_input_system,
                    animation_system,
                    hitbox_sync_system,
                    sword_collision_system,
                    projectile_movement_system,
                    powerup_lifetime_system,
                    powerup_click_system,
                )
                    .chain()
                    .in_set(GameplaySet::Update),
                (player_action_system, stage_system).chain().in_set(GameplaySet::Respond),
                (spawner_system, powerup_spawner_system).chain().in_set(GameplaySet::Schedule),
                (hud_system, audio_system, error_system).chain().in_set(OutputSet::Present),
                event_update_system.after(OutputSet::Present),
            ))
            .configure_sets(
                (
                    GameplaySet::Input,
                    GameplaySet::Update.run_if(gameplay_allowed),
                    GameplaySet::Respond.run_if(gameplay_allowed),
                    GameplaySet::Schedule.run_if(gameplay_allowed),
                    OutputSet::Present,
                )
                    .chain(),
            );
    }

    /// Advances the game by `dt` real seconds. Returns true once the game wants to exit.
    pub fn tick(&mut self, dt: f32) -> bool {
        let scaled = self.world.resource_mut::<GameClock>().advance(dt);
        let ticks = if self.world.resource::<GameClock>().is_frozen() { 0 } else { 1 };
        self.world.insert_resource(DeltaTime { seconds: scaled, ticks });

        let start = std::time::Instant::now();
        self.schedule.run(&mut self.world);
        let total_duration = start.elapsed();
        formatter::increment_tick();

        if let (Some(timings), Some(timing)) = (
            self.world.get_resource::<SystemTimings>(),
            self.world.get_resource::<Timing>(),
        ) {
            let new_tick = timing.increment_tick();
            timings.add_timing(SystemId::Total, total_duration, new_tick);

            // 20% headroom over whichever is longer: the step or the nominal loop time
            let frame_budget_ms = (dt.max(constants::LOOP_TIME.as_secs_f32()) * 1000.0 * 1.2) as u128;
            if total_duration.as_millis() > frame_budget_ms {
                let systems = timings
                    .slowest_systems()
                    .iter()
                    .map(|(id, duration)| format!("{id} ({duration:.2?})"))
                    .collect::<Vec<String>>()
                    .join(", ");
                warn!(
                    total = format!("{:.3?}", total_duration),
                    tick = new_tick,
                    systems,
                    budget = format!("{}ms", frame_budget_ms),
                    "Frame took longer than expected"
                );
            }
        }

        let (exit, restart) = self
            .world
            .get_resource::<GlobalState>()
            .map(|state| (state.exit, state.restart_requested))
            .unwrap_or((true, false));

        if restart {
            self.restart();
        }
        exit
    }

    /// Queues a command for the next tick.
    pub fn send(&mut self, command: GameCommand) {
        let event = GameEvent::from(command);
        self.world.resource_mut::<Events<GameEvent>>().send(event);
        self.world.trigger(event);
    }

    /// Replaces the round with a fresh one built from the same configuration. Collaborators are
    /// carried over; with a fixed seed the new round replays the same random sequence.
    pub fn restart(&mut self) {
        let collaborators = Collaborators::from_resources(
            self.world.remove_resource::<DisplayResource>(),
            self.world.remove_resource::<AudioResource>(),
            self.world.remove_resource::<SceneResource>(),
            self.world.remove_resource::<LeaderboardResource>(),
            self.world.remove_resource::<HighScoreResource>(),
        );

        let mut world = World::default();
        let mut schedule = Schedule::default();
        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, &self.config, collaborators);
        Self::spawn_player(&mut world, &self.config);
        Self::configure_schedule(&mut schedule);

        self.world = world;
        self.schedule = schedule;
        info!("Round restarted");
    }

    /// Uploads the final score of a finished round. Allowed once per round; a failed upload
    /// may be retried.
    pub fn submit_score(&mut self, username: &str) -> Result<u32, LeaderboardError> {
        if self.stage() != GameStage::GameOver {
            return Err(LeaderboardError::RoundInProgress);
        }

        let result = self.world.resource_scope(|world, mut leaderboard: Mut<LeaderboardResource>| {
            let Some(leaderboard) = leaderboard.0.as_mut() else {
                return Err(LeaderboardError::Unavailable);
            };
            world.resource_mut::<ScoreSubmission>().submit(leaderboard.as_mut(), username)
        });

        match &result {
            Ok(_) => {
                self.world.resource_mut::<Events<AudioEvent>>().send(AudioEvent::Play(Sound::Submit));
            }
            Err(e) => {
                warn!(error = %e, "Score submission failed");
            }
        }
        result
    }

    /// The best `limit` leaderboard entries.
    pub fn leaderboard_top(&mut self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut leaderboard = self.world.resource_mut::<LeaderboardResource>();
        let leaderboard = leaderboard.0.as_mut().ok_or(LeaderboardError::Unavailable)?;
        fetch_top(leaderboard.as_mut(), limit)
    }

    /// The leaderboard panel shown after game over.
    pub fn leaderboard_panel(&mut self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.leaderboard_top(constants::leaderboard::TOP_ENTRIES)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerState {
        self.world.resource::<PlayerState>()
    }

    pub fn stage(&self) -> GameStage {
        *self.world.resource::<GameStage>()
    }

    pub fn clock(&self) -> &GameClock {
        self.world.resource::<GameClock>()
    }

    pub fn spawner(&self) -> &Spawner {
        self.world.resource::<Spawner>()
    }

    pub fn powerup_spawner(&self) -> &PowerupSpawner {
        self.world.resource::<PowerupSpawner>()
    }

    pub fn is_paused(&self) -> bool {
        self.world.resource::<PauseState>().active()
    }

    pub fn high_score(&self) -> Option<u32> {
        self.world.resource::<HighScoreResource>().0.as_ref().and_then(|store| store.get())
    }

    pub fn submission(&self) -> ScoreSubmission {
        *self.world.resource::<ScoreSubmission>()
    }

    pub fn timings(&self) -> &SystemTimings {
        self.world.resource::<SystemTimings>()
    }

    /// Live projectiles with their positions.
    pub fn projectiles(&mut self) -> Vec<(Projectile, Vec2)> {
        self.world
            .query::<(&Projectile, &Position)>()
            .iter(&self.world)
            .map(|(projectile, position)| (*projectile, position.0))
            .collect()
    }

    /// Live powerups with their positions.
    pub fn powerups(&mut self) -> Vec<(Powerup, Vec2)> {
        self.world
            .query::<(&Powerup, &Position)>()
            .iter(&self.world)
            .map(|(powerup, position)| (*powerup, position.0))
            .collect()
    }

    /// The player's animator state, if the player entity exists.
    pub fn player_animation(&mut self) -> Option<systems::AnimationState> {
        self.world
            .query_filtered::<&SpriteAnimator, With<PlayerControlled>>()
            .iter(&self.world)
            .next()
            .map(SpriteAnimator::state)
    }
}
