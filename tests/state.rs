use bevy_ecs::{system::RunSystemOnce, world::World};
use glam::Vec2;
use riposte::collaborators::{DisplayResource, HighScoreResource, MemoryDisplay, MemoryHighScores};
use riposte::events::{GameCommand, GameEvent};
use riposte::systems::{
    animation_system, finish_round, handle_pause_command, stage_system, AnimationState, GameClock, GameStage, PauseState,
    PlayerState, Powerup, PowerupKind, PowerupSpawner, Projectile, ScoreSubmission, ShapeKind, Side, Spawner,
};
use speculoos::prelude::*;

mod common;

fn kill_player(world: &mut World) {
    let mut player = world.resource_mut::<PlayerState>();
    player.process_click_result(true);
    for _ in 0..3 {
        player.register_miss();
    }
}

fn run_death_animation(world: &mut World) {
    common::set_delta(world, 0.1);
    for _ in 0..8 {
        world.run_system_once(animation_system).expect("System should run successfully");
    }
}

#[test]
fn test_pause_toggles() {
    let mut world = common::create_test_world();

    common::send_game_event(&mut world, GameEvent::Command(GameCommand::TogglePause));
    world.run_system_once(handle_pause_command).expect("System should run successfully");
    assert_that(&world.resource::<PauseState>().active()).is_true();

    world.resource_mut::<bevy_ecs::event::Events<GameEvent>>().clear();
    common::send_game_event(&mut world, GameEvent::Command(GameCommand::TogglePause));
    world.run_system_once(handle_pause_command).expect("System should run successfully");
    assert_that(&world.resource::<PauseState>().active()).is_false();
}

#[test]
fn test_pause_ignored_after_game_over() {
    let mut world = common::create_test_world();
    world.insert_resource(GameStage::GameOver);

    common::send_game_event(&mut world, GameEvent::Command(GameCommand::TogglePause));
    world.run_system_once(handle_pause_command).expect("System should run successfully");

    assert_that(&world.resource::<PauseState>().active()).is_false();
}

#[test]
fn test_stage_waits_while_alive() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);

    world.run_system_once(stage_system).expect("System should run successfully");

    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::Playing);
    assert_that(&world.resource::<Spawner>().is_spawning()).is_true();
}

#[test]
fn test_death_purges_arena_and_plays_death() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    common::spawn_wave(&mut world, ShapeKind::Circle, Side::Left, 4.0);
    common::spawn_powerup(&mut world, PowerupKind::Score, Vec2::new(2.0, 2.0));
    kill_player(&mut world);

    world.run_system_once(stage_system).expect("System should run successfully");

    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::Dying);
    assert_that(&world.resource::<Spawner>().is_spawning()).is_false();
    assert_that(&world.resource::<PowerupSpawner>().is_spawning()).is_false();
    assert_that(&common::count::<Projectile>(&mut world)).is_equal_to(0);
    assert_that(&common::count::<Powerup>(&mut world)).is_equal_to(0);
    assert_that(&common::player_animator(&mut world).state()).is_equal_to(AnimationState::Death);

    // Runs only once per round
    world.run_system_once(stage_system).expect("System should run successfully");
    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::Dying);
}

#[test]
fn test_death_animation_ends_the_round() {
    let mut world = common::create_test_world();
    let display = MemoryDisplay::default();
    let high_scores = MemoryHighScores::default();
    world.insert_resource(DisplayResource(Some(Box::new(display.clone()))));
    world.insert_resource(HighScoreResource(Some(Box::new(high_scores.clone()))));
    common::spawn_test_player(&mut world);
    kill_player(&mut world);

    world.run_system_once(stage_system).expect("System should run successfully");
    common::set_delta(&mut world, 0.1);
    for _ in 0..7 {
        world.run_system_once(animation_system).expect("System should run successfully");
    }
    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::Dying);

    world.run_system_once(animation_system).expect("System should run successfully");

    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::GameOver);
    assert_that(&world.resource::<GameClock>().is_frozen()).is_true();
    assert_that(&display.final_scores()).is_equal_to(vec![100]);
    assert_that(&*high_scores.best.lock()).is_equal_to(Some(100));
    assert_that(&world.resource::<ScoreSubmission>().is_armed()).is_true();
}

#[test]
fn test_lower_score_keeps_high_score() {
    let mut world = common::create_test_world();
    let high_scores = MemoryHighScores::default();
    *high_scores.best.lock() = Some(500);
    world.insert_resource(HighScoreResource(Some(Box::new(high_scores.clone()))));
    common::spawn_test_player(&mut world);
    kill_player(&mut world);

    world.run_system_once(stage_system).expect("System should run successfully");
    run_death_animation(&mut world);

    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::GameOver);
    assert_that(&*high_scores.best.lock()).is_equal_to(Some(500));
}

#[test]
fn test_round_ends_without_player_entity() {
    let mut world = common::create_test_world();
    kill_player(&mut world);

    world.run_system_once(stage_system).expect("System should run successfully");

    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::GameOver);
    assert_that(&world.resource::<ScoreSubmission>().is_armed()).is_true();
}

#[test]
fn test_finish_round_requires_dying() {
    let mut world = common::create_test_world();

    finish_round(&mut world);

    assert_that(&*world.resource::<GameStage>()).is_equal_to(GameStage::Playing);
    assert_that(&world.resource::<GameClock>().is_frozen()).is_false();
    assert_that(&world.resource::<ScoreSubmission>().is_armed()).is_false();
}
