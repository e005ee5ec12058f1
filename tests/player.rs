use bevy_ecs::{event::Events, system::RunSystemOnce};
use glam::Vec2;
use riposte::config::PlayerConfig;
use riposte::error::GameError;
use riposte::events::MouseButton;
use riposte::systems::{
    player_action_system, player_input_system, ActionOutcome, AnimationState, AudioEvent, HeartState, PlayerAction,
    PlayerState, Sound,
};
use speculoos::prelude::*;

mod common;

fn player() -> PlayerState {
    PlayerState::new(&PlayerConfig::default())
}

#[test]
fn test_correct_hit_scores_with_multiplier() {
    let mut player = player();

    assert_that(&player.process_click_result(true)).is_equal_to(ActionOutcome::Scored { points: 100 });
    player.add_multiplier();
    player.add_multiplier();
    assert_that(&player.multiplier()).is_equal_to(3);
    assert_that(&player.process_click_result(true)).is_equal_to(ActionOutcome::Scored { points: 300 });
    assert_that(&player.score()).is_equal_to(400);
}

#[test]
fn test_consecutive_hits_keep_multiplier() {
    let mut player = player();

    for _ in 0..3 {
        player.process_click_result(true);
    }

    assert_that(&player.score()).is_equal_to(300);
    assert_that(&player.multiplier()).is_equal_to(1);
}

#[test]
fn test_miss_resets_any_multiplier() {
    let mut player = player();
    for _ in 0..7 {
        player.add_multiplier();
    }

    player.register_miss();

    assert_that(&player.multiplier()).is_equal_to(1);
}

#[test]
fn test_incorrect_hit_costs_a_life() {
    let mut player = player();
    player.add_multiplier();

    assert_that(&player.process_click_result(false)).is_equal_to(ActionOutcome::Missed { died: false });
    assert_that(&player.misses()).is_equal_to(1);
    assert_that(&player.multiplier()).is_equal_to(1);
    assert_that(&player.score()).is_equal_to(0);
    assert_that(&player.is_damaged()).is_true();
}

#[test]
fn test_dies_on_last_miss_and_ignores_everything_after() {
    let mut player = player();

    player.register_miss();
    player.register_miss();
    assert_that(&player.register_miss()).is_equal_to(ActionOutcome::Missed { died: true });
    assert_that(&player.is_alive()).is_false();

    assert_that(&player.register_miss()).is_equal_to(ActionOutcome::Ignored);
    assert_that(&player.process_click_result(true)).is_equal_to(ActionOutcome::Ignored);
    assert_that(&player.add_multiplier()).is_equal_to(ActionOutcome::Ignored);
    assert_that(&player.heal()).is_equal_to(ActionOutcome::Ignored);
    assert_that(&player.misses()).is_equal_to(3);
    assert_that(&player.score()).is_equal_to(0);
    assert_that(&player.hearts().iter().filter(|heart| **heart == HeartState::Full).count()).is_equal_to(0);
}

#[test]
fn test_heal_restores_one_life() {
    let mut player = player();

    assert_that(&player.heal()).is_equal_to(ActionOutcome::Ignored);
    player.register_miss();
    player.register_miss();
    assert_that(&player.heal()).is_equal_to(ActionOutcome::Healed { misses: 1 });
    assert_that(&player.misses()).is_equal_to(1);
}

#[test]
fn test_hearts_track_misses() {
    let mut player = player();
    assert_that(&player.hearts().to_vec()).is_equal_to(vec![HeartState::Full; 3]);

    player.register_miss();
    assert_that(&player.hearts().to_vec()).is_equal_to(vec![HeartState::Full, HeartState::Full, HeartState::Empty]);
}

#[test]
fn test_left_press_starts_square_attack_toward_pointer() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    common::press(&mut world, MouseButton::Left, Vec2::new(3.0, 1.0));

    world.run_system_once(player_input_system).expect("System should run successfully");

    let animator = common::player_animator(&mut world);
    assert_that(&animator.state()).is_equal_to(AnimationState::Attack);
    assert_that(&animator.facing_right()).is_true();
    assert_that(&common::written::<AudioEvent>(&world)).is_equal_to(vec![AudioEvent::Play(Sound::Swing)]);
}

#[test]
fn test_right_press_on_left_half_faces_left() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    common::press(&mut world, MouseButton::Right, Vec2::new(-2.0, 0.0));

    world.run_system_once(player_input_system).expect("System should run successfully");

    let animator = common::player_animator(&mut world);
    assert_that(&animator.state()).is_equal_to(AnimationState::Attack2);
    assert_that(&animator.facing_right()).is_false();
}

#[test]
fn test_press_during_animation_is_ignored() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    common::player_animator_mut(&mut world).play(AnimationState::Hit, false);
    common::press(&mut world, MouseButton::Left, Vec2::new(2.0, 0.0));

    world.run_system_once(player_input_system).expect("System should run successfully");

    assert_that(&common::player_animator(&mut world).state()).is_equal_to(AnimationState::Hit);
    assert_that(&common::written::<AudioEvent>(&world)).is_empty();
}

#[test]
fn test_dead_player_cannot_attack() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    {
        let mut player = world.resource_mut::<PlayerState>();
        for _ in 0..3 {
            player.register_miss();
        }
    }
    common::press(&mut world, MouseButton::Left, Vec2::new(2.0, 0.0));

    world.run_system_once(player_input_system).expect("System should run successfully");

    assert_that(&common::player_animator(&mut world).state()).is_equal_to(AnimationState::Idle);
}

#[test]
fn test_missing_player_reports_error() {
    let mut world = common::create_test_world();
    common::press(&mut world, MouseButton::Left, Vec2::new(2.0, 0.0));

    world.run_system_once(player_input_system).expect("System should run successfully");

    let errors = world.resource::<Events<GameError>>();
    assert_that(&errors.iter_current_update_events().count()).is_equal_to(1);
}

#[test]
fn test_actions_update_state_and_feedback() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    common::send_player_action(&mut world, PlayerAction::ClickResult { correct: true });
    common::send_player_action(&mut world, PlayerAction::Miss);

    world.run_system_once(player_action_system).expect("System should run successfully");

    let player = world.resource::<PlayerState>();
    assert_that(&player.score()).is_equal_to(100);
    assert_that(&player.misses()).is_equal_to(1);
    assert_that(&common::written::<AudioEvent>(&world))
        .is_equal_to(vec![AudioEvent::Play(Sound::Hit), AudioEvent::Play(Sound::Miss)]);
    assert_that(&common::player_animator(&mut world).state()).is_equal_to(AnimationState::Hit);
}

#[test]
fn test_fatal_miss_skips_hit_animation() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    {
        let mut player = world.resource_mut::<PlayerState>();
        player.register_miss();
        player.register_miss();
    }
    common::send_player_action(&mut world, PlayerAction::Miss);

    world.run_system_once(player_action_system).expect("System should run successfully");

    assert_that(&world.resource::<PlayerState>().is_alive()).is_false();
    assert_that(&common::player_animator(&mut world).state()).is_equal_to(AnimationState::Idle);
}

#[test]
fn test_powerup_actions() {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    world.resource_mut::<PlayerState>().register_miss();
    common::send_player_action(&mut world, PlayerAction::Heal);
    common::send_player_action(&mut world, PlayerAction::AddMultiplier);
    common::send_player_action(&mut world, PlayerAction::Heal);

    world.run_system_once(player_action_system).expect("System should run successfully");

    let player = world.resource::<PlayerState>();
    assert_that(&player.misses()).is_equal_to(0);
    assert_that(&player.multiplier()).is_equal_to(2);
    // The second heal found nothing to restore
    assert_that(&common::written::<AudioEvent>(&world))
        .is_equal_to(vec![AudioEvent::Play(Sound::Heal), AudioEvent::Play(Sound::Multiplier)]);
}
