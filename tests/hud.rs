use bevy_ecs::system::RunSystemOnce;
use pretty_assertions::assert_eq;
use riposte::collaborators::{DisplayResource, MemoryDisplay};
use riposte::config::PlayerConfig;
use riposte::systems::{hud_system, HeartState, HudSnapshot, PlayerState};
use speculoos::prelude::*;

mod common;

#[test]
fn test_snapshot_text() {
    let mut player = PlayerState::new(&PlayerConfig::default());
    for _ in 0..12 {
        player.process_click_result(true);
    }
    player.register_miss();
    player.add_multiplier();

    let snapshot = HudSnapshot::from(&player);
    assert_eq!(snapshot.score_text(), "Score: 1,200");
    assert_eq!(snapshot.misses_text(), "Misses: 1/3");
    assert_eq!(snapshot.multiplier_text(), "x2");
    assert_eq!(snapshot.full_hearts(), 2);
    assert_eq!(snapshot.hearts.last(), Some(&HeartState::Empty));
}

#[test]
fn test_hud_pushes_snapshot_to_display() {
    let mut world = common::create_test_world();
    let display = MemoryDisplay::default();
    world.insert_resource(DisplayResource(Some(Box::new(display.clone()))));
    world.resource_mut::<PlayerState>().process_click_result(true);

    world.run_system_once(hud_system).expect("System should run successfully");

    let snapshot = display.last_snapshot().expect("a snapshot was pushed");
    assert_that(&snapshot.score).is_equal_to(100);
    assert_that(&snapshot.max_misses).is_equal_to(3);
}

#[test]
fn test_hud_without_display_is_silent() {
    let mut world = common::create_test_world();

    world.run_system_once(hud_system).expect("System should run successfully");
}
