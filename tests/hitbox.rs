use bevy_ecs::{entity::Entity, system::RunSystemOnce, world::World};
use glam::Vec2;
use riposte::config::{AnimationConfig, HitboxConfig};
use riposte::systems::{
    hitbox_sync_system, sword_collision_system, AnimationState, AudioEvent, PlayerAction, Projectile, ShapeKind, Side,
    SpriteAnimator, SwordHitbox,
};
use speculoos::prelude::*;

mod common;

/// Starts `state` on the test player facing `side` and steps it to the first live frame.
fn swing(world: &mut World, state: AnimationState, side: Side) {
    {
        let mut animator = common::player_animator_mut(world);
        animator.set_facing(side == Side::Right);
        animator.play(state, false);
        animator.tick(0.1);
        animator.tick(0.1);
    }
    world.run_system_once(hitbox_sync_system).expect("System should run successfully");
}

fn setup() -> World {
    let mut world = common::create_test_world();
    common::spawn_test_player(&mut world);
    world
}

fn alive(world: &World, entity: Entity) -> bool {
    world.get_entity(entity).is_ok()
}

#[test]
fn test_box_follows_facing() {
    let mut sword = SwordHitbox::new(&HitboxConfig::default());

    assert_that(&sword.center(Vec2::ZERO)).is_equal_to(Vec2::new(0.3, 0.0));
    sword.facing_right = false;
    assert_that(&sword.center(Vec2::ZERO)).is_equal_to(Vec2::new(-0.3, 0.0));
    assert_that(&sword.side()).is_equal_to(Side::Left);
}

#[test]
fn test_circle_overlap() {
    let sword = SwordHitbox::new(&HitboxConfig::default());

    // Box spans x 0.05..0.55; a 0.5 radius reaches it from up to 1.05
    assert_that(&sword.overlaps_circle(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.5)).is_true();
    assert_that(&sword.overlaps_circle(Vec2::ZERO, Vec2::new(1.1, 0.0), 0.5)).is_false();
    assert_that(&sword.overlaps_circle(Vec2::ZERO, Vec2::new(-1.0, 0.0), 0.5)).is_false();
    assert_that(&sword.overlaps_circle(Vec2::ZERO, Vec2::new(0.3, 0.7), 0.5)).is_true();
    assert_that(&sword.overlaps_circle(Vec2::ZERO, Vec2::new(0.3, 0.8), 0.5)).is_false();
}

#[test]
fn test_sync_captures_attack_on_rising_edge() {
    let mut sword = SwordHitbox::new(&HitboxConfig::default());
    let mut animator = SpriteAnimator::new(AnimationConfig::default());

    animator.set_facing(false);
    animator.play(AnimationState::Attack2, false);
    sword.sync(&animator);
    assert_that(&sword.active).is_false();
    assert_that(&sword.attack).is_none();

    animator.tick(0.1);
    animator.tick(0.1);
    sword.sync(&animator);
    assert_that(&sword.active).is_true();
    assert_that(&sword.attack).is_equal_to(Some(ShapeKind::Circle));
    assert_that(&sword.side()).is_equal_to(Side::Left);

    // Turning mid-window does not move a live box
    animator.set_facing(true);
    animator.tick(0.1);
    sword.sync(&animator);
    assert_that(&sword.side()).is_equal_to(Side::Left);

    animator.tick(0.1);
    animator.tick(0.1);
    sword.sync(&animator);
    assert_that(&sword.active).is_false();
    assert_that(&sword.attack).is_none();
}

#[test]
fn test_correct_hit_clears_wave() {
    let mut world = setup();
    let (real, decoy) = common::spawn_wave(&mut world, ShapeKind::Square, Side::Right, 1.0);

    swing(&mut world, AnimationState::Attack, Side::Right);
    world.run_system_once(sword_collision_system).expect("System should run successfully");

    assert_that(&common::written::<PlayerAction>(&world)).is_equal_to(vec![PlayerAction::ClickResult { correct: true }]);
    assert_that(&alive(&world, real)).is_false();
    assert_that(&alive(&world, decoy)).is_false();
    assert_that(&common::written::<AudioEvent>(&world)).is_equal_to(vec![AudioEvent::StopAt(Side::Right)]);
}

#[test]
fn test_wrong_attack_is_incorrect() {
    let mut world = setup();
    common::spawn_wave(&mut world, ShapeKind::Square, Side::Left, 1.0);

    swing(&mut world, AnimationState::Attack2, Side::Left);
    world.run_system_once(sword_collision_system).expect("System should run successfully");

    assert_that(&common::written::<PlayerAction>(&world)).is_equal_to(vec![PlayerAction::ClickResult { correct: false }]);
    assert_that(&common::count::<Projectile>(&mut world)).is_equal_to(0);
}

#[test]
fn test_striking_the_decoy_is_incorrect() {
    let mut world = setup();
    common::spawn_wave(&mut world, ShapeKind::Circle, Side::Right, 1.0);

    swing(&mut world, AnimationState::Attack2, Side::Left);
    world.run_system_once(sword_collision_system).expect("System should run successfully");

    assert_that(&common::written::<PlayerAction>(&world)).is_equal_to(vec![PlayerAction::ClickResult { correct: false }]);
    assert_that(&common::count::<Projectile>(&mut world)).is_equal_to(0);
}

#[test]
fn test_out_of_reach_projectiles_survive() {
    let mut world = setup();
    common::spawn_wave(&mut world, ShapeKind::Square, Side::Right, 3.0);

    swing(&mut world, AnimationState::Attack, Side::Right);
    world.run_system_once(sword_collision_system).expect("System should run successfully");

    assert_that(&common::written::<PlayerAction>(&world)).is_empty();
    assert_that(&common::count::<Projectile>(&mut world)).is_equal_to(2);
}

#[test]
fn test_inactive_sword_never_connects() {
    let mut world = setup();
    common::spawn_wave(&mut world, ShapeKind::Square, Side::Right, 1.0);

    common::player_animator_mut(&mut world).play(AnimationState::Attack, false);
    world.run_system_once(hitbox_sync_system).expect("System should run successfully");
    world.run_system_once(sword_collision_system).expect("System should run successfully");

    assert_that(&common::written::<PlayerAction>(&world)).is_empty();
    assert_that(&common::count::<Projectile>(&mut world)).is_equal_to(2);
}

#[test]
fn test_resolved_projectiles_are_ignored() {
    let mut world = setup();
    let (real, _) = common::spawn_wave(&mut world, ShapeKind::Square, Side::Right, 1.0);
    world
        .get_mut::<Projectile>(real)
        .expect("projectile exists")
        .mark_resolved();

    swing(&mut world, AnimationState::Attack, Side::Right);
    world.run_system_once(sword_collision_system).expect("System should run successfully");

    assert_that(&common::written::<PlayerAction>(&world)).is_empty();
}
