use std::time::Duration;

use bevy::prelude::Vec3;
use mv_utils::EntitySnapshot;

use super::{EntityTracker, TrackerChange, TrackerConfig};
use crate::model::{EntityVisual, PlaceholderBox};
use crate::registry::BoneModelRegistry;

fn tracker() -> EntityTracker {
    EntityTracker::new(BoneModelRegistry::builtin(), TrackerConfig::default())
}

fn secs(s: f32) -> Duration {
    Duration::from_secs_f32(s)
}

#[test]
fn first_snapshot_spawns_with_fresh_estimate() {
    let mut tracker = tracker();
    let change = tracker.apply(
        &EntitySnapshot::new(1)
            .with_name("zombie")
            .with_pos(Vec3::new(5.0, 64.0, 5.0)),
        secs(1.0),
    );
    assert_eq!(change, Some(TrackerChange::Spawned(1)));

    let entity = tracker.get(1).unwrap();
    assert_eq!(entity.entity_type(), Some("zombie"));
    assert!(!entity.visual().is_placeholder());
    assert_eq!(entity.position(), Vec3::new(5.0, 64.0, 5.0));
    assert!(entity.estimate().on_ground);
    assert_eq!(entity.estimate().velocity, Vec3::ZERO);
}

#[test]
fn position_snapshots_update_velocity() {
    let mut tracker = tracker();
    tracker.apply(&EntitySnapshot::new(1).with_name("pig").with_pos(Vec3::ZERO), secs(0.0));
    let change = tracker.apply(&EntitySnapshot::new(1).with_pos(Vec3::X), secs(1.0));
    assert_eq!(change, None);
    assert_eq!(tracker.get(1).unwrap().estimate().velocity, Vec3::X);

    // Same timestamp again: velocity is kept.
    tracker.apply(&EntitySnapshot::new(1).with_pos(Vec3::new(3.0, 0.0, 0.0)), secs(1.0));
    let estimate = tracker.get(1).unwrap().estimate();
    assert_eq!(estimate.velocity, Vec3::X);
    assert_eq!(estimate.last_position, Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn delete_then_readd_starts_over() {
    let mut tracker = tracker();
    tracker.apply(&EntitySnapshot::new(9).with_name("cow").with_pos(Vec3::ZERO), secs(0.0));
    tracker.apply(&EntitySnapshot::new(9).with_pos(Vec3::new(2.0, -3.0, 0.0)), secs(1.0));
    let before = tracker.get(9).unwrap().estimate();
    assert!(!before.on_ground);
    assert_ne!(before.velocity, Vec3::ZERO);

    let deleted = EntitySnapshot {
        pos: Some(Vec3::ONE.into()),
        ..EntitySnapshot::deleted(9)
    };
    assert_eq!(tracker.apply(&deleted, secs(2.0)), Some(TrackerChange::Removed(9)));
    assert!(tracker.get(9).is_none());

    let change = tracker.apply(&EntitySnapshot::new(9).with_pos(Vec3::new(2.0, -3.0, 0.0)), secs(3.0));
    assert_eq!(change, Some(TrackerChange::Spawned(9)));
    let entity = tracker.get(9).unwrap();
    assert!(entity.estimate().on_ground);
    assert_eq!(entity.estimate().velocity, Vec3::ZERO);
    // The new snapshot carried no name, so this is not the old cow.
    assert!(entity.visual().is_placeholder());
}

#[test]
fn deleting_unknown_id_is_a_no_op() {
    let mut tracker = tracker();
    assert_eq!(tracker.apply(&EntitySnapshot::deleted(42), secs(0.0)), None);
    assert!(tracker.is_empty());
}

#[test]
fn unknown_type_becomes_sized_placeholder() {
    let mut tracker = tracker();
    let snapshot = EntitySnapshot {
        width: Some(1.4),
        height: Some(0.9),
        ..EntitySnapshot::new(3).with_name("strider_jockey")
    };
    tracker.apply(&snapshot, secs(0.0));
    let entity = tracker.get(3).unwrap();
    assert_eq!(
        entity.visual(),
        &EntityVisual::Placeholder(PlaceholderBox {
            width: 1.4,
            height: 0.9
        })
    );
    assert_eq!(entity.height(), 0.9);

    // Ticking a placeholder is harmless.
    tracker.tick(secs(0.05));
}

#[test]
fn clear_removes_everything() {
    let mut tracker = tracker();
    for id in 0..4 {
        tracker.apply(&EntitySnapshot::new(id).with_name("skeleton"), secs(0.0));
    }
    let mut removed = tracker.clear();
    removed.sort();
    assert_eq!(removed, vec![0, 1, 2, 3]);
    assert!(tracker.is_empty());
    assert!(tracker.clear().is_empty());
}

fn walk_cycle(tracker: &EntityTracker, id: i64) -> f32 {
    tracker
        .get(id)
        .and_then(|e| e.visual().model())
        .map(|m| m.animation().walk_cycle)
        .unwrap()
}

#[test]
fn tick_walks_while_fresh_and_stops_when_stale() {
    let mut tracker = tracker();
    tracker.apply(&EntitySnapshot::new(1).with_name("player").with_pos(Vec3::ZERO), secs(0.0));
    tracker.apply(&EntitySnapshot::new(1).with_pos(Vec3::new(0.4, 0.0, 0.0)), secs(0.1));

    // 4 blocks/s is 0.2 blocks/tick.
    tracker.tick(secs(0.15));
    let model = tracker.get(1).unwrap().visual().model().unwrap();
    assert!(model.animation().is_moving);
    assert!((model.animation().velocity.x - 0.2).abs() < 1e-5);
    let cycle = walk_cycle(&tracker, 1);
    assert!(cycle > 0.0);

    tracker.tick(secs(1.0));
    let model = tracker.get(1).unwrap().visual().model().unwrap();
    assert!(!model.animation().is_moving);
    assert_eq!(walk_cycle(&tracker, 1), cycle);
}

#[test]
fn flags_and_attack_reach_the_animation() {
    let mut tracker = tracker();
    tracker.apply(&EntitySnapshot::new(1).with_name("zombie"), secs(0.0));
    let snapshot = EntitySnapshot {
        is_sneaking: Some(true),
        attack: Some(true),
        ..EntitySnapshot::new(1)
    };
    tracker.apply(&snapshot, secs(0.01));
    tracker.tick(secs(0.05));

    let animation = tracker.get(1).unwrap().visual().model().unwrap().animation();
    assert!(animation.is_sneaking);
    assert!(animation.is_attacking);
    assert_eq!(animation.attack_time, 5);

    // Absent fields leave the latched flags alone.
    tracker.apply(&EntitySnapshot::new(1), secs(0.06));
    tracker.tick(secs(0.1));
    let animation = tracker.get(1).unwrap().visual().model().unwrap().animation();
    assert!(animation.is_sneaking);
}

#[test]
fn advance_interpolates_position_and_yaw() {
    let mut tracker = tracker();
    tracker.apply(&EntitySnapshot::new(1).with_name("creeper").with_yaw(3.0), secs(0.0));
    tracker.apply(
        &EntitySnapshot::new(1)
            .with_pos(Vec3::new(1.0, 0.0, 0.0))
            .with_yaw(-3.0),
        secs(0.05),
    );

    tracker.advance(Duration::from_millis(25));
    let entity = tracker.get(1).unwrap();
    assert!((entity.position().x - 0.5).abs() < 1e-5);
    assert!(entity.yaw() > 3.0);

    tracker.advance(Duration::from_millis(25));
    let entity = tracker.get(1).unwrap();
    assert_eq!(entity.position(), Vec3::new(1.0, 0.0, 0.0));
    assert!((entity.yaw() - 3.2832).abs() < 1e-3);
}
