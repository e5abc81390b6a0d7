use std::collections::HashMap;

use bevy::prelude::*;
use bevy::render::mesh::skinning::SkinnedMeshInverseBindposes;
use bevy_egui::{EguiContexts, egui};
use mv_entity::{EntityTracker, EntityVisual, TrackerChange};
use mv_utils::{EntityId, FeedMessage, FeedReceiver};
use tracing::debug;

use crate::components::{BoneJoint, EntityRoot, ViewerCamera};
use crate::mesh::{SpawnedVisual, spawn_placeholder, spawn_skinned};
use crate::textures::{TextureResolver, apply_texture};

/// Name tags float this far above the top of the entity, in blocks.
const NAME_TAG_CLEARANCE: f32 = 0.6;

#[derive(Resource, Default)]
pub struct SpawnedEntities(pub HashMap<EntityId, SpawnedVisual>);

fn despawn_visual(commands: &mut Commands, spawned: &mut SpawnedEntities, id: EntityId) {
    if let Some(visual) = spawned.0.remove(&id) {
        commands.entity(visual.root).despawn();
    }
}

/// Drains the snapshot feed into the tracker and keeps the scene graph in
/// step with its lifecycle changes.
#[allow(clippy::too_many_arguments)]
pub fn apply_feed_messages(
    mut commands: Commands,
    feed: Res<FeedReceiver>,
    time: Res<Time<Virtual>>,
    mut tracker: ResMut<EntityTracker>,
    mut spawned: ResMut<SpawnedEntities>,
    mut resolver: ResMut<TextureResolver>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut inverse_bindposes: ResMut<Assets<SkinnedMeshInverseBindposes>>,
) {
    let now = time.elapsed();
    while let Ok(message) = feed.0.try_recv() {
        let snapshot = match message {
            FeedMessage::Snapshot(snapshot) => snapshot,
            FeedMessage::Clear => {
                for id in tracker.clear() {
                    despawn_visual(&mut commands, &mut spawned, id);
                }
                continue;
            }
        };

        match tracker.apply(&snapshot, now) {
            Some(TrackerChange::Removed(id)) => despawn_visual(&mut commands, &mut spawned, id),
            Some(TrackerChange::Spawned(id)) => {
                despawn_visual(&mut commands, &mut spawned, id);
                let Some(entity) = tracker.get(id) else {
                    continue;
                };
                let visual = match entity.visual() {
                    EntityVisual::Skinned(model) => {
                        let visual = spawn_skinned(
                            &mut commands,
                            &mut meshes,
                            &mut materials,
                            &mut inverse_bindposes,
                            id,
                            model,
                            entity.position(),
                            entity.yaw(),
                        );
                        for (part, spawned_part) in model.parts().iter().zip(&visual.parts) {
                            let source = resolver.source_for(&part.texture, entity.username());
                            if let Some(image) = resolver.resolve(spawned_part.mesh, source) {
                                apply_texture(&mut materials, &spawned_part.material, image);
                            }
                        }
                        visual
                    }
                    EntityVisual::Placeholder(placeholder) => spawn_placeholder(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        id,
                        placeholder,
                        entity.position(),
                        entity.yaw(),
                    ),
                };
                debug!("spawned visual for entity {id}");
                spawned.0.insert(id, visual);
            }
            None => {}
        }
    }
}

/// One game tick of procedural animation for every tracked entity.
pub fn tick_entity_animations(time: Res<Time<Virtual>>, mut tracker: ResMut<EntityTracker>) {
    tracker.tick(time.elapsed());
}

pub fn advance_entity_tweens(time: Res<Time>, mut tracker: ResMut<EntityTracker>) {
    tracker.advance(time.delta());
}

/// Copies interpolated root transforms and posed bones into the scene graph.
pub fn sync_entity_transforms(
    tracker: Res<EntityTracker>,
    mut roots: Query<(&EntityRoot, &mut Transform), Without<BoneJoint>>,
    mut joints: Query<(&BoneJoint, &mut Transform), Without<EntityRoot>>,
) {
    for (root, mut transform) in &mut roots {
        let Some(entity) = tracker.get(root.0) else {
            continue;
        };
        transform.translation = entity.position();
        transform.rotation = Quat::from_rotation_y(entity.yaw());
    }

    for (joint, mut transform) in &mut joints {
        let Some(skeleton) = tracker
            .get(joint.entity)
            .and_then(|entity| entity.visual().model())
            .and_then(|model| model.parts().get(joint.part))
            .map(|part| &part.skeleton)
        else {
            continue;
        };
        if joint.bone < skeleton.bones().len() {
            transform.translation = skeleton.local_translation(joint.bone);
            transform.rotation = skeleton.local_rotation(joint.bone);
        }
    }
}

pub fn draw_entity_name_tags(
    mut contexts: EguiContexts,
    camera_query: Query<(&Camera, &GlobalTransform), With<ViewerCamera>>,
    tracker: Res<EntityTracker>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("entity_name_tags"),
    ));

    for entity in tracker.iter() {
        let Some(username) = entity.username() else {
            continue;
        };
        let world_pos = entity.position() + Vec3::Y * (entity.height() + NAME_TAG_CLEARANCE);
        let Ok(screen_pos) = camera.world_to_viewport(camera_transform, world_pos) else {
            continue;
        };
        painter.text(
            egui::pos2(screen_pos.x, screen_pos.y),
            egui::Align2::CENTER_BOTTOM,
            username,
            egui::TextStyle::Body.resolve(&ctx.style()),
            egui::Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::ecs::system::RunSystemOnce;
    use bevy::ecs::world::CommandQueue;
    use mv_entity::{BoneModelRegistry, TrackerConfig};
    use mv_utils::EntitySnapshot;

    use super::*;

    #[test]
    fn sync_follows_tracker_through_joint_components() {
        let mut tracker = EntityTracker::new(BoneModelRegistry::builtin(), TrackerConfig::default());
        tracker.apply(
            &EntitySnapshot::new(5).with_name("zombie").with_pos(Vec3::ZERO),
            Duration::ZERO,
        );

        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut inverse_bindposes = Assets::<SkinnedMeshInverseBindposes>::default();
        let mut world = World::new();
        let mut queue = CommandQueue::default();
        let visual = {
            let EntityVisual::Skinned(model) = tracker.get(5).unwrap().visual() else {
                panic!("zombie should have a skinned model");
            };
            let mut commands = Commands::new(&mut queue, &world);
            spawn_skinned(
                &mut commands,
                &mut meshes,
                &mut materials,
                &mut inverse_bindposes,
                5,
                model,
                Vec3::ZERO,
                0.0,
            )
        };
        queue.apply(&mut world);

        tracker.apply(
            &EntitySnapshot::new(5)
                .with_pos(Vec3::new(2.0, 0.0, 1.0))
                .with_yaw(1.0),
            Duration::from_millis(50),
        );
        tracker.advance(Duration::from_secs(1));
        for &joint in &visual.parts[0].joints {
            world.get_mut::<Transform>(joint).unwrap().translation = Vec3::splat(99.0);
        }
        world.insert_resource(tracker);
        world.run_system_once(sync_entity_transforms).unwrap();

        let root = world.get::<Transform>(visual.root).unwrap();
        assert_eq!(root.translation, Vec3::new(2.0, 0.0, 1.0));
        assert!(root.rotation.abs_diff_eq(Quat::from_rotation_y(1.0), 1e-5));

        let tracker = world.resource::<EntityTracker>();
        let model = tracker.get(5).unwrap().visual().model().unwrap();
        let skeleton = &model.parts()[0].skeleton;
        for (bone, &joint) in visual.parts[0].joints.iter().enumerate() {
            let transform = world.get::<Transform>(joint).unwrap();
            assert_eq!(transform.translation, skeleton.local_translation(bone));
            assert_eq!(transform.rotation, skeleton.local_rotation(bone));
        }
    }
}
