use bevy::prelude::*;
use bevy::render::mesh::skinning::{SkinnedMesh, SkinnedMeshInverseBindposes};
use bevy::render::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::view::NoFrustumCulling;
use mv_entity::{EntityModel, GeometryBuffers, MODEL_SCALE, ModelPart, PlaceholderBox};
use mv_utils::EntityId;

use crate::components::{BoneJoint, EntityRoot};

const PLACEHOLDER_COLOR: Color = Color::srgb(1.0, 0.0, 1.0);
const UNTEXTURED_COLOR: Color = Color::srgb(0.6, 0.6, 0.6);

#[derive(Debug, Clone)]
pub struct SpawnedPart {
    /// The skinned mesh; texture results are addressed to it.
    pub mesh: Entity,
    pub material: Handle<StandardMaterial>,
    /// One per bone, in skeleton order.
    pub joints: Vec<Entity>,
}

#[derive(Debug, Clone)]
pub struct SpawnedVisual {
    pub root: Entity,
    /// Same order as `EntityModel::parts`. Empty for placeholders.
    pub parts: Vec<SpawnedPart>,
}

/// Model-pixel vertex streams as a skinned triangle mesh.
pub fn geometry_mesh(geometry: &GeometryBuffers) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, geometry.positions.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, geometry.normals.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, geometry.uvs.clone());
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_JOINT_INDEX,
        VertexAttributeValues::Uint16x4(geometry.joint_indices.clone()),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_JOINT_WEIGHT, geometry.joint_weights.clone());
    mesh.insert_indices(Indices::U32(geometry.indices.clone()));
    mesh
}

fn entity_material() -> StandardMaterial {
    StandardMaterial {
        base_color: UNTEXTURED_COLOR,
        // Cutout pixels (eyes, hat layer) have zero alpha.
        alpha_mode: AlphaMode::Mask(0.1),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..Default::default()
    }
}

fn spawn_root(commands: &mut Commands, id: EntityId, position: Vec3, yaw: f32) -> Entity {
    commands
        .spawn((
            Name::new(format!("Entity[{id}]")),
            EntityRoot(id),
            Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
            GlobalTransform::default(),
            Visibility::Visible,
            InheritedVisibility::default(),
            ViewVisibility::default(),
        ))
        .id()
}

fn spawn_part(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    inverse_bindposes: &mut Assets<SkinnedMeshInverseBindposes>,
    id: EntityId,
    root: Entity,
    part_idx: usize,
    part: &ModelPart,
) -> SpawnedPart {
    // Scales the part from model pixels to blocks.
    let part_node = commands
        .spawn((
            Name::new(format!("EntityPart[{}]", part.name)),
            Transform::from_scale(Vec3::splat(MODEL_SCALE)),
            GlobalTransform::default(),
            Visibility::Visible,
            InheritedVisibility::default(),
            ViewVisibility::default(),
        ))
        .id();
    commands.entity(root).add_child(part_node);

    let skeleton = &part.skeleton;

    // All joints first so parents can be attached in any declaration order.
    let joints: Vec<Entity> = skeleton
        .bones()
        .iter()
        .enumerate()
        .map(|(bone_idx, bone)| {
            commands
                .spawn((
                    Name::new(format!("Bone[{}]", bone.name)),
                    BoneJoint {
                        entity: id,
                        part: part_idx,
                        bone: bone_idx,
                    },
                    Transform::from_translation(skeleton.local_translation(bone_idx))
                        .with_rotation(skeleton.local_rotation(bone_idx)),
                    GlobalTransform::default(),
                ))
                .id()
        })
        .collect();

    for (bone_idx, bone) in skeleton.bones().iter().enumerate() {
        let parent = bone.parent.map(|p| joints[p]).unwrap_or(part_node);
        commands.entity(parent).add_child(joints[bone_idx]);
    }

    let bindposes = inverse_bindposes.add(SkinnedMeshInverseBindposes::from(
        skeleton.inverse_bindposes(),
    ));
    let material = materials.add(entity_material());
    let mesh = commands
        .spawn((
            Name::new(format!("EntityMesh[{}]", part.name)),
            Mesh3d(meshes.add(geometry_mesh(&part.geometry))),
            MeshMaterial3d(material.clone()),
            SkinnedMesh {
                inverse_bindposes: bindposes,
                joints: joints.clone(),
            },
            // Skinned bounds follow the bind pose, not the animated one.
            NoFrustumCulling,
            Transform::IDENTITY,
            GlobalTransform::default(),
            Visibility::Visible,
            InheritedVisibility::default(),
            ViewVisibility::default(),
        ))
        .id();
    commands.entity(part_node).add_child(mesh);

    SpawnedPart {
        mesh,
        material,
        joints,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn spawn_skinned(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    inverse_bindposes: &mut Assets<SkinnedMeshInverseBindposes>,
    id: EntityId,
    model: &EntityModel,
    position: Vec3,
    yaw: f32,
) -> SpawnedVisual {
    let root = spawn_root(commands, id, position, yaw);
    let parts = model
        .parts()
        .iter()
        .enumerate()
        .map(|(idx, part)| {
            spawn_part(
                commands,
                meshes,
                materials,
                inverse_bindposes,
                id,
                root,
                idx,
                part,
            )
        })
        .collect();
    SpawnedVisual { root, parts }
}

/// A flat-colored box standing on the entity position.
pub fn spawn_placeholder(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    id: EntityId,
    placeholder: &PlaceholderBox,
    position: Vec3,
    yaw: f32,
) -> SpawnedVisual {
    let root = spawn_root(commands, id, position, yaw);
    let PlaceholderBox { width, height } = *placeholder;
    let body = commands
        .spawn((
            Name::new("PlaceholderBox"),
            Mesh3d(meshes.add(Cuboid::new(width, height, width))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: PLACEHOLDER_COLOR,
                perceptual_roughness: 1.0,
                ..Default::default()
            })),
            Transform::from_xyz(0.0, height * 0.5, 0.0),
            GlobalTransform::default(),
            Visibility::Visible,
            InheritedVisibility::default(),
            ViewVisibility::default(),
        ))
        .id();
    commands.entity(root).add_child(body);
    SpawnedVisual {
        root,
        parts: Vec::new(),
    }
}
