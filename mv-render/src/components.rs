use bevy::prelude::*;
use mv_utils::EntityId;

#[derive(Component)]
pub struct ViewerCamera;

/// Top-level node of one tracked entity; carries its world position and yaw.
#[derive(Component, Debug, Clone, Copy)]
pub struct EntityRoot(pub EntityId);

/// One skeleton bone of a tracked entity, addressed by part and bone index.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneJoint {
    pub entity: EntityId,
    pub part: usize,
    pub bone: usize,
}
