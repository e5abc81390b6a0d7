use super::{EntityDefinition, GeometryModel, single_part};
use crate::{bone, cube};

// Bone names the animation driver poses on biped models.
pub const BIPED_HEAD: &str = "head";
pub const BIPED_BODY: &str = "body";
pub const BIPED_RIGHT_ARM: &str = "rightArm";
pub const BIPED_LEFT_ARM: &str = "leftArm";
pub const BIPED_RIGHT_LEG: &str = "rightLeg";
pub const BIPED_LEFT_LEG: &str = "leftLeg";

/// Player skins use the 64x64 layout: separate left limbs plus an outer layer.
pub fn player() -> EntityDefinition {
    let geometry = GeometryModel {
        texture_width: 64,
        texture_height: 64,
        bones: vec![
            bone! {
                name: BIPED_BODY,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 12, -2), size: (8, 12, 4), uv: (16, 16) },
                ],
            },
            bone! {
                name: "jacket",
                parent: BIPED_BODY,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 12, -2), size: (8, 12, 4), uv: (16, 32), inflate: 0.25 },
                ],
            },
            bone! {
                name: BIPED_HEAD,
                parent: BIPED_BODY,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 24, -4), size: (8, 8, 8), uv: (0, 0) },
                ],
            },
            bone! {
                name: "hat",
                parent: BIPED_HEAD,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 24, -4), size: (8, 8, 8), uv: (32, 0), inflate: 0.5 },
                ],
            },
            bone! {
                name: BIPED_RIGHT_ARM,
                parent: BIPED_BODY,
                pivot: (-5, 22, 0),
                cubes: [
                    cube! { origin: (-8, 12, -2), size: (4, 12, 4), uv: (40, 16) },
                    cube! { origin: (-8, 12, -2), size: (4, 12, 4), uv: (40, 32), inflate: 0.25 },
                ],
            },
            bone! {
                name: BIPED_LEFT_ARM,
                parent: BIPED_BODY,
                pivot: (5, 22, 0),
                cubes: [
                    cube! { origin: (4, 12, -2), size: (4, 12, 4), uv: (32, 48) },
                    cube! { origin: (4, 12, -2), size: (4, 12, 4), uv: (48, 48), inflate: 0.25 },
                ],
            },
            bone! {
                name: BIPED_RIGHT_LEG,
                pivot: (-1.9, 12, 0),
                cubes: [
                    cube! { origin: (-3.9, 0, -2), size: (4, 12, 4), uv: (0, 16) },
                    cube! { origin: (-3.9, 0, -2), size: (4, 12, 4), uv: (0, 32), inflate: 0.25 },
                ],
            },
            bone! {
                name: BIPED_LEFT_LEG,
                pivot: (1.9, 12, 0),
                cubes: [
                    cube! { origin: (-0.1, 0, -2), size: (4, 12, 4), uv: (16, 48) },
                    cube! { origin: (-0.1, 0, -2), size: (4, 12, 4), uv: (0, 48), inflate: 0.25 },
                ],
            },
        ],
    };
    single_part(geometry, "textures/entity/steve")
}

pub fn zombie() -> EntityDefinition {
    let geometry = GeometryModel {
        texture_width: 64,
        texture_height: 64,
        bones: vec![
            bone! {
                name: BIPED_BODY,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 12, -2), size: (8, 12, 4), uv: (16, 16) },
                ],
            },
            bone! {
                name: BIPED_HEAD,
                parent: BIPED_BODY,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 24, -4), size: (8, 8, 8), uv: (0, 0) },
                ],
            },
            bone! {
                name: "hat",
                parent: BIPED_HEAD,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 24, -4), size: (8, 8, 8), uv: (32, 0), inflate: 0.5 },
                ],
            },
            // Zombies hold their arms straight out in front.
            bone! {
                name: BIPED_RIGHT_ARM,
                parent: BIPED_BODY,
                pivot: (-5, 22, 0),
                bind_pose_rotation: (-90, 0, 0),
                cubes: [
                    cube! { origin: (-8, 12, -2), size: (4, 12, 4), uv: (40, 16) },
                ],
            },
            bone! {
                name: BIPED_LEFT_ARM,
                parent: BIPED_BODY,
                pivot: (5, 22, 0),
                bind_pose_rotation: (-90, 0, 0),
                cubes: [
                    cube! { origin: (4, 12, -2), size: (4, 12, 4), uv: (32, 48) },
                ],
            },
            bone! {
                name: BIPED_RIGHT_LEG,
                pivot: (-1.9, 12, 0),
                cubes: [
                    cube! { origin: (-3.9, 0, -2), size: (4, 12, 4), uv: (0, 16) },
                ],
            },
            bone! {
                name: BIPED_LEFT_LEG,
                pivot: (1.9, 12, 0),
                cubes: [
                    cube! { origin: (-0.1, 0, -2), size: (4, 12, 4), uv: (16, 48) },
                ],
            },
        ],
    };
    single_part(geometry, "textures/entity/zombie/zombie")
}

pub fn skeleton() -> EntityDefinition {
    let geometry = GeometryModel {
        texture_width: 64,
        texture_height: 32,
        bones: vec![
            bone! {
                name: BIPED_BODY,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 12, -2), size: (8, 12, 4), uv: (16, 16) },
                ],
            },
            bone! {
                name: BIPED_HEAD,
                parent: BIPED_BODY,
                pivot: (0, 24, 0),
                cubes: [
                    cube! { origin: (-4, 24, -4), size: (8, 8, 8), uv: (0, 0) },
                ],
            },
            bone! {
                name: BIPED_RIGHT_ARM,
                parent: BIPED_BODY,
                pivot: (-5, 22, 0),
                cubes: [
                    cube! { origin: (-6, 12, -1), size: (2, 12, 2), uv: (40, 16) },
                ],
            },
            bone! {
                name: BIPED_LEFT_ARM,
                parent: BIPED_BODY,
                pivot: (5, 22, 0),
                cubes: [
                    cube! { origin: (4, 12, -1), size: (2, 12, 2), uv: (40, 16) },
                ],
            },
            bone! {
                name: BIPED_RIGHT_LEG,
                pivot: (-2, 12, 0),
                cubes: [
                    cube! { origin: (-3, 0, -1), size: (2, 12, 2), uv: (0, 16) },
                ],
            },
            bone! {
                name: BIPED_LEFT_LEG,
                pivot: (2, 12, 0),
                cubes: [
                    cube! { origin: (1, 0, -1), size: (2, 12, 2), uv: (0, 16) },
                ],
            },
        ],
    };
    single_part(geometry, "textures/entity/skeleton/skeleton")
}
