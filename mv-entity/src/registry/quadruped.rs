use super::{BoneModel, EntityDefinition, GeometryModel, single_part};
use crate::{bone, cube};

// Leg order matches the walk gait: leg0/leg3 swing together, leg1/leg2 opposite.
pub const QUADRUPED_LEGS: [&str; 4] = ["leg0", "leg1", "leg2", "leg3"];

/// Four legs of `size` hanging from pivots at `height`, front pair at `front_z`
/// and back pair at `back_z`.
fn legs(height: f32, half_x: f32, front_z: f32, back_z: f32, size: [f32; 3]) -> Vec<BoneModel> {
    let [w, h, d] = size;
    let pivots = [
        (-half_x, back_z),
        (half_x, back_z),
        (-half_x, front_z),
        (half_x, front_z),
    ];
    QUADRUPED_LEGS
        .iter()
        .zip(pivots)
        .map(|(name, (x, z))| {
            bone! {
                name: name,
                pivot: (x, height, z),
                cubes: [
                    cube! { origin: (x - w / 2.0, height - h, z - d / 2.0), size: (w, h, d), uv: (0, 16) },
                ],
            }
        })
        .collect()
}

pub fn pig() -> EntityDefinition {
    let mut bones = vec![
        bone! {
            name: "body",
            pivot: (0, 13, 2),
            rotation: (90, 0, 0),
            cubes: [
                cube! { origin: (-5, 7, -5), size: (10, 16, 8), uv: (28, 8) },
            ],
        },
        bone! {
            name: "head",
            pivot: (0, 12, -6),
            cubes: [
                cube! { origin: (-4, 8, -14), size: (8, 8, 8), uv: (0, 0) },
                cube! { origin: (-2, 9, -15), size: (4, 3, 1), uv: (16, 16) },
            ],
        },
    ];
    bones.extend(legs(6.0, 3.0, -5.0, 7.0, [4.0, 6.0, 4.0]));
    let geometry = GeometryModel {
        texture_width: 64,
        texture_height: 32,
        bones,
    };
    single_part(geometry, "textures/entity/pig/pig")
}

pub fn cow() -> EntityDefinition {
    let mut bones = vec![
        bone! {
            name: "body",
            pivot: (0, 19, 2),
            rotation: (90, 0, 0),
            cubes: [
                cube! { origin: (-6, 11, -5), size: (12, 18, 10), uv: (18, 4) },
                cube! { origin: (-2, 11, -6), size: (4, 6, 1), uv: (52, 0) },
            ],
        },
        bone! {
            name: "head",
            pivot: (0, 20, -8),
            cubes: [
                cube! { origin: (-4, 16, -14), size: (8, 8, 6), uv: (0, 0) },
                cube! { origin: (-5, 22, -12), size: (1, 3, 1), uv: (22, 0) },
                cube! { origin: (4, 22, -12), size: (1, 3, 1), uv: (22, 0) },
            ],
        },
    ];
    bones.extend(legs(12.0, 4.0, -6.0, 7.0, [4.0, 12.0, 4.0]));
    let geometry = GeometryModel {
        texture_width: 64,
        texture_height: 32,
        bones,
    };
    single_part(geometry, "textures/entity/cow/cow")
}
