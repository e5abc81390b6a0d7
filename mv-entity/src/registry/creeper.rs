use super::{EntityDefinition, GeometryModel, single_part};
use crate::{bone, cube};

pub fn creeper() -> EntityDefinition {
    let geometry = GeometryModel {
        texture_width: 64,
        texture_height: 32,
        bones: vec![
            bone! {
                name: "body",
                pivot: (0, 6, 0),
                cubes: [
                    cube! { origin: (-4, 6, -2), size: (8, 12, 4), uv: (16, 16) },
                ],
            },
            bone! {
                name: "head",
                parent: "body",
                pivot: (0, 18, 0),
                cubes: [
                    cube! { origin: (-4, 18, -4), size: (8, 8, 8), uv: (0, 0) },
                ],
            },
            bone! {
                name: "leg0",
                pivot: (-2, 6, 4),
                cubes: [
                    cube! { origin: (-4, 0, 2), size: (4, 6, 4), uv: (0, 16) },
                ],
            },
            bone! {
                name: "leg1",
                pivot: (2, 6, 4),
                cubes: [
                    cube! { origin: (0, 0, 2), size: (4, 6, 4), uv: (0, 16) },
                ],
            },
            bone! {
                name: "leg2",
                pivot: (-2, 6, -4),
                cubes: [
                    cube! { origin: (-4, 0, -6), size: (4, 6, 4), uv: (0, 16) },
                ],
            },
            bone! {
                name: "leg3",
                pivot: (2, 6, -4),
                cubes: [
                    cube! { origin: (0, 0, -6), size: (4, 6, 4), uv: (0, 16) },
                ],
            },
        ],
    };
    single_part(geometry, "textures/entity/creeper/creeper")
}
