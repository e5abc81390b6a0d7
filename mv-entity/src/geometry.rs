use bevy::prelude::{EulerRot, Quat, Vec3};

use crate::error::MalformedModelError;
use crate::registry::{BoneModel, Cube, GeometryModel};
use crate::skeleton::{Bone, Skeleton};

/// Model pixels to world blocks.
pub const MODEL_SCALE: f32 = 1.0 / 16.0;

pub const FACES_PER_CUBE: usize = 6;
pub const VERTICES_PER_FACE: usize = 4;
pub const INDICES_PER_FACE: usize = 6;

/// One face of a box: its outward normal, the four corners as 0/1 selectors on
/// (x, y, z), and which corners take the second UV edge on each axis.
///
/// UV edges are expressed as weights on (w, h, d): the face's atlas rectangle
/// spans `uv + dot(u0, size)` to `uv + dot(u1, size)`, which packs the six faces
/// into the usual cross layout starting at the cube's atlas offset.
struct Face {
    dir: [f32; 3],
    u0: [f32; 3],
    v0: [f32; 3],
    u1: [f32; 3],
    v1: [f32; 3],
    /// (x, y, z, second u edge, second v edge)
    corners: [[u8; 5]; 4],
}

const FACES: [Face; FACES_PER_CUBE] = [
    // up
    Face {
        dir: [0.0, 1.0, 0.0],
        u0: [0.0, 0.0, 1.0],
        v0: [0.0, 0.0, 0.0],
        u1: [1.0, 0.0, 1.0],
        v1: [0.0, 0.0, 1.0],
        corners: [[0, 1, 1, 0, 0], [1, 1, 1, 1, 0], [0, 1, 0, 0, 1], [1, 1, 0, 1, 1]],
    },
    // down
    Face {
        dir: [0.0, -1.0, 0.0],
        u0: [1.0, 0.0, 1.0],
        v0: [0.0, 0.0, 0.0],
        u1: [2.0, 0.0, 1.0],
        v1: [0.0, 0.0, 1.0],
        corners: [[1, 0, 1, 0, 0], [0, 0, 1, 1, 0], [1, 0, 0, 0, 1], [0, 0, 0, 1, 1]],
    },
    // east
    Face {
        dir: [1.0, 0.0, 0.0],
        u0: [0.0, 0.0, 0.0],
        v0: [0.0, 0.0, 1.0],
        u1: [0.0, 0.0, 1.0],
        v1: [0.0, 1.0, 1.0],
        corners: [[1, 1, 1, 0, 0], [1, 0, 1, 0, 1], [1, 1, 0, 1, 0], [1, 0, 0, 1, 1]],
    },
    // west
    Face {
        dir: [-1.0, 0.0, 0.0],
        u0: [1.0, 0.0, 1.0],
        v0: [0.0, 0.0, 1.0],
        u1: [1.0, 0.0, 2.0],
        v1: [0.0, 1.0, 1.0],
        corners: [[0, 1, 0, 0, 0], [0, 0, 0, 0, 1], [0, 1, 1, 1, 0], [0, 0, 1, 1, 1]],
    },
    // north
    Face {
        dir: [0.0, 0.0, -1.0],
        u0: [0.0, 0.0, 1.0],
        v0: [0.0, 0.0, 1.0],
        u1: [1.0, 0.0, 1.0],
        v1: [0.0, 1.0, 1.0],
        corners: [[1, 0, 0, 0, 1], [0, 0, 0, 1, 1], [1, 1, 0, 0, 0], [0, 1, 0, 1, 0]],
    },
    // south
    Face {
        dir: [0.0, 0.0, 1.0],
        u0: [1.0, 0.0, 2.0],
        v0: [0.0, 0.0, 1.0],
        u1: [2.0, 0.0, 2.0],
        v1: [0.0, 1.0, 1.0],
        corners: [[0, 0, 1, 0, 1], [1, 0, 1, 1, 1], [0, 1, 1, 0, 0], [1, 1, 1, 1, 0]],
    },
];

/// Flat vertex streams for one skinned mesh. Every vertex is bound to exactly
/// one bone with full weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub joint_indices: Vec<[u16; 4]>,
    pub joint_weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl GeometryBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Model-file degrees to radians. Model files use the opposite rotation sense.
pub fn euler_from_degrees(degrees: [f32; 3]) -> Vec3 {
    Vec3::new(
        -degrees[0].to_radians(),
        -degrees[1].to_radians(),
        -degrees[2].to_radians(),
    )
}

pub fn euler_quat(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z)
}

/// Checks a geometry tree without emitting buffers.
pub fn validate_geometry(model: &GeometryModel) -> Result<(), MalformedModelError> {
    validate_atlas(model.texture_width, model.texture_height)?;
    Skeleton::from_bones(&model.bones)?;
    for bone in &model.bones {
        validate_cubes(bone)?;
    }
    Ok(())
}

/// Builds the vertex streams and skeleton for one bone tree. Vertices are
/// emitted in model pixels; callers scale by [`MODEL_SCALE`].
pub fn build_geometry(
    bones: &[BoneModel],
    atlas_width: u32,
    atlas_height: u32,
) -> Result<(GeometryBuffers, Skeleton), MalformedModelError> {
    validate_atlas(atlas_width, atlas_height)?;
    let skeleton = Skeleton::from_bones(bones)?;
    let atlas = [atlas_width as f32, atlas_height as f32];

    let cube_count: usize = bones.iter().map(|b| b.cubes.len()).sum();
    let vertex_count = cube_count * FACES_PER_CUBE * VERTICES_PER_FACE;
    let mut buffers = GeometryBuffers {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        joint_indices: Vec::with_capacity(vertex_count),
        joint_weights: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity(cube_count * FACES_PER_CUBE * INDICES_PER_FACE),
    };

    for (joint, (def, bone)) in bones.iter().zip(skeleton.bones()).enumerate() {
        validate_cubes(def)?;
        for cube in &def.cubes {
            add_cube(&mut buffers, joint as u16, bone, cube, atlas);
        }
    }

    Ok((buffers, skeleton))
}

fn validate_atlas(width: u32, height: u32) -> Result<(), MalformedModelError> {
    if width == 0 || height == 0 {
        return Err(MalformedModelError::InvalidAtlas { width, height });
    }
    Ok(())
}

fn validate_cubes(bone: &BoneModel) -> Result<(), MalformedModelError> {
    for (index, cube) in bone.cubes.iter().enumerate() {
        let finite = cube
            .origin
            .iter()
            .chain(&cube.size)
            .chain(&cube.uv)
            .all(|v| v.is_finite())
            && cube.inflate.is_finite();
        if !finite || cube.size.iter().any(|&s| s < 0.0) {
            return Err(MalformedModelError::InvalidCube {
                bone: bone.name.clone(),
                index,
            });
        }
    }
    Ok(())
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn add_cube(buffers: &mut GeometryBuffers, joint: u16, bone: &Bone, cube: &Cube, atlas: [f32; 2]) {
    let origin = Vec3::from_array(cube.origin);
    let cube_rotation = cube
        .rotation
        .map(|r| euler_quat(euler_from_degrees(r)))
        .unwrap_or(Quat::IDENTITY);
    let cube_pivot = cube.pivot.map(Vec3::from_array).unwrap_or(origin);
    let bone_rotation = euler_quat(bone.bind_rotation);

    for face in &FACES {
        let base = buffers.positions.len() as u32;
        let normal = bone_rotation * (cube_rotation * Vec3::from_array(face.dir));

        for corner in &face.corners {
            let u_edge = if corner[3] == 1 { face.u1 } else { face.u0 };
            let v_edge = if corner[4] == 1 { face.v1 } else { face.v0 };
            let u = (cube.uv[0] + dot(u_edge, cube.size)) / atlas[0];
            let v = (cube.uv[1] + dot(v_edge, cube.size)) / atlas[1];

            let extent = |axis: usize| {
                if corner[axis] == 1 {
                    cube.size[axis] + cube.inflate
                } else {
                    -cube.inflate
                }
            };
            let local = origin + Vec3::new(extent(0), extent(1), extent(2));
            // Cube rotation nests inside the bone rotation.
            let in_cube = cube_pivot + cube_rotation * (local - cube_pivot);
            let position = bone.pivot + bone_rotation * (in_cube - bone.pivot);

            buffers.positions.push(position.to_array());
            buffers.normals.push(normal.to_array());
            buffers.uvs.push([u, v]);
            buffers.joint_indices.push([joint, 0, 0, 0]);
            buffers.joint_weights.push([1.0, 0.0, 0.0, 0.0]);
        }

        buffers
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }
}
