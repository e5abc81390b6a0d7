use std::collections::HashMap;

use bevy::prelude::{Mat4, Quat, Vec3};

use crate::error::MalformedModelError;
use crate::geometry::{euler_from_degrees, euler_quat};
use crate::registry::BoneModel;

/// A posable bone. Rotations are XYZ Euler angles in radians so pose layers
/// can override or add to a single axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    /// Rotation point in model pixels, absolute in model space.
    pub pivot: Vec3,
    /// Captured at construction; the reset baseline for every pose evaluation.
    pub bind_rotation: Vec3,
    pub rotation: Vec3,
    /// Animated translation on top of the bind position.
    pub offset: Vec3,
}

impl Bone {
    pub fn local_rotation(&self) -> Quat {
        euler_quat(self.rotation)
    }
}

/// Bones in declaration order. Parent links are indices resolved after every
/// bone has been allocated, so declaration order does not matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: HashMap<String, usize>,
}

impl Skeleton {
    pub fn from_bones(defs: &[BoneModel]) -> Result<Self, MalformedModelError> {
        if defs.is_empty() {
            return Err(MalformedModelError::EmptyModel);
        }

        let mut by_name = HashMap::with_capacity(defs.len());
        let mut bones = Vec::with_capacity(defs.len());
        for (idx, def) in defs.iter().enumerate() {
            if by_name.insert(def.name.clone(), idx).is_some() {
                return Err(MalformedModelError::DuplicateBone {
                    bone: def.name.clone(),
                });
            }
            let bind_rotation = def
                .bind_pose_rotation
                .or(def.rotation)
                .map(euler_from_degrees)
                .unwrap_or(Vec3::ZERO);
            bones.push(Bone {
                name: def.name.clone(),
                parent: None,
                pivot: Vec3::from_array(def.pivot),
                bind_rotation,
                rotation: bind_rotation,
                offset: Vec3::ZERO,
            });
        }

        for (idx, def) in defs.iter().enumerate() {
            let Some(parent_name) = def.parent.as_deref() else {
                continue;
            };
            let Some(&parent) = by_name.get(parent_name) else {
                return Err(MalformedModelError::UnknownParent {
                    bone: def.name.clone(),
                    parent: parent_name.to_string(),
                });
            };
            bones[idx].parent = Some(parent);
        }

        let skeleton = Self { bones, by_name };
        skeleton.check_acyclic()?;
        Ok(skeleton)
    }

    fn check_acyclic(&self) -> Result<(), MalformedModelError> {
        for (idx, bone) in self.bones.iter().enumerate() {
            let mut current = bone.parent;
            let mut steps = 0;
            while let Some(ancestor) = current {
                if ancestor == idx || steps > self.bones.len() {
                    return Err(MalformedModelError::Cycle {
                        bone: bone.name.clone(),
                    });
                }
                current = self.bones[ancestor].parent;
                steps += 1;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.index_of(name).map(|idx| &self.bones[idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.index_of(name).map(|idx| &mut self.bones[idx])
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, bone)| bone.parent.is_none())
            .map(|(idx, _)| idx)
    }

    pub fn children(&self, parent: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, bone)| bone.parent == Some(parent))
            .map(|(idx, _)| idx)
    }

    pub fn reset_to_bind(&mut self) {
        for bone in &mut self.bones {
            bone.rotation = bone.bind_rotation;
            bone.offset = Vec3::ZERO;
        }
    }

    /// Translation relative to the parent bone (or the model root).
    pub fn local_translation(&self, idx: usize) -> Vec3 {
        let bone = &self.bones[idx];
        let parent_pivot = bone
            .parent
            .map(|p| self.bones[p].pivot)
            .unwrap_or(Vec3::ZERO);
        bone.pivot - parent_pivot + bone.offset
    }

    pub fn local_rotation(&self, idx: usize) -> Quat {
        self.bones[idx].local_rotation()
    }

    /// Bone-to-model transform in the current pose.
    pub fn model_transform(&self, idx: usize) -> Mat4 {
        self.chain_transform(idx, |skeleton, i| {
            Mat4::from_rotation_translation(skeleton.local_rotation(i), skeleton.local_translation(i))
        })
    }

    /// Inverse of each bone's model transform in the bind pose, in bone order.
    pub fn inverse_bindposes(&self) -> Vec<Mat4> {
        (0..self.bones.len())
            .map(|idx| {
                self.chain_transform(idx, |skeleton, i| {
                    let bone = &skeleton.bones[i];
                    let parent_pivot = bone
                        .parent
                        .map(|p| skeleton.bones[p].pivot)
                        .unwrap_or(Vec3::ZERO);
                    Mat4::from_rotation_translation(
                        euler_quat(bone.bind_rotation),
                        bone.pivot - parent_pivot,
                    )
                })
                .inverse()
            })
            .collect()
    }

    fn chain_transform(&self, idx: usize, local: impl Fn(&Self, usize) -> Mat4) -> Mat4 {
        let mut transform = local(self, idx);
        let mut current = self.bones[idx].parent;
        while let Some(parent) = current {
            transform = local(self, parent) * transform;
            current = self.bones[parent].parent;
        }
        transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BoneModelRegistry;
    use crate::{bone, cube};

    fn names(skeleton: &Skeleton, ids: impl Iterator<Item = usize>) -> Vec<String> {
        ids.map(|i| skeleton.bones()[i].name.clone()).collect()
    }

    #[test]
    fn parent_links_reproduce_declared_forest() {
        let registry = BoneModelRegistry::builtin();
        for entity_type in registry.entity_types() {
            let definition = registry.get(entity_type).unwrap();
            for geometry in definition.geometry.values() {
                let skeleton = Skeleton::from_bones(&geometry.bones).unwrap();
                for (idx, def) in geometry.bones.iter().enumerate() {
                    let parent_name = skeleton.bones()[idx]
                        .parent
                        .map(|p| skeleton.bones()[p].name.as_str());
                    assert_eq!(parent_name, def.parent.as_deref(), "{entity_type}/{}", def.name);
                }
                let roots: Vec<_> = geometry
                    .bones
                    .iter()
                    .filter(|b| b.parent.is_none())
                    .map(|b| b.name.clone())
                    .collect();
                assert_eq!(names(&skeleton, skeleton.roots()), roots);
            }
        }
    }

    #[test]
    fn forward_references_resolve() {
        let bones = vec![
            bone! { name: "hand", parent: "arm", pivot: (0, 2, 0), cubes: [] },
            bone! { name: "arm", pivot: (0, 10, 0), cubes: [] },
        ];
        let skeleton = Skeleton::from_bones(&bones).unwrap();
        assert_eq!(skeleton.bones()[0].parent, Some(1));
        assert_eq!(names(&skeleton, skeleton.children(1)), vec!["hand"]);
        assert_eq!(skeleton.local_translation(0), Vec3::new(0.0, -8.0, 0.0));
    }

    #[test]
    fn rejects_malformed_hierarchies() {
        assert_eq!(Skeleton::from_bones(&[]), Err(MalformedModelError::EmptyModel));

        let unknown = vec![bone! { name: "a", parent: "ghost", pivot: (0, 0, 0), cubes: [] }];
        assert_eq!(
            Skeleton::from_bones(&unknown),
            Err(MalformedModelError::UnknownParent {
                bone: "a".to_string(),
                parent: "ghost".to_string()
            })
        );

        let duplicate = vec![
            bone! { name: "a", pivot: (0, 0, 0), cubes: [] },
            bone! { name: "a", pivot: (0, 0, 0), cubes: [] },
        ];
        assert!(matches!(
            Skeleton::from_bones(&duplicate),
            Err(MalformedModelError::DuplicateBone { .. })
        ));

        let cycle = vec![
            bone! { name: "a", parent: "c", pivot: (0, 0, 0), cubes: [] },
            bone! { name: "b", parent: "a", pivot: (0, 0, 0), cubes: [] },
            bone! { name: "c", parent: "b", pivot: (0, 0, 0), cubes: [] },
        ];
        assert!(matches!(
            Skeleton::from_bones(&cycle),
            Err(MalformedModelError::Cycle { .. })
        ));

        let own_parent = vec![bone! { name: "a", parent: "a", pivot: (0, 0, 0), cubes: [] }];
        assert!(matches!(
            Skeleton::from_bones(&own_parent),
            Err(MalformedModelError::Cycle { .. })
        ));
    }

    #[test]
    fn bind_pose_rotation_wins_over_rotation() {
        let bones = vec![
            bone! { name: "a", pivot: (0, 0, 0), rotation: (10, 0, 0), bind_pose_rotation: (0, 20, 0), cubes: [] },
            bone! { name: "b", pivot: (0, 0, 0), rotation: (10, 0, 0), cubes: [] },
            bone! { name: "c", pivot: (0, 0, 0), cubes: [] },
        ];
        let skeleton = Skeleton::from_bones(&bones).unwrap();
        assert_eq!(skeleton.bones()[0].bind_rotation, Vec3::new(0.0, -20f32.to_radians(), 0.0));
        assert_eq!(skeleton.bones()[1].bind_rotation, Vec3::new(-10f32.to_radians(), 0.0, 0.0));
        assert_eq!(skeleton.bones()[2].bind_rotation, Vec3::ZERO);
    }

    #[test]
    fn bind_pose_model_transforms_cancel_inverse_bindposes() {
        let bones = vec![
            bone! { name: "body", pivot: (0, 24, 0), rotation: (15, 0, 0), cubes: [] },
            bone! { name: "arm", parent: "body", pivot: (-5, 22, 0), bind_pose_rotation: (-90, 0, 0), cubes: [
                cube! { origin: (-8, 12, -2), size: (4, 12, 4), uv: (40, 16) },
            ] },
        ];
        let mut skeleton = Skeleton::from_bones(&bones).unwrap();
        let inverse = skeleton.inverse_bindposes();
        for (idx, inv) in inverse.iter().enumerate() {
            let product = skeleton.model_transform(idx) * *inv;
            assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        }

        // Posing moves the bone away from its bind transform; resetting restores it.
        skeleton.get_mut("arm").unwrap().rotation.x += 0.5;
        skeleton.get_mut("body").unwrap().offset.y = 2.0;
        assert!(!(skeleton.model_transform(1) * inverse[1]).abs_diff_eq(Mat4::IDENTITY, 1e-5));
        skeleton.reset_to_bind();
        assert!((skeleton.model_transform(1) * inverse[1]).abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
