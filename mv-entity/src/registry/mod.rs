//! Entity type name -> declarative model.
//!
//! Vanilla mobs are written as Rust data through the `bone!`/`cube!` macros
//! below. Extra types can be merged in from JSON files using the same shape.

mod biped;
mod creeper;
mod quadruped;
mod types;

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::Resource;
use tracing::warn;

pub use biped::{
    BIPED_BODY, BIPED_HEAD, BIPED_LEFT_ARM, BIPED_LEFT_LEG, BIPED_RIGHT_ARM, BIPED_RIGHT_LEG,
};
pub use quadruped::QUADRUPED_LEGS;
pub use types::*;

use crate::error::RegistryError;
use crate::geometry::validate_geometry;

#[macro_export]
macro_rules! cube {
    (
        origin: ($x:expr, $y:expr, $z:expr),
        size: ($w:expr, $h:expr, $d:expr),
        uv: ($u:expr, $v:expr)
        $(, inflate: $inflate:expr)?
        $(, rotation: ($rx:expr, $ry:expr, $rz:expr))?
        $(,)?
    ) => {
        $crate::registry::Cube {
            origin: [$x as f32, $y as f32, $z as f32],
            size: [$w as f32, $h as f32, $d as f32],
            uv: [$u as f32, $v as f32],
            rotation: None $(.or(Some([$rx as f32, $ry as f32, $rz as f32])))?,
            pivot: None,
            inflate: 0.0 $(+ $inflate as f32)?,
        }
    };
}

#[macro_export]
macro_rules! bone {
    (
        name: $name:expr,
        $(parent: $parent:expr,)?
        pivot: ($x:expr, $y:expr, $z:expr),
        $(rotation: ($rx:expr, $ry:expr, $rz:expr),)?
        $(bind_pose_rotation: ($bx:expr, $by:expr, $bz:expr),)?
        cubes: [ $($cube:expr),* $(,)? ] $(,)?
    ) => {
        $crate::registry::BoneModel {
            name: $name.to_string(),
            pivot: [$x as f32, $y as f32, $z as f32],
            parent: None $(.or(Some($parent.to_string())))?,
            rotation: None $(.or(Some([$rx as f32, $ry as f32, $rz as f32])))?,
            bind_pose_rotation: None $(.or(Some([$bx as f32, $by as f32, $bz as f32])))?,
            cubes: vec![$($cube),*],
        }
    };
}

/// Read-only after startup; cloned into whoever needs to build models.
#[derive(Debug, Clone, Default, Resource)]
pub struct BoneModelRegistry {
    entries: BTreeMap<String, EntityDefinition>,
}

impl BoneModelRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (name, definition) in [
            ("player", biped::player()),
            ("zombie", biped::zombie()),
            ("skeleton", biped::skeleton()),
            ("creeper", creeper::creeper()),
            ("pig", quadruped::pig()),
            ("cow", quadruped::cow()),
        ] {
            if let Err(err) = registry.insert(name, definition) {
                warn!("built-in entity model rejected: {err}");
            }
        }
        registry
    }

    /// Validates every textured geometry part before accepting the definition.
    /// Parts without a texture are never built, so they are not checked.
    pub fn insert(
        &mut self,
        entity_type: &str,
        definition: EntityDefinition,
    ) -> Result<(), RegistryError> {
        for (part, geometry, _) in definition.textured_parts() {
            validate_geometry(geometry).map_err(|source| RegistryError::Malformed {
                entity_type: entity_type.to_string(),
                part: part.to_string(),
                source,
            })?;
        }
        self.entries.insert(entity_type.to_string(), definition);
        Ok(())
    }

    /// Merges a JSON registry (`{ "<type>": { "geometry": {..}, "textures": {..} } }`)
    /// over the current entries. Entries that fail to parse or validate are
    /// skipped with a warning; a document that is not a JSON object fails as a
    /// whole. Returns how many entity types were accepted.
    pub fn merge_json(&mut self, raw: &str) -> Result<usize, RegistryError> {
        let document: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut accepted = 0;
        for (entity_type, value) in document {
            let definition = match serde_json::from_value::<EntityDefinition>(value) {
                Ok(definition) => definition,
                Err(source) => {
                    warn!(
                        "{}",
                        RegistryError::InvalidEntry {
                            entity_type,
                            source
                        }
                    );
                    continue;
                }
            };
            match self.insert(&entity_type, definition) {
                Ok(()) => accepted += 1,
                Err(err) => warn!("{err}"),
            }
        }
        Ok(accepted)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_json(&raw)
    }

    pub fn get(&self, entity_type: &str) -> Option<&EntityDefinition> {
        self.entries.get(entity_type)
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.entries.contains_key(entity_type)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wraps a single geometry tree as a one-part definition named `default`.
pub(crate) fn single_part(geometry: GeometryModel, texture: &str) -> EntityDefinition {
    EntityDefinition {
        geometry: BTreeMap::from([("default".to_string(), geometry)]),
        textures: BTreeMap::from([("default".to_string(), texture.to_string())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIG_JSON: &str = r#"{
        "piglet": {
            "geometry": {
                "default": {
                    "texturewidth": 64,
                    "textureheight": 32,
                    "bones": [
                        { "name": "body", "pivot": [0, 13, 2], "rotation": [90, 0, 0],
                          "cubes": [ { "origin": [-5, 7, -5], "size": [10, 16, 8], "uv": [28, 8] } ] },
                        { "name": "head", "parent": "body", "pivot": [0, 12, -6],
                          "cubes": [ { "origin": [-4, 8, -14], "size": [8, 8, 8], "uv": [0, 0], "inflate": 0.5 } ] }
                    ]
                },
                "saddle": { "bones": [ { "name": "saddle" } ] }
            },
            "textures": { "default": "textures/entity/pig/pig" }
        },
        "broken": {
            "geometry": { "default": { "bones": [ { "name": "a", "parent": "missing" } ] } },
            "textures": { "default": "textures/entity/broken" }
        },
        "incomplete": {
            "geometry": { "default": { "bones": [ { "name": "a", "cubes": [ { "origin": [0, 0, 0] } ] } ] } }
        }
    }"#;

    #[test]
    fn builtin_registry_has_vanilla_mobs() {
        let registry = BoneModelRegistry::builtin();
        for name in ["player", "zombie", "skeleton", "creeper", "pig", "cow"] {
            assert!(registry.contains(name), "missing {name}");
            let definition = registry.get(name).unwrap();
            assert_eq!(definition.textured_parts().count(), 1);
        }
        assert!(!registry.contains("ender_dragon"));
    }

    #[test]
    fn merge_accepts_valid_and_skips_malformed() {
        let mut registry = BoneModelRegistry::empty();
        let accepted = registry.merge_json(PIG_JSON).unwrap();
        assert_eq!(accepted, 1);
        assert!(registry.contains("piglet"));
        assert!(!registry.contains("broken"));
        assert!(!registry.contains("incomplete"));

        let piglet = registry.get("piglet").unwrap();
        let geometry = &piglet.geometry["default"];
        assert_eq!((geometry.texture_width, geometry.texture_height), (64, 32));
        assert_eq!(geometry.bones[1].parent.as_deref(), Some("body"));
        assert_eq!(geometry.bones[1].cubes[0].inflate, 0.5);
        // `saddle` has no texture entry, so it is not a rendered part.
        let parts: Vec<_> = piglet.textured_parts().map(|(name, _, _)| name).collect();
        assert_eq!(parts, vec!["default"]);
    }

    #[test]
    fn untextured_parts_are_not_validated() {
        let mut registry = BoneModelRegistry::empty();
        let raw = r#"{ "slime": {
            "geometry": {
                "default": { "bones": [ { "name": "cube", "cubes": [ { "origin": [-4, 0, -4], "size": [8, 8, 8], "uv": [0, 0] } ] } ] },
                "outer": { "bones": [ { "name": "shell", "parent": "nowhere" } ] }
            },
            "textures": { "default": "textures/entity/slime/slime" }
        } }"#;
        assert_eq!(registry.merge_json(raw).unwrap(), 1);

        let slime = registry.get("slime").unwrap();
        assert!(slime.geometry.contains_key("outer"));
        assert_eq!(slime.textured_parts().count(), 1);
    }

    #[test]
    fn merge_overrides_builtin_entries() {
        let mut registry = BoneModelRegistry::builtin();
        let raw = r#"{ "pig": { "geometry": { "default": { "bones": [ { "name": "blob" } ] } },
                                "textures": { "default": "textures/entity/blob" } } }"#;
        registry.merge_json(raw).unwrap();
        let pig = registry.get("pig").unwrap();
        assert_eq!(pig.geometry["default"].bones[0].name, "blob");
        assert_eq!(pig.geometry["default"].texture_width, 64);
    }

    #[test]
    fn merge_rejects_non_object_document() {
        let mut registry = BoneModelRegistry::empty();
        assert!(matches!(
            registry.merge_json("[1, 2, 3]"),
            Err(RegistryError::Parse(_))
        ));
    }

    #[test]
    fn cube_macro_fills_optional_fields() {
        let plain = cube! { origin: (-4, 24, -4), size: (8, 8, 8), uv: (0, 0) };
        assert_eq!(plain.inflate, 0.0);
        assert_eq!(plain.rotation, None);

        let rotated = cube! { origin: (0, 0, 0), size: (1, 2, 3), uv: (4, 5), inflate: 0.25, rotation: (0, 45, 0) };
        assert_eq!(rotated.inflate, 0.25);
        assert_eq!(rotated.rotation, Some([0.0, 45.0, 0.0]));
    }
}
