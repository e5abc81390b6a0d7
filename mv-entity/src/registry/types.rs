use std::collections::BTreeMap;

use serde::Deserialize;

fn default_atlas_size() -> u32 {
    64
}

/// One UV-mapped box attached to a bone. Coordinates are model pixels with +Y up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cube {
    /// Lower corner (x, y, z), absolute in model space.
    pub origin: [f32; 3],
    /// Dimensions (w, h, d).
    pub size: [f32; 3],
    /// Atlas offset in pixels; faces are packed into a 2(d+w) x (d+h) cross from here.
    pub uv: [f32; 2],
    /// Degrees, applied about `pivot` (or `origin` when no pivot is given).
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    #[serde(default)]
    pub pivot: Option<[f32; 3]>,
    /// Grows the box outwards on every side, in model pixels.
    #[serde(default)]
    pub inflate: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoneModel {
    pub name: String,
    /// Rotation point, absolute in model space.
    #[serde(default)]
    pub pivot: [f32; 3],
    #[serde(default)]
    pub parent: Option<String>,
    /// Degrees.
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    /// Degrees. Takes precedence over `rotation` when both are present.
    #[serde(default)]
    pub bind_pose_rotation: Option<[f32; 3]>,
    #[serde(default)]
    pub cubes: Vec<Cube>,
}

/// A named bone tree plus the size of the atlas its UVs address.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeometryModel {
    #[serde(rename = "texturewidth", default = "default_atlas_size")]
    pub texture_width: u32,
    #[serde(rename = "textureheight", default = "default_atlas_size")]
    pub texture_height: u32,
    pub bones: Vec<BoneModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityDefinition {
    pub geometry: BTreeMap<String, GeometryModel>,
    /// Part name -> atlas path stem, e.g. `textures/entity/pig/pig`.
    #[serde(default)]
    pub textures: BTreeMap<String, String>,
}

impl EntityDefinition {
    /// Geometry parts that have a texture. Parts without one are not rendered.
    pub fn textured_parts(&self) -> impl Iterator<Item = (&str, &GeometryModel, &str)> {
        self.geometry.iter().filter_map(|(name, geometry)| {
            self.textures
                .get(name)
                .map(|texture| (name.as_str(), geometry, texture.as_str()))
        })
    }
}
