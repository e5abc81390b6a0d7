use crate::animation::{AnimationState, MotionInput, apply_pose};
use crate::error::ModelError;
use crate::geometry::{GeometryBuffers, build_geometry};
use crate::registry::BoneModelRegistry;
use crate::skeleton::Skeleton;

/// One skinned mesh of an entity: a textured geometry group with its own skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    pub name: String,
    /// Atlas path stem, e.g. `textures/entity/zombie/zombie`.
    pub texture: String,
    pub atlas_size: [u32; 2],
    pub geometry: GeometryBuffers,
    pub skeleton: Skeleton,
}

/// All parts of one spawned entity plus the animation state that poses them.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityModel {
    entity_type: String,
    parts: Vec<ModelPart>,
    animation: AnimationState,
}

impl EntityModel {
    /// Builds every textured part declared for `entity_type`. Any malformed
    /// part rejects the whole model.
    pub fn new(registry: &BoneModelRegistry, entity_type: &str) -> Result<Self, ModelError> {
        let definition = registry
            .get(entity_type)
            .ok_or_else(|| ModelError::ModelNotFound {
                entity_type: entity_type.to_string(),
            })?;

        let mut parts = Vec::new();
        for (name, geometry, texture) in definition.textured_parts() {
            let (buffers, skeleton) = build_geometry(
                &geometry.bones,
                geometry.texture_width,
                geometry.texture_height,
            )
            .map_err(|source| ModelError::Malformed {
                entity_type: entity_type.to_string(),
                part: name.to_string(),
                source,
            })?;
            parts.push(ModelPart {
                name: name.to_string(),
                texture: texture.to_string(),
                atlas_size: [geometry.texture_width, geometry.texture_height],
                geometry: buffers,
                skeleton,
            });
        }

        Ok(Self {
            entity_type: entity_type.to_string(),
            parts,
            animation: AnimationState::default(),
        })
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn parts(&self) -> &[ModelPart] {
        &self.parts
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Advances the animation state by one tick and re-poses every part.
    pub fn update_animation(&mut self, input: &MotionInput) {
        self.animation.update(input);
        for part in &mut self.parts {
            apply_pose(&self.animation, &mut part.skeleton);
        }
    }

    pub fn attack(&mut self) {
        self.animation.attack();
    }
}

/// Stand-in for entities without a usable model. Sizes are in blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderBox {
    pub width: f32,
    pub height: f32,
}

impl Default for PlaceholderBox {
    fn default() -> Self {
        Self {
            width: 0.6,
            height: 1.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityVisual {
    Skinned(EntityModel),
    Placeholder(PlaceholderBox),
}

impl EntityVisual {
    /// Builds the model for `entity_type`, or a placeholder sized from the
    /// snapshot when there is no usable model.
    pub fn for_entity(
        registry: &BoneModelRegistry,
        entity_type: Option<&str>,
        width: Option<f32>,
        height: Option<f32>,
    ) -> Self {
        let placeholder = || {
            let default = PlaceholderBox::default();
            Self::Placeholder(PlaceholderBox {
                width: width.filter(|w| *w > 0.0).unwrap_or(default.width),
                height: height.filter(|h| *h > 0.0).unwrap_or(default.height),
            })
        };

        let Some(entity_type) = entity_type else {
            return placeholder();
        };
        match EntityModel::new(registry, entity_type) {
            Ok(model) => Self::Skinned(model),
            Err(err) => {
                tracing::warn!("{err}; drawing a placeholder box");
                placeholder()
            }
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn model(&self) -> Option<&EntityModel> {
        match self {
            Self::Skinned(model) => Some(model),
            Self::Placeholder(_) => None,
        }
    }

    pub fn update_animation(&mut self, input: &MotionInput) {
        if let Self::Skinned(model) = self {
            model.update_animation(input);
        }
    }

    pub fn attack(&mut self) {
        if let Self::Skinned(model) = self {
            model.attack();
        }
    }
}
