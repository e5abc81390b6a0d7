//! Procedural entity models: declarative bone/cube definitions turned into
//! skinned geometry, posed every tick from observed entity motion.

pub mod animation;
pub mod error;
pub mod geometry;
pub mod kinematics;
pub mod model;
pub mod registry;
pub mod skeleton;
pub mod tracker;
pub mod tween;

pub use animation::{AnimationState, MotionInput, apply_pose};
pub use error::{MalformedModelError, ModelError, RegistryError};
pub use geometry::{GeometryBuffers, MODEL_SCALE, build_geometry};
pub use kinematics::{KinematicEstimate, MotionFlags};
pub use model::{EntityModel, EntityVisual, ModelPart, PlaceholderBox};
pub use registry::{BoneModel, BoneModelRegistry, Cube, EntityDefinition, GeometryModel};
pub use skeleton::{Bone, Skeleton};
pub use tracker::{EntityTracker, TrackedEntity, TrackerChange, TrackerConfig};
pub use tween::{Tween, TweenedTransform, shortest_angle_delta};
