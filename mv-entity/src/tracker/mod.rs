//! Live entity id -> model, kinematic estimate and rendered transform.
//!
//! Snapshots are applied as they arrive. Animation runs once per game tick
//! from whatever motion was last observed, and tweens advance every frame.

use std::collections::HashMap;
use std::time::Duration;

use bevy::prelude::{Resource, Vec3};
use mv_utils::{EntityId, EntitySnapshot};
use tracing::{debug, info};

use crate::animation::MotionInput;
use crate::kinematics::KinematicEstimate;
use crate::model::EntityVisual;
use crate::registry::BoneModelRegistry;
use crate::tween::TweenedTransform;

#[cfg(test)]
mod tests;

/// Seconds per game tick; the animation driver works in blocks per tick.
pub const TICK_SECONDS: f32 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub tween_duration: Duration,
    /// Without a position update for this long an entity is treated as standing.
    pub stale_after: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tween_duration: Duration::from_millis(50),
            stale_after: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerChange {
    Spawned(EntityId),
    Removed(EntityId),
}

#[derive(Debug, Clone)]
pub struct TrackedEntity {
    id: EntityId,
    entity_type: Option<String>,
    username: Option<String>,
    height: Option<f32>,
    visual: EntityVisual,
    estimate: KinematicEstimate,
    transform: TweenedTransform,
    last_update: Duration,
    is_sneaking: bool,
    is_swimming: bool,
}

impl TrackedEntity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Snapshot height, else the placeholder height, else a player's height.
    pub fn height(&self) -> f32 {
        match (&self.visual, self.height) {
            (_, Some(height)) if height > 0.0 => height,
            (EntityVisual::Placeholder(placeholder), _) => placeholder.height,
            _ => 1.8,
        }
    }

    pub fn visual(&self) -> &EntityVisual {
        &self.visual
    }

    pub fn estimate(&self) -> &KinematicEstimate {
        &self.estimate
    }

    /// Interpolated position in blocks.
    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn yaw(&self) -> f32 {
        self.transform.yaw()
    }

    fn motion_input(&self, now: Duration, stale_after: Duration) -> MotionInput {
        let mut input = MotionInput {
            is_sneaking: self.is_sneaking,
            is_swimming: self.is_swimming,
            ..MotionInput::default()
        };
        if now.saturating_sub(self.last_update) > stale_after {
            return input;
        }
        let flags = self.estimate.flags();
        input.velocity = self.estimate.velocity * TICK_SECONDS;
        input.is_flying = flags.is_flying;
        input.is_gliding = flags.is_gliding;
        input
    }

    fn apply_flags(&mut self, snapshot: &EntitySnapshot) {
        if let Some(username) = &snapshot.username {
            self.username = Some(username.clone());
        }
        if let Some(height) = snapshot.height {
            self.height = Some(height);
        }
        if let Some(sneaking) = snapshot.is_sneaking {
            self.is_sneaking = sneaking;
        }
        if let Some(swimming) = snapshot.is_swimming {
            self.is_swimming = swimming;
        }
        if let Some(yaw) = snapshot.yaw {
            self.transform.retarget_yaw(yaw);
        }
        if snapshot.attack == Some(true) {
            self.visual.attack();
        }
    }
}

#[derive(Resource)]
pub struct EntityTracker {
    registry: BoneModelRegistry,
    config: TrackerConfig,
    entities: HashMap<EntityId, TrackedEntity>,
}

impl EntityTracker {
    pub fn new(registry: BoneModelRegistry, config: TrackerConfig) -> Self {
        Self {
            registry,
            config,
            entities: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entities.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.values()
    }

    /// Applies one snapshot observed at `now` (time since startup). Returns the
    /// lifecycle change it caused, if any.
    pub fn apply(&mut self, snapshot: &EntitySnapshot, now: Duration) -> Option<TrackerChange> {
        let id = snapshot.id;
        if snapshot.is_delete() {
            return self.entities.remove(&id).map(|_| {
                debug!("entity {id} removed");
                TrackerChange::Removed(id)
            });
        }

        if let Some(entity) = self.entities.get_mut(&id) {
            if let Some(position) = snapshot.position() {
                let dt = now.saturating_sub(entity.last_update).as_secs_f32();
                entity.estimate.observe(position, dt);
                entity.last_update = now;
                entity.transform.retarget_position(position);
            }
            entity.apply_flags(snapshot);
            return None;
        }

        let position = snapshot.position().unwrap_or(Vec3::ZERO);
        let visual = EntityVisual::for_entity(
            &self.registry,
            snapshot.name.as_deref(),
            snapshot.width,
            snapshot.height,
        );
        let mut entity = TrackedEntity {
            id,
            entity_type: snapshot.name.clone(),
            username: None,
            height: None,
            visual,
            estimate: KinematicEstimate::new(position),
            transform: TweenedTransform::new(
                position,
                snapshot.yaw.unwrap_or(0.0),
                self.config.tween_duration,
            ),
            last_update: now,
            is_sneaking: false,
            is_swimming: false,
        };
        entity.apply_flags(snapshot);
        debug!(
            "entity {id} spawned as {}",
            entity.entity_type.as_deref().unwrap_or("<unnamed>")
        );
        self.entities.insert(id, entity);
        Some(TrackerChange::Spawned(id))
    }

    /// Drops every tracked entity and returns their ids.
    pub fn clear(&mut self) -> Vec<EntityId> {
        let ids: Vec<_> = self.entities.drain().map(|(id, _)| id).collect();
        info!("entity tracker cleared, {} entities removed", ids.len());
        ids
    }

    /// One game tick: feeds the latest observed motion into every animation.
    pub fn tick(&mut self, now: Duration) {
        let stale_after = self.config.stale_after;
        for entity in self.entities.values_mut() {
            let input = entity.motion_input(now, stale_after);
            entity.visual.update_animation(&input);
        }
    }

    /// Advances position and yaw tweens by one frame.
    pub fn advance(&mut self, dt: Duration) {
        for entity in self.entities.values_mut() {
            entity.transform.advance(dt);
        }
    }
}
