use std::sync::Mutex;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::Fixed;
use bevy_egui::EguiPrimaryContextPass;
use mv_entity::tracker::TICK_SECONDS;
use mv_entity::{BoneModelRegistry, EntityTracker, TrackerConfig};
use mv_utils::FeedReceiver;
use tracing::warn;

mod components;
pub mod entities;
pub mod mesh;
mod scene;
pub mod textures;

pub use components::{BoneJoint, EntityRoot, ViewerCamera};
pub use textures::{TextureLoadError, TextureResolver, TextureResolverConfig};

/// Tracks entities from the snapshot feed and draws them as posed skinned models.
pub struct EntityViewPlugin {
    tracker_config: TrackerConfig,
    texture_config: TextureResolverConfig,
    registry: Mutex<Option<BoneModelRegistry>>,
    feed: Mutex<Option<FeedReceiver>>,
}

impl EntityViewPlugin {
    pub fn new(
        registry: BoneModelRegistry,
        tracker_config: TrackerConfig,
        texture_config: TextureResolverConfig,
        feed: FeedReceiver,
    ) -> Self {
        Self {
            tracker_config,
            texture_config,
            registry: Mutex::new(Some(registry)),
            feed: Mutex::new(Some(feed)),
        }
    }
}

impl Plugin for EntityViewPlugin {
    fn build(&self, app: &mut App) {
        let registry = self
            .registry
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .unwrap_or_else(|| {
                warn!("entity registry already consumed; using built-in models");
                BoneModelRegistry::builtin()
            });
        match self.feed.lock().ok().and_then(|mut slot| slot.take()) {
            Some(feed) => {
                app.insert_resource(feed);
            }
            None => warn!("snapshot feed already consumed; no entities will appear"),
        }

        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f32(
                TICK_SECONDS,
            )))
            .insert_resource(EntityTracker::new(registry, self.tracker_config.clone()))
            .insert_resource(TextureResolver::new(self.texture_config.clone()))
            .init_resource::<entities::SpawnedEntities>()
            .add_systems(Startup, scene::setup_scene)
            .add_systems(FixedUpdate, entities::tick_entity_animations)
            .add_systems(
                Update,
                (
                    entities::apply_feed_messages.run_if(resource_exists::<FeedReceiver>),
                    textures::drain_texture_results,
                    entities::advance_entity_tweens,
                    entities::sync_entity_transforms,
                )
                    .chain(),
            )
            .add_systems(EguiPrimaryContextPass, entities::draw_entity_name_tags);
    }
}
