use std::path::{Path, PathBuf};

use bevy::{ecs::resource::Resource, prelude::Vec3};
use crossbeam::channel::{Receiver, Sender, unbounded};
use serde::Deserialize;

pub const MOBVIEW_ASSETS_ROOT_ENV: &str = "MOBVIEW_ASSETS_ROOT";

/// Texture version used for default atlases when nothing else is configured.
pub const DEFAULT_TEXTURE_VERSION: &str = "1.16.4";

pub fn mobview_assets_root() -> PathBuf {
    if let Ok(explicit) = std::env::var(MOBVIEW_ASSETS_ROOT_ENV) {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return path;
        }
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(exe_dir) = exe.parent()
    {
        let sibling_assets = exe_dir.join("assets");
        if sibling_assets.exists() {
            return sibling_assets;
        }
    }

    let repo_assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("../mv-client/assets");
    if repo_assets.exists() {
        return repo_assets;
    }

    PathBuf::from("assets")
}

pub fn textures_root() -> PathBuf {
    mobview_assets_root().join("textures")
}

pub type EntityId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SnapshotPos {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SnapshotPos {
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl From<Vec3> for SnapshotPos {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x as f64,
            y: v.y as f64,
            z: v.z as f64,
        }
    }
}

/// One observation of a world entity. Every field except `id` is optional and
/// an absent field means "unchanged since the last snapshot".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: Option<String>,
    pub username: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub pos: Option<SnapshotPos>,
    /// Radians.
    pub yaw: Option<f32>,
    pub is_sneaking: Option<bool>,
    pub is_swimming: Option<bool>,
    pub attack: Option<bool>,
    pub delete: Option<bool>,
}

impl EntitySnapshot {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_pos(mut self, pos: Vec3) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = Some(yaw);
        self
    }

    pub fn deleted(id: EntityId) -> Self {
        Self {
            id,
            delete: Some(true),
            ..Self::default()
        }
    }

    pub fn is_delete(&self) -> bool {
        self.delete.unwrap_or(false)
    }

    pub fn position(&self) -> Option<Vec3> {
        self.pos.map(SnapshotPos::to_vec3)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Snapshot(EntitySnapshot),
    /// World reset or disconnect; every tracked entity is dropped.
    Clear,
}

/// Only a line with nothing but `clear` is a control line.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlLine {
    clear: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedLine {
    Control(ControlLine),
    Snapshot(EntitySnapshot),
}

/// Parses one JSON line of the snapshot feed. Blank lines and `{"clear": false}`
/// yield `None`.
pub fn parse_feed_line(line: &str) -> Result<Option<FeedMessage>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(match serde_json::from_str::<FeedLine>(line)? {
        FeedLine::Control(ControlLine { clear: true }) => Some(FeedMessage::Clear),
        FeedLine::Control(ControlLine { clear: false }) => None,
        FeedLine::Snapshot(snapshot) => Some(FeedMessage::Snapshot(snapshot)),
    })
}

#[derive(Resource, Clone)]
pub struct FeedSender(pub Sender<FeedMessage>);

#[derive(Resource)]
pub struct FeedReceiver(pub Receiver<FeedMessage>);

pub fn feed_channel() -> (FeedSender, FeedReceiver) {
    let (tx, rx) = unbounded();
    (FeedSender(tx), FeedReceiver(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snapshot_line() {
        let msg = parse_feed_line(
            r#"{"id": 7, "name": "zombie", "pos": {"x": 1.5, "y": 64, "z": -2}, "yaw": 0.5, "isSneaking": true}"#,
        )
        .unwrap()
        .unwrap();
        let FeedMessage::Snapshot(snapshot) = msg else {
            panic!("expected snapshot, got {msg:?}");
        };
        assert_eq!(snapshot.id, 7);
        assert_eq!(snapshot.name.as_deref(), Some("zombie"));
        assert_eq!(snapshot.position(), Some(Vec3::new(1.5, 64.0, -2.0)));
        assert_eq!(snapshot.is_sneaking, Some(true));
        assert_eq!(snapshot.is_swimming, None);
        assert!(!snapshot.is_delete());
    }

    #[test]
    fn parses_delete_and_clear() {
        let msg = parse_feed_line(r#"{"id": 3, "delete": true}"#).unwrap();
        assert_eq!(msg, Some(FeedMessage::Snapshot(EntitySnapshot::deleted(3))));

        assert_eq!(
            parse_feed_line(r#"{"clear": true}"#).unwrap(),
            Some(FeedMessage::Clear)
        );
        assert_eq!(parse_feed_line(r#"{"clear": false}"#).unwrap(), None);
        assert_eq!(parse_feed_line("   ").unwrap(), None);
    }

    #[test]
    fn snapshot_with_stray_clear_key_stays_a_snapshot() {
        for line in [
            r#"{"id": 4, "name": "pig", "clear": true}"#,
            r#"{"id": 4, "name": "pig", "clear": false}"#,
        ] {
            let msg = parse_feed_line(line).unwrap();
            let Some(FeedMessage::Snapshot(snapshot)) = msg else {
                panic!("expected snapshot for {line}, got {msg:?}");
            };
            assert_eq!(snapshot.id, 4);
            assert_eq!(snapshot.name.as_deref(), Some("pig"));
        }
    }

    #[test]
    fn rejects_line_without_id() {
        assert!(parse_feed_line(r#"{"name": "pig"}"#).is_err());
        assert!(parse_feed_line("not json").is_err());
    }
}
