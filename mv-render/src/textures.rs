//! Atlas and skin loading off the frame thread.
//!
//! Requests go to a worker over a channel; decoded images come back tagged
//! with their source key and are applied to every mesh still waiting on that
//! key. Meshes despawned in the meantime are skipped.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use bevy::image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use crossbeam::channel::{Receiver, Sender, unbounded};
use thiserror::Error;
use tracing::{debug, warn};

const SKIN_SERVICES: [&str; 2] = [
    "https://mineskin.eu/skin/{username}",
    "https://starlightskins.lunareclipse.studio/render/skin/{username}/default",
];
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("failed to read texture {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {message}")]
    Http { url: String, message: String },
    #[error("failed to decode texture from {location}: {source}")]
    Decode {
        location: String,
        #[source]
        source: image::ImageError,
    },
    #[error("all {sources} texture sources failed")]
    Exhausted { sources: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureLocation {
    File(PathBuf),
    Url(String),
}

impl std::fmt::Display for TextureLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Where one texture can come from, tried in order. `key` identifies the
/// texture in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSource {
    pub key: String,
    pub locations: Vec<TextureLocation>,
}

impl TextureSource {
    pub fn atlas(path: PathBuf) -> Self {
        Self {
            key: format!("atlas:{}", path.display()),
            locations: vec![TextureLocation::File(path)],
        }
    }

    /// Remote skin services in fixed order, then the default atlas.
    pub fn skin(username: &str, fallback: PathBuf) -> Self {
        let mut locations: Vec<_> = skin_urls(username)
            .into_iter()
            .map(TextureLocation::Url)
            .collect();
        locations.push(TextureLocation::File(fallback));
        Self {
            key: format!("skin:{username}"),
            locations,
        }
    }
}

pub fn skin_urls(username: &str) -> Vec<String> {
    SKIN_SERVICES
        .iter()
        .map(|pattern| pattern.replace("{username}", username))
        .collect()
}

/// `textures/entity/pig/pig` -> `<root>/<version>/entity/pig/pig.png`.
pub fn atlas_path(textures_root: &Path, version: &str, stem: &str) -> PathBuf {
    let rest = stem.strip_prefix("textures/").unwrap_or(stem);
    textures_root.join(version).join(format!("{rest}.png"))
}

#[derive(Debug, Clone)]
pub struct TextureResolverConfig {
    pub textures_root: PathBuf,
    pub texture_version: String,
    pub allow_remote_skins: bool,
}

impl Default for TextureResolverConfig {
    fn default() -> Self {
        Self {
            textures_root: mv_utils::textures_root(),
            texture_version: mv_utils::DEFAULT_TEXTURE_VERSION.to_string(),
            allow_remote_skins: true,
        }
    }
}

#[derive(Debug)]
struct DecodedImage {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

#[derive(Debug)]
struct TextureResult {
    key: String,
    outcome: Result<DecodedImage, TextureLoadError>,
}

/// Meshes waiting on each in-flight texture key.
#[derive(Debug, Default)]
pub struct PendingTextures {
    waiting: HashMap<String, Vec<Entity>>,
}

impl PendingTextures {
    /// Returns true when `key` was not already in flight and must be requested.
    pub fn add(&mut self, key: &str, target: Entity) -> bool {
        match self.waiting.get_mut(key) {
            Some(targets) => {
                if !targets.contains(&target) {
                    targets.push(target);
                }
                false
            }
            None => {
                self.waiting.insert(key.to_string(), vec![target]);
                true
            }
        }
    }

    pub fn take(&mut self, key: &str) -> Vec<Entity> {
        self.waiting.remove(key).unwrap_or_default()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.waiting.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[derive(Resource)]
pub struct TextureResolver {
    config: TextureResolverConfig,
    request_tx: Sender<TextureSource>,
    result_rx: Receiver<TextureResult>,
    pending: PendingTextures,
    loaded: HashMap<String, Handle<Image>>,
    failed: HashSet<String>,
}

impl TextureResolver {
    pub fn new(config: TextureResolverConfig) -> Self {
        let (request_tx, request_rx) = unbounded::<TextureSource>();
        let (result_tx, result_rx) = unbounded::<TextureResult>();
        thread::spawn(move || texture_worker(request_rx, result_tx));
        Self {
            config,
            request_tx,
            result_rx,
            pending: PendingTextures::default(),
            loaded: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    /// A player skin when a username is known and remote fetches are allowed,
    /// otherwise the versioned default atlas.
    pub fn source_for(&self, texture_stem: &str, username: Option<&str>) -> TextureSource {
        let atlas = atlas_path(
            &self.config.textures_root,
            &self.config.texture_version,
            texture_stem,
        );
        match username {
            Some(username) if self.config.allow_remote_skins => {
                TextureSource::skin(username, atlas)
            }
            _ => TextureSource::atlas(atlas),
        }
    }

    /// Queues `source` for the mesh `target`. A texture that is already
    /// loaded is returned right away for the caller to apply.
    pub fn resolve(&mut self, target: Entity, source: TextureSource) -> Option<Handle<Image>> {
        if let Some(handle) = self.loaded.get(&source.key) {
            return Some(handle.clone());
        }
        if self.failed.contains(&source.key) {
            return None;
        }
        if self.pending.add(&source.key, target) && self.request_tx.send(source).is_err() {
            warn!("texture worker is gone; meshes stay untextured");
        }
        None
    }
}

pub fn apply_texture(
    materials: &mut Assets<StandardMaterial>,
    material: &Handle<StandardMaterial>,
    image: Handle<Image>,
) {
    if let Some(material) = materials.get_mut(material) {
        material.base_color = Color::WHITE;
        material.base_color_texture = Some(image);
    }
}

fn pixel_art_image(decoded: DecodedImage) -> Image {
    let mut image = Image::new_fill(
        Extent3d {
            width: decoded.width,
            height: decoded.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.data = Some(decoded.rgba);

    let mut sampler = ImageSamplerDescriptor::nearest();
    sampler.address_mode_u = ImageAddressMode::Repeat;
    sampler.address_mode_v = ImageAddressMode::Repeat;
    sampler.address_mode_w = ImageAddressMode::Repeat;
    image.sampler = ImageSampler::Descriptor(sampler);
    image
}

/// Applies finished textures to the meshes still waiting for them.
pub fn drain_texture_results(
    mut resolver: ResMut<TextureResolver>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
) {
    while let Ok(result) = resolver.result_rx.try_recv() {
        let targets = resolver.pending.take(&result.key);
        let decoded = match result.outcome {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("texture {} unavailable: {err}", result.key);
                resolver.failed.insert(result.key);
                continue;
            }
        };

        let handle = images.add(pixel_art_image(decoded));
        resolver.loaded.insert(result.key.clone(), handle.clone());
        for target in targets {
            match mesh_materials.get(target) {
                Ok(material) => apply_texture(&mut materials, &material.0, handle.clone()),
                Err(_) => debug!("discarding texture {} for removed mesh {target}", result.key),
            }
        }
    }
}

fn texture_worker(request_rx: Receiver<TextureSource>, result_tx: Sender<TextureResult>) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
    {
        Ok(client) => Some(client),
        Err(err) => {
            warn!("http client unavailable, remote skins disabled: {err}");
            None
        }
    };

    while let Ok(source) = request_rx.recv() {
        let outcome = load_first(client.as_ref(), &source.locations);
        if result_tx
            .send(TextureResult {
                key: source.key,
                outcome,
            })
            .is_err()
        {
            break;
        }
    }
}

fn load_first(
    client: Option<&reqwest::blocking::Client>,
    locations: &[TextureLocation],
) -> Result<DecodedImage, TextureLoadError> {
    for location in locations {
        match load_one(client, location) {
            Ok(decoded) => return Ok(decoded),
            Err(err) if locations.len() > 1 => warn!("{err}; trying next source"),
            Err(err) => return Err(err),
        }
    }
    Err(TextureLoadError::Exhausted {
        sources: locations.len(),
    })
}

fn load_one(
    client: Option<&reqwest::blocking::Client>,
    location: &TextureLocation,
) -> Result<DecodedImage, TextureLoadError> {
    let bytes = match location {
        TextureLocation::File(path) => {
            std::fs::read(path).map_err(|source| TextureLoadError::Io {
                path: path.clone(),
                source,
            })?
        }
        TextureLocation::Url(url) => fetch(client, url)?,
    };
    let decoded =
        image::load_from_memory(&bytes).map_err(|source| TextureLoadError::Decode {
            location: location.to_string(),
            source,
        })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

fn fetch(client: Option<&reqwest::blocking::Client>, url: &str) -> Result<Vec<u8>, TextureLoadError> {
    let http_error = |message: String| TextureLoadError::Http {
        url: url.to_string(),
        message,
    };
    let client = client.ok_or_else(|| http_error("no http client".to_string()))?;
    let response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|err| http_error(err.to_string()))?;
    let bytes = response.bytes().map_err(|err| http_error(err.to_string()))?;
    Ok(bytes.to_vec())
}
