mod feed;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use clap::Parser;
use mv_entity::{BoneModelRegistry, TrackerConfig};
use mv_render::{EntityViewPlugin, TextureResolverConfig};
use mv_utils::{DEFAULT_TEXTURE_VERSION, feed_channel};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "mobview", about = "Live viewer for procedurally animated world entities")]
struct Args {
    /// Asset directory holding `textures/<version>/...`.
    #[arg(long)]
    assets_root: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_TEXTURE_VERSION)]
    texture_version: String,
    /// Extra JSON entity models merged over the built-ins.
    #[arg(long)]
    registry: Option<PathBuf>,
    /// JSON-lines snapshot feed; stdin when absent.
    #[arg(long, conflicts_with = "demo")]
    feed: Option<PathBuf>,
    /// Drive a handful of synthetic entities instead of reading a feed.
    #[arg(long)]
    demo: bool,
    /// Never download player skins.
    #[arg(long)]
    offline: bool,
    #[arg(long, default_value_t = 50)]
    tween_ms: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().without_time().compact().init();

    let args = Args::parse();

    let mut registry = BoneModelRegistry::builtin();
    if let Some(path) = &args.registry {
        match registry.merge_file(path) {
            Ok(accepted) => info!("merged {accepted} entity models from {}", path.display()),
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let textures_root = args
        .assets_root
        .as_ref()
        .map(|root| root.join("textures"))
        .unwrap_or_else(mv_utils::textures_root);
    let texture_config = TextureResolverConfig {
        textures_root,
        texture_version: args.texture_version.clone(),
        allow_remote_skins: !args.offline,
    };
    let tracker_config = TrackerConfig {
        tween_duration: Duration::from_millis(args.tween_ms),
        ..TrackerConfig::default()
    };

    let (feed_tx, feed_rx) = feed_channel();
    if args.demo {
        feed::spawn_demo_feed(feed_tx);
    } else if let Err(err) = feed::spawn_feed_reader(args.feed.clone(), feed_tx) {
        error!("failed to open snapshot feed: {err}");
        return ExitCode::FAILURE;
    }

    info!(
        "starting mobview with {} entity models, textures {}",
        registry.len(),
        texture_config.texture_version
    );

    let exit = App::new()
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_plugins(EguiPlugin::default())
        .add_plugins(EntityViewPlugin::new(
            registry,
            tracker_config,
            texture_config,
            feed_rx,
        ))
        .run();

    match exit {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}
