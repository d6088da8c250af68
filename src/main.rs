//! VGA Flappy Controller
//!
//! Reads the keyboard, steps the game at a fixed rate and publishes the
//! register file to the VGA peripheral until quit or SIGINT.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vga_flappy::{
    VERSION,
    config::{AppConfig, CONFIG_ENV},
    core::rng::derive_run_seed,
    game::tick::GameEngine,
    hw::{channel::open_channel, keyboard::{HidrawKeyboard, WatchKeys}},
    runtime::TickLoop,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("VGA Flappy v{}", VERSION);

    let config = load_config()?;
    let runtime = &config.runtime;
    info!(
        "Tick rate: {} Hz, {} obstacles, {:?} integration, {:?} scoring",
        runtime.tick_rate_hz,
        config.game.obstacle_count,
        config.game.integration,
        config.game.scoring
    );

    let seed = match runtime.seed {
        Some(seed) => seed,
        None => {
            let now = chrono::Utc::now();
            let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp());
            derive_run_seed(nanos, runtime.input_device.to_string_lossy().as_bytes())
        }
    };
    info!("RNG seed: {}", hex::encode(seed.to_be_bytes()));

    // Both devices must be present before the loop starts
    let channel = open_channel(&runtime.channel).context("register channel unavailable")?;
    let keyboard = HidrawKeyboard::open(&runtime.input_device)
        .with_context(|| format!("keyboard unavailable at {}", runtime.input_device.display()))?;

    let (tx, keys) = WatchKeys::channel();
    keyboard
        .spawn_reader(tx)
        .context("failed to spawn keyboard reader")?;

    let engine = GameEngine::new(config.game.clone(), seed);
    let mut tick_loop = TickLoop::new(engine, keys, channel, runtime);

    let summary = tick_loop
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    if let (Some(path), Some(recording)) = (&runtime.recording_path, tick_loop.recording()) {
        let bytes = recording
            .to_bytes()
            .context("failed to encode input recording")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write recording to {}", path.display()))?;
        info!(
            "Saved {} input changes over {} ticks to {}",
            recording.delta_count(),
            summary.ticks,
            path.display()
        );
    }

    Ok(())
}

/// Config from the first argument, else `VGA_FLAPPY_CONFIG`, else defaults.
fn load_config() -> Result<AppConfig> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let config = match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            AppConfig::load(&path)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => {
            let config = AppConfig::default();
            config.validate().context("invalid default configuration")?;
            config
        }
    };
    Ok(config)
}
