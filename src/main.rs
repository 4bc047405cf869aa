//! src/main.rs
//!
//! Entrypoint: logging, config, then `app::run()`.

use std::fs::File;
use std::sync::Mutex;

use color_eyre::eyre::WrapErr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use world_in_windows::{Config, app};

const LOG_FILE: &str = "world_in_windows.log";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // The terminal belongs to the UI, so logs go to a file.
    let log = File::create(LOG_FILE).wrap_err_with(|| format!("creating {}", LOG_FILE))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "world_in_windows=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log))
                .with_ansi(false),
        )
        .init();

    tracing::info!("Starting World in Windows");

    let config_path = Config::locate(std::env::args().nth(1));
    let config = Config::load_or_default(&config_path);
    tracing::info!("  Data:  {}", config.data_dir.display());
    tracing::info!("  Media: {}", config.media_dir.display());
    if let Err(e) = config.ensure_media_dirs() {
        tracing::warn!("Could not create media folders: {}", e);
    }

    app::run(config).wrap_err("terminal UI failed")?;
    Ok(())
}
