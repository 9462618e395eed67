mod app;
mod banner;

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use deepmine_core::config::{self, AppConfig};
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    tracing::info!(save = %config.save_path.display(), seed = ?config.seed, "Starting DeepMine");

    let mut app = app::DeepMineApp::new(config);
    let farewell = app.run()?;
    println!("{farewell}");
    Ok(())
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join("deepmine.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // the terminal belongs to the UI, so logs only go to the file
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
