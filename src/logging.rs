//! File-backed tracing setup.
//!
//! The TUI owns stdout, so logs go to a file under the config
//! directory. Level via the `WORKMUX_LOG` env filter, default `info`.

use std::fs::{self, OpenOptions};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub fn init() -> Result<()> {
    let dir = dirs::config_dir()
        .context("Could not find config directory")?
        .join("workmux");
    fs::create_dir_all(&dir).context("Failed to create config directory")?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("workmux.log"))
        .context("Failed to open log file")?;

    let filter = EnvFilter::try_from_env("WORKMUX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
