//! Log output setup.
//!
//! The terminal belongs to the TUI, so events go to `fintrack.log` in the
//! data directory. Filter comes from `FINTRACK_LOG`, then `RUST_LOG`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FINTRACK_LOG";
const DEFAULT_FILTER: &str = "fintrack=info";

pub(crate) fn init(data_dir: &Path) -> Result<()> {
    let path = data_dir.join("fintrack.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    tracing::debug!(path = %path.display(), "logging initialised");
    Ok(())
}
