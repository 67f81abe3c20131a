mod analytics;
mod api;
mod config;
mod logging;
mod models;
mod report;
mod run;
mod session;
mod storage;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = run::Cli::parse();
    let dirs = project_dirs()?;

    logging::init(&dirs.data)?;

    let mut config = config::Config::load(&dirs.config)?;
    if let Some(url) = &cli.api_url {
        config.set_api_url(url);
    }
    let storage = storage::LocalStorage::open(&dirs.data.join("fintrack.db"))?;
    let backend = api::HttpBackend::new(&config)?;
    tracing::info!(api_url = backend.base_url(), "starting");
    let mut session = session::Session::new(storage, Box::new(backend))?;
    session.load_user()?;

    match cli.command {
        None => run::as_tui(&mut session, &config),
        Some(command) => run::as_cli(command, &mut session, &config),
    }
}

struct Dirs {
    data: PathBuf,
    config: PathBuf,
}

fn project_dirs() -> Result<Dirs> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "Fin-Track")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data = proj_dirs.data_dir().to_path_buf();
    let config = proj_dirs.config_dir().to_path_buf();
    for dir in [&data, &config] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(Dirs { data, config })
}
