mod api;
mod app;
mod config;
mod controller;
mod domain;
mod infrastructure;
mod net;
mod storage;
mod terminal;
mod worker;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config.logging.level, &paths.logs_dir)?;

    let shutdown = shutdown::Shutdown::new();
    shutdown::install_signal_handlers(shutdown.clone());

    let app = app::AutouApp::initialize(config, paths, shutdown.clone()).await?;
    app.run().await
}
