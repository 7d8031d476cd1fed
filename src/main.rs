use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use zeus_pressure::{PressureConfig, VERSION, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PressureConfig::load_from_path(config_path).context("Failed to load configuration")?;

    logging::init(&config.logging)?;
    info!("zeus-pressure {} starting", VERSION);

    web::run(config).await
}
