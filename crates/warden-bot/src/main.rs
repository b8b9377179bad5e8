//! Main entry point for Warden Bot.

use anyhow::Context;
use tracing::{error, info};
use warden_bot::WardenBot;
use warden_config::ConfigLoader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;
    warden_common::init_logging(config.logging.clone()).map_err(|e| anyhow::anyhow!(e))?;

    info!("Starting Warden Bot v{}", env!("CARGO_PKG_VERSION"));

    let bot = WardenBot::new(config)?;
    if let Err(e) = bot.start().await {
        error!("Bot stopped with an error: {}", e);
        return Err(e.into());
    }

    info!("Warden Bot stopped");
    Ok(())
}
