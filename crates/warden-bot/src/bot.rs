//! Core bot lifecycle: framework setup, gateway client and shutdown.

use crate::demo::{self, StatusPlugin};
use crate::error::BotResult;
use crate::handler::Handler;
use crate::platform::{self, Gateway};
use serenity::all::{ClientBuilder, GatewayIntents};
use std::sync::Arc;
use tracing::{error, info};
use warden_config::Config;
use warden_framework::{Framework, FrameworkOptions};

/// Main bot structure.
#[derive(Debug)]
pub struct WardenBot {
    config: Arc<Config>,
    framework: Framework,
    gateway: Arc<Gateway>,
}

impl WardenBot {
    /// Creates a new bot instance with the built-in module tree.
    pub fn new(config: Config) -> BotResult<Self> {
        let gateway = Arc::new(Gateway::new());
        let options = FrameworkOptions::from_config(&config)?;
        let framework = Framework::builder(platform::platform(&gateway))
            .options(options)
            .loader(demo::loader())
            .plugin(StatusPlugin)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            framework,
            gateway,
        })
    }

    /// The framework driving this bot.
    #[must_use]
    pub const fn framework(&self) -> &Framework {
        &self.framework
    }

    /// Gateway intents the bot connects with.
    #[must_use]
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// Loads units, connects and runs until the gateway closes.
    pub async fn start(&self) -> BotResult<()> {
        self.framework.preparing().await?;

        let handler = Handler::new(self.framework.clone(), Arc::clone(&self.gateway));
        let mut client = ClientBuilder::new(&self.config.discord.token, Self::intents())
            .event_handler(handler)
            .await?;

        let shard_manager = Arc::clone(&client.shard_manager);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Shutdown signal received");
            shard_manager.shutdown_all().await;
        });

        let outcome = client.start().await;
        self.framework.destroy().await?;
        outcome?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_include_message_content() {
        let intents = WardenBot::intents();
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
    }
}
