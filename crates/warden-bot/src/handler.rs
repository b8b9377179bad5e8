//! Gateway event handler forwarding into the framework.

use crate::convert;
use crate::platform::Gateway;
use serenity::all::{Context as GatewayContext, EventHandler, Interaction, Message, Ready};
use serenity::async_trait;
use std::sync::Arc;
use tracing::{error, info, trace};
use warden_framework::{Event, Framework};

/// Forwards gateway events to the framework.
#[derive(Debug, Clone)]
pub struct Handler {
    framework: Framework,
    gateway: Arc<Gateway>,
}

impl Handler {
    /// A handler dispatching into `framework`.
    #[must_use]
    pub const fn new(framework: Framework, gateway: Arc<Gateway>) -> Self {
        Self { framework, gateway }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: GatewayContext, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Gateway ready");
        self.gateway.connect(Arc::clone(&ctx.http), Arc::clone(&ctx.cache));

        if let Err(e) = self.framework.ready(convert::ready(&ready)).await {
            error!("Failed to finish startup: {}", e);
        }
    }

    async fn interaction_create(&self, _ctx: GatewayContext, interaction: Interaction) {
        let Some(interaction) = convert::interaction(&interaction) else {
            trace!("Ignoring unsupported interaction");
            return;
        };
        self.framework.dispatch(Event::InteractionCreate(interaction)).await;
    }

    async fn message(&self, _ctx: GatewayContext, message: Message) {
        self.framework
            .dispatch(Event::MessageCreate(convert::message(&message)))
            .await;
    }
}
