use crate::context::Context;
use crate::error::HandlerResult;
use crate::events::{Event, EventKind};
use crate::listener::Listener;
use async_trait::async_trait;
use tracing::info;

/// Logs the logged in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientReadyListener;

#[async_trait]
impl Listener for ClientReadyListener {
    fn name(&self) -> &str {
        "client_ready"
    }

    fn event(&self) -> EventKind {
        EventKind::ClientReady
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        if let Event::ClientReady(ready) = event {
            info!(
                user = %ready.user.name,
                id = %ready.user.id,
                guilds = ready.guild_ids.len(),
                commands = ctx.commands().len(),
                actions = ctx.actions().len(),
                "Logged in"
            );
        }
        Ok(())
    }
}
