//! Replies rendering precondition failures for the invoking user.

use crate::context::Context;
use crate::error::HandlerResult;
use crate::events::{CommandSource, Event, EventKind};
use crate::input::InteractionMeta;
use crate::listener::Listener;
use async_trait::async_trait;
use tracing::debug;
use warden_i18n::TemplateContext;

async fn reply_to_interaction(ctx: &Context, meta: &InteractionMeta, content: &str) -> HandlerResult {
    let responder = ctx.responder();
    if responder.is_acknowledged(meta) {
        responder.edit_reply(meta, content).await
    } else {
        responder.reply(meta, content, true).await
    }
}

/// Answers command guard failures with the command failure table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandPreconditionFailListener;

#[async_trait]
impl Listener for CommandPreconditionFailListener {
    fn name(&self) -> &str {
        "command_precondition_fail"
    }

    fn event(&self) -> EventKind {
        EventKind::CommandPreconditionFail
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        let Event::CommandPreconditionFail(payload, failure) = event else {
            return Ok(());
        };

        let options = ctx.options();
        let rendered = options.command_fail_messages.render(&TemplateContext {
            unit: payload.command.name(),
            identifier: &failure.identifier,
            parameters: &failure.parameters,
            locale: payload.from.locale(),
        })?;
        let Some(content) = rendered else {
            debug!(identifier = %failure.identifier, "Failure message disabled");
            return Ok(());
        };

        match &payload.from {
            CommandSource::Prefix(message) => ctx.responder().reply_message(message, &content).await,
            CommandSource::Slash(input) => reply_to_interaction(&ctx, &input.meta, &content).await,
            CommandSource::MessageMenu(menu) | CommandSource::UserMenu(menu) => {
                reply_to_interaction(&ctx, &menu.meta, &content).await
            }
        }
    }
}

/// Answers action guard failures with the action failure table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionPreconditionFailListener;

#[async_trait]
impl Listener for ActionPreconditionFailListener {
    fn name(&self) -> &str {
        "action_precondition_fail"
    }

    fn event(&self) -> EventKind {
        EventKind::ActionPreconditionFail
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        let Event::ActionPreconditionFail(payload, failure) = event else {
            return Ok(());
        };

        let options = ctx.options();
        let rendered = options.action_fail_messages.render(&TemplateContext {
            unit: payload.action.id(),
            identifier: &failure.identifier,
            parameters: &failure.parameters,
            locale: payload.from.meta.locale.as_deref(),
        })?;
        let Some(content) = rendered else {
            debug!(identifier = %failure.identifier, "Failure message disabled");
            return Ok(());
        };

        reply_to_interaction(&ctx, &payload.from.meta, &content).await
    }
}
