//! Built-in listeners turning platform events into unit dispatch.

mod interaction;
mod message;
mod precondition_fail;
mod ready;

pub use interaction::InteractionListener;
pub use message::{MessageCreateListener, PrefixedMessageListener, UserMessageListener};
pub use precondition_fail::{ActionPreconditionFailListener, CommandPreconditionFailListener};
pub use ready::ClientReadyListener;

use crate::context::Context;
use crate::error::DispatchError;
use crate::events::{ActionPayload, CommandPayload, Event};
use crate::listener::Listener;
use std::sync::Arc;
use tracing::warn;

/// Every built-in listener, in attachment order.
#[must_use]
pub fn builtin() -> Vec<Arc<dyn Listener>> {
    vec![
        Arc::new(ClientReadyListener),
        Arc::new(InteractionListener),
        Arc::new(MessageCreateListener),
        Arc::new(UserMessageListener),
        Arc::new(PrefixedMessageListener),
        Arc::new(CommandPreconditionFailListener),
        Arc::new(ActionPreconditionFailListener),
    ]
}

/// Emits the success or error event for a finished command dispatch.
pub(crate) async fn report_command(ctx: &Context, payload: CommandPayload, outcome: Result<(), DispatchError>) {
    match outcome {
        Ok(()) => ctx.emit(Event::CommandSuccess(payload)).await,
        Err(err) => {
            warn!(command = %payload.command.name(), error = %err, "Command failed");
            ctx.emit(Event::CommandError(payload, Arc::new(err))).await;
        }
    }
}

/// Emits the success or error event for a finished action dispatch.
pub(crate) async fn report_action(ctx: &Context, payload: ActionPayload, outcome: Result<(), DispatchError>) {
    match outcome {
        Ok(()) => ctx.emit(Event::ActionSuccess(payload)).await,
        Err(err) => {
            warn!(action = %payload.action.id(), error = %err, "Action failed");
            ctx.emit(Event::ActionError(payload, Arc::new(err))).await;
        }
    }
}
