use super::{report_action, report_command};
use crate::command::CommandType;
use crate::context::Context;
use crate::error::{DispatchError, HandlerResult, UnitKind};
use crate::events::{ActionPayload, CommandPayload, CommandSource, Event, EventKind};
use crate::input::{Component, Interaction};
use crate::listener::Listener;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

/// Custom ids starting with this are never dispatched.
const IGNORED_ID_PREFIX: char = '_';

/// Routes interactions to commands and actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionListener;

fn not_found(unit: UnitKind, name: &str) -> DispatchError {
    DispatchError::NotFound {
        unit,
        name: name.to_string(),
    }
}

impl InteractionListener {
    async fn run_action(ctx: Context, component: Component) -> HandlerResult {
        let separator = ctx.options().config.action_id_separator.clone();
        let id = component.action_id(&separator).to_string();
        if id.starts_with(IGNORED_ID_PREFIX) {
            trace!(custom_id = %component.custom_id, "Ignoring reserved custom id");
            return Ok(());
        }

        let action = ctx
            .actions()
            .resolve(&id)
            .ok_or_else(|| not_found(UnitKind::Action, &id))?;

        let payload = ActionPayload::new(component.clone(), Arc::clone(&action));
        let outcome = action.handle(ctx.clone(), component).await;
        report_action(&ctx, payload, outcome).await;
        Ok(())
    }
}

#[async_trait]
impl Listener for InteractionListener {
    fn name(&self) -> &str {
        "interaction_create"
    }

    fn event(&self) -> EventKind {
        EventKind::InteractionCreate
    }

    async fn run(&self, ctx: Context, event: Event) -> HandlerResult {
        let Event::InteractionCreate(interaction) = event else {
            return Ok(());
        };

        match interaction {
            Interaction::Component(component) => Self::run_action(ctx, component).await,
            Interaction::ChatInput(input) => {
                let command = ctx
                    .commands()
                    .resolve_typed(&input.command_name, CommandType::ChatInput)
                    .ok_or_else(|| not_found(UnitKind::Command, &input.command_name))?;

                let payload = CommandPayload::new(CommandSource::Slash(input.clone()), Arc::clone(&command));
                let outcome = command.handle_slash(ctx.clone(), input).await;
                report_command(&ctx, payload, outcome).await;
                Ok(())
            }
            Interaction::ContextMenu(menu) => {
                let command = ctx
                    .commands()
                    .resolve_typed(&menu.command_name, CommandType::ContextMenu)
                    .ok_or_else(|| not_found(UnitKind::Command, &menu.command_name))?;

                let source = if menu.is_message() {
                    CommandSource::MessageMenu(menu.clone())
                } else {
                    CommandSource::UserMenu(menu.clone())
                };
                let payload = CommandPayload::new(source, Arc::clone(&command));
                let outcome = command.handle_context_menu(ctx.clone(), menu).await;
                report_command(&ctx, payload, outcome).await;
                Ok(())
            }
            Interaction::Autocomplete(input) => {
                let command = ctx
                    .commands()
                    .resolve_typed(&input.command_name, CommandType::ChatInput)
                    .ok_or_else(|| not_found(UnitKind::Command, &input.command_name))?;
                command.handle_autocomplete(ctx, input).await?;
                Ok(())
            }
        }
    }
}
