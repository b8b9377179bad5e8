//! Conversion of gateway payloads into framework input snapshots.

use serenity::all::{
    ActionRowComponent, CommandDataOption, CommandDataOptionValue, CommandInteraction, CommandType,
    ComponentInteraction, ComponentInteractionDataKind, Interaction as GatewayInteraction,
    Message as GatewayMessage, ModalInteraction, Ready, User as GatewayUser,
};
use warden_framework::{
    ChatInput, Component, ComponentKind, ContextMenu, InputOption, Interaction, InteractionMeta, MenuTarget, Message,
    OptionValue, ReadyInfo, User,
};

/// Shared fields of command, component and modal interactions.
macro_rules! meta_of {
    ($interaction:expr) => {{
        let interaction = $interaction;
        let base = InteractionMeta::new(interaction.id, interaction.token.clone(), user(&interaction.user));
        let mut meta = match interaction.guild_id {
            Some(guild_id) => base.in_guild(guild_id, interaction.channel_id),
            None => base.in_dm(interaction.channel_id),
        };
        meta.locale = Some(interaction.locale.clone()).filter(|locale| !locale.is_empty());
        meta.member_permissions = interaction.member.as_ref().and_then(|member| member.permissions);
        meta.app_permissions = interaction.app_permissions;
        meta
    }};
}

/// A gateway user.
#[must_use]
pub fn user(user: &GatewayUser) -> User {
    User {
        id: user.id,
        name: user.name.clone(),
        bot: user.bot,
    }
}

/// A gateway message.
#[must_use]
pub fn message(message: &GatewayMessage) -> Message {
    let mut converted = Message::new(message.id, message.channel_id, user(&message.author), message.content.clone());
    converted.guild_id = message.guild_id;
    converted.system = message.author.system;
    converted.webhook_id = message.webhook_id.map(|id| id.get());
    converted
}

/// The ready payload.
#[must_use]
pub fn ready(ready: &Ready) -> ReadyInfo {
    ReadyInfo {
        user: User {
            id: ready.user.id,
            name: ready.user.name.clone(),
            bot: ready.user.bot,
        },
        guild_ids: ready.guilds.iter().map(|guild| guild.id).collect(),
    }
}

/// An interaction the framework dispatches. Pings and unknown kinds yield `None`.
#[must_use]
pub fn interaction(interaction: &GatewayInteraction) -> Option<Interaction> {
    match interaction {
        GatewayInteraction::Command(command) => command_interaction(command),
        GatewayInteraction::Autocomplete(command) => Some(Interaction::Autocomplete(chat_input(command))),
        GatewayInteraction::Component(component) => Some(Interaction::Component(component_interaction(component))),
        GatewayInteraction::Modal(modal) => Some(Interaction::Component(modal_interaction(modal))),
        _ => None,
    }
}

fn options(options: &[CommandDataOption]) -> Vec<InputOption> {
    options.iter().filter_map(option).collect()
}

fn option(option: &CommandDataOption) -> Option<InputOption> {
    let value = match &option.value {
        CommandDataOptionValue::String(value) => OptionValue::String(value.clone()),
        CommandDataOptionValue::Integer(value) => OptionValue::Integer(*value),
        CommandDataOptionValue::Number(value) => OptionValue::Number(*value),
        CommandDataOptionValue::Boolean(value) => OptionValue::Boolean(*value),
        CommandDataOptionValue::User(id) => OptionValue::User(*id),
        CommandDataOptionValue::Channel(id) => OptionValue::Channel(*id),
        CommandDataOptionValue::Role(id) => OptionValue::Role(*id),
        CommandDataOptionValue::Mentionable(id) => OptionValue::Mentionable(id.get()),
        CommandDataOptionValue::Attachment(id) => OptionValue::Attachment(id.get()),
        CommandDataOptionValue::SubCommand(children) => OptionValue::SubCommand(options(children)),
        CommandDataOptionValue::SubCommandGroup(children) => OptionValue::SubCommandGroup(options(children)),
        CommandDataOptionValue::Autocomplete { value, .. } => {
            return Some(InputOption::new(option.name.clone(), OptionValue::String(value.clone())).focused());
        }
        _ => return None,
    };
    Some(InputOption::new(option.name.clone(), value))
}

fn chat_input(command: &CommandInteraction) -> ChatInput {
    ChatInput::new(meta_of!(command), command.data.name.clone(), options(&command.data.options))
}

fn command_interaction(command: &CommandInteraction) -> Option<Interaction> {
    let target = match command.data.kind {
        CommandType::ChatInput => return Some(Interaction::ChatInput(chat_input(command))),
        CommandType::User => {
            let id = command.data.target_id?.to_user_id();
            MenuTarget::User(user(command.data.resolved.users.get(&id)?))
        }
        CommandType::Message => {
            let id = command.data.target_id?.to_message_id();
            let message = command.data.resolved.messages.get(&id)?;
            MenuTarget::Message {
                id,
                content: message.content.clone(),
                author: user(&message.author),
            }
        }
        _ => return None,
    };

    Some(Interaction::ContextMenu(ContextMenu {
        meta: meta_of!(command),
        command_name: command.data.name.clone(),
        target,
    }))
}

fn component_interaction(component: &ComponentInteraction) -> Component {
    let (kind, values) = match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => (ComponentKind::SelectMenu, values.clone()),
        ComponentInteractionDataKind::UserSelect { values } => {
            (ComponentKind::SelectMenu, values.iter().map(ToString::to_string).collect())
        }
        ComponentInteractionDataKind::RoleSelect { values } => {
            (ComponentKind::SelectMenu, values.iter().map(ToString::to_string).collect())
        }
        ComponentInteractionDataKind::MentionableSelect { values } => {
            (ComponentKind::SelectMenu, values.iter().map(ToString::to_string).collect())
        }
        ComponentInteractionDataKind::ChannelSelect { values } => {
            (ComponentKind::SelectMenu, values.iter().map(ToString::to_string).collect())
        }
        _ => (ComponentKind::Button, Vec::new()),
    };

    let mut converted = Component::new(meta_of!(component), kind, component.data.custom_id.clone());
    converted.values = values;
    converted.message_id = Some(component.message.id);
    converted
}

fn modal_interaction(modal: &ModalInteraction) -> Component {
    let mut converted = Component::new(meta_of!(modal), ComponentKind::ModalSubmit, modal.data.custom_id.clone());
    converted.fields = modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            ActionRowComponent::InputText(input) => {
                Some((input.custom_id.clone(), input.value.clone().unwrap_or_default()))
            }
            _ => None,
        })
        .collect();
    converted.message_id = modal.message.as_ref().map(|message| message.id);
    converted
}
