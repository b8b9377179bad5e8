//! Built-in guards.
//!
//! Each guard applies the same rule on every surface. Platform facts that are
//! not carried by the invocation itself come from the context's [`Lookup`].
//!
//! [`Lookup`]: crate::context::Lookup

use crate::action::Action;
use crate::command::Command;
use crate::context::Context;
use crate::input::{ChatInput, Component, ContextMenu, InteractionMeta, Message};
use crate::precondition::{Precondition, PreconditionError, PreconditionResult};
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::permissions::Permissions;
use tracing::warn;

/// Permissions assumed for everyone in a direct message channel.
pub const DM_PERMISSIONS: Permissions = Permissions::SEND_MESSAGES
    .union(Permissions::EMBED_LINKS)
    .union(Permissions::ATTACH_FILES)
    .union(Permissions::READ_MESSAGE_HISTORY)
    .union(Permissions::MENTION_EVERYONE)
    .union(Permissions::USE_EXTERNAL_EMOJIS)
    .union(Permissions::USE_EXTERNAL_STICKERS)
    .union(Permissions::ADD_REACTIONS);

/// Failure identifiers raised by the built-in guards. Both failure tables must render them.
pub const FAIL_IDENTIFIERS: [&str; 9] = [
    "BotOwnerOnly",
    "ClientPermissions",
    "CouldNotDetermineClientPermissions",
    "CouldNotDetermineUserPermissions",
    "DMOnly",
    "GuildOnly",
    "GuildOwnerOnly",
    "NSFWOnly",
    "UserPermissions",
];

/// Who invoked a unit and where.
#[derive(Debug, Clone, Copy)]
struct Invoker {
    user: UserId,
    guild_id: Option<GuildId>,
    channel_id: Option<ChannelId>,
    member_permissions: Option<Permissions>,
    app_permissions: Option<Permissions>,
}

impl Invoker {
    const fn from_message(message: &Message) -> Self {
        Self {
            user: message.author.id,
            guild_id: message.guild_id,
            channel_id: Some(message.channel_id),
            member_permissions: None,
            app_permissions: None,
        }
    }

    const fn from_meta(meta: &InteractionMeta) -> Self {
        Self {
            user: meta.user.id,
            guild_id: meta.guild_id,
            channel_id: meta.channel_id,
            member_permissions: meta.member_permissions,
            app_permissions: meta.app_permissions,
        }
    }
}

macro_rules! on_every_surface {
    ($guard:ty) => {
        #[async_trait]
        impl Precondition for $guard {
            fn name(&self) -> &str {
                self.label()
            }

            async fn prefix_run(&self, ctx: &Context, message: &Message, _command: &Command) -> PreconditionResult {
                self.check(ctx, Invoker::from_message(message)).await
            }

            async fn slash_run(&self, ctx: &Context, input: &ChatInput, _command: &Command) -> PreconditionResult {
                self.check(ctx, Invoker::from_meta(&input.meta)).await
            }

            async fn context_menu_run(
                &self,
                ctx: &Context,
                menu: &ContextMenu,
                _command: &Command,
            ) -> PreconditionResult {
                self.check(ctx, Invoker::from_meta(&menu.meta)).await
            }

            async fn action_run(&self, ctx: &Context, component: &Component, _action: &Action) -> PreconditionResult {
                self.check(ctx, Invoker::from_meta(&component.meta)).await
            }
        }
    };
}

/// Passes only inside a guild.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuildOnly;

impl GuildOnly {
    #[allow(clippy::unused_self)]
    const fn label(&self) -> &'static str {
        "GuildOnly"
    }

    #[allow(clippy::unused_async)]
    async fn check(&self, _ctx: &Context, invoker: Invoker) -> PreconditionResult {
        match invoker.guild_id {
            Some(_) => Ok(()),
            None => Err(PreconditionError::new("GuildOnly")),
        }
    }
}

on_every_surface!(GuildOnly);

/// Passes only in direct messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmOnly;

impl DmOnly {
    #[allow(clippy::unused_self)]
    const fn label(&self) -> &'static str {
        "DMOnly"
    }

    #[allow(clippy::unused_async)]
    async fn check(&self, _ctx: &Context, invoker: Invoker) -> PreconditionResult {
        match invoker.guild_id {
            None => Ok(()),
            Some(_) => Err(PreconditionError::new("DMOnly")),
        }
    }
}

on_every_surface!(DmOnly);

/// Passes for configured owners and the owners of the bot application.
#[derive(Debug, Clone, Copy, Default)]
pub struct BotOwnerOnly;

impl BotOwnerOnly {
    #[allow(clippy::unused_self)]
    const fn label(&self) -> &'static str {
        "BotOwnerOnly"
    }

    async fn check(&self, ctx: &Context, invoker: Invoker) -> PreconditionResult {
        if ctx.is_configured_owner(invoker.user) {
            return Ok(());
        }

        match ctx.lookup().application_owners().await {
            Ok(owners) if owners.contains(&invoker.user) => Ok(()),
            Ok(_) => Err(PreconditionError::new(self.label())),
            Err(err) => {
                warn!(error = %err, "Could not fetch application owners");
                Err(PreconditionError::new(self.label()))
            }
        }
    }
}

on_every_surface!(BotOwnerOnly);

/// Passes only for the owner of the current guild.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuildOwnerOnly;

impl GuildOwnerOnly {
    #[allow(clippy::unused_self)]
    const fn label(&self) -> &'static str {
        "GuildOwnerOnly"
    }

    async fn check(&self, ctx: &Context, invoker: Invoker) -> PreconditionResult {
        let Some(guild_id) = invoker.guild_id else {
            return Err(PreconditionError::new("GuildOnly"));
        };

        match ctx.lookup().guild_owner(guild_id).await {
            Ok(Some(owner)) if owner == invoker.user => Ok(()),
            Ok(Some(_)) => Err(PreconditionError::new(self.label())),
            Ok(None) => Err(PreconditionError::new("GuildOnly")),
            Err(err) => {
                warn!(guild = %guild_id, error = %err, "Could not fetch guild owner");
                Err(PreconditionError::new("GuildOnly"))
            }
        }
    }
}

on_every_surface!(GuildOwnerOnly);

/// Passes only in age restricted channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NsfwOnly;

impl NsfwOnly {
    #[allow(clippy::unused_self)]
    const fn label(&self) -> &'static str {
        "NSFWOnly"
    }

    async fn check(&self, ctx: &Context, invoker: Invoker) -> PreconditionResult {
        if let Some(channel_id) = invoker.channel_id {
            match ctx.lookup().channel(channel_id).await {
                Ok(Some(channel)) if channel.nsfw => return Ok(()),
                Ok(_) => {}
                Err(err) => warn!(channel = %channel_id, error = %err, "Could not fetch channel"),
            }
        }
        Err(PreconditionError::new(self.label()))
    }
}

on_every_surface!(NsfwOnly);

fn missing_error(identifier: &str, required: Permissions, granted: Permissions) -> PreconditionResult {
    let missing = required.difference(granted);
    if missing.is_empty() {
        return Ok(());
    }
    Err(PreconditionError::new(identifier).with("missing", missing.get_permission_names().join(", ")))
}

/// Passes when the bot holds `required` in the invoking channel.
#[derive(Debug, Clone, Copy)]
pub struct ClientPermissions {
    required: Permissions,
}

impl ClientPermissions {
    /// Requires `required`.
    #[must_use]
    pub const fn new(required: Permissions) -> Self {
        Self { required }
    }

    #[allow(clippy::unused_self)]
    const fn label(&self) -> &'static str {
        "ClientPermissions"
    }

    async fn check(&self, ctx: &Context, invoker: Invoker) -> PreconditionResult {
        let granted = match (invoker.guild_id, invoker.channel_id) {
            (None, _) | (_, None) => Some(DM_PERMISSIONS),
            (Some(_), Some(_)) if invoker.app_permissions.is_some() => invoker.app_permissions,
            (Some(guild_id), Some(channel_id)) => match ctx.bot_user() {
                Some(bot) => resolve_permissions(ctx, guild_id, channel_id, bot).await,
                None => None,
            },
        };

        match granted {
            Some(granted) => missing_error(self.label(), self.required, granted),
            None => Err(PreconditionError::new("CouldNotDetermineClientPermissions")),
        }
    }
}

on_every_surface!(ClientPermissions);

/// Passes when the invoking user holds `required` in the invoking channel.
#[derive(Debug, Clone, Copy)]
pub struct UserPermissions {
    required: Permissions,
}

impl UserPermissions {
    /// Requires `required`.
    #[must_use]
    pub const fn new(required: Permissions) -> Self {
        Self { required }
    }

    #[allow(clippy::unused_self)]
    const fn label(&self) -> &'static str {
        "UserPermissions"
    }

    async fn check(&self, ctx: &Context, invoker: Invoker) -> PreconditionResult {
        let granted = match (invoker.guild_id, invoker.channel_id) {
            (None, _) | (_, None) => Some(DM_PERMISSIONS),
            (Some(_), Some(_)) if invoker.member_permissions.is_some() => invoker.member_permissions,
            (Some(guild_id), Some(channel_id)) => resolve_permissions(ctx, guild_id, channel_id, invoker.user).await,
        };

        match granted {
            Some(granted) => missing_error(self.label(), self.required, granted),
            None => Err(PreconditionError::new("CouldNotDetermineUserPermissions")),
        }
    }
}

on_every_surface!(UserPermissions);

async fn resolve_permissions(ctx: &Context, guild_id: GuildId, channel_id: ChannelId, user: UserId) -> Option<Permissions> {
    match ctx.lookup().member_permissions(guild_id, channel_id, user).await {
        Ok(permissions) => permissions,
        Err(err) => {
            warn!(guild = %guild_id, channel = %channel_id, user = %user, error = %err, "Could not resolve permissions");
            None
        }
    }
}
