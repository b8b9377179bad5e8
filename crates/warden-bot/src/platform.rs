//! Serenity-backed implementations of the framework platform seams.

use crate::error::BotError;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use dashmap::DashMap;
use serenity::all::{
    Cache, Channel, ChannelId, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    EditInteractionResponse, GuildId, Http, InteractionId, Permissions, RoleId, UserId,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, trace};
use warden_framework::{
    ChannelInfo, CommandData, CommandRegistry, HandlerError, InteractionMeta, Lookup, Message, Platform, Responder,
    Scope,
};

/// Interaction tokens stay valid for fifteen minutes.
const TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// HTTP client and cache handed over by the gateway once it is ready.
#[derive(Default)]
pub struct Gateway {
    http: ArcSwapOption<Http>,
    cache: ArcSwapOption<Cache>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// A gateway with no connection yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the client handles.
    pub fn connect(&self, http: Arc<Http>, cache: Arc<Cache>) {
        self.http.store(Some(http));
        self.cache.store(Some(cache));
    }

    /// Whether [`Gateway::connect`] was called.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.http.load().is_some()
    }

    fn http(&self) -> Result<Arc<Http>, HandlerError> {
        self.http.load_full().ok_or_else(|| BotError::NotConnected.into())
    }

    fn cache(&self) -> Result<Arc<Cache>, HandlerError> {
        self.cache.load_full().ok_or_else(|| BotError::NotConnected.into())
    }
}

/// Builds the framework platform on top of `gateway`.
#[must_use]
pub fn platform(gateway: &Arc<Gateway>) -> Platform {
    Platform {
        lookup: Arc::new(SerenityLookup::new(Arc::clone(gateway))),
        responder: Arc::new(SerenityResponder::new(Arc::clone(gateway))),
        registry: Arc::new(SerenityRegistry::new(Arc::clone(gateway))),
    }
}

/// Application command storage through the HTTP API.
#[derive(Debug)]
pub struct SerenityRegistry {
    gateway: Arc<Gateway>,
}

impl SerenityRegistry {
    /// A registry using `gateway`.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl CommandRegistry for SerenityRegistry {
    async fn fetch(&self, scope: Scope) -> Result<Vec<CommandData>, HandlerError> {
        let http = self.gateway.http()?;
        let remote = match scope {
            Scope::Global => http.get_global_commands_with_localizations().await?,
            Scope::Guild(guild_id) => http.get_guild_commands_with_localizations(guild_id).await?,
        };
        trace!(%scope, count = remote.len(), "Fetched registered commands");

        let value = serde_json::to_value(&remote)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn bulk_replace(&self, scope: Scope, commands: &[CommandData]) -> Result<(), HandlerError> {
        let http = self.gateway.http()?;
        let commands = commands.to_vec();
        match scope {
            Scope::Global => http.create_global_commands(&commands).await?,
            Scope::Guild(guild_id) => http.create_guild_commands(guild_id, &commands).await?,
        };
        debug!(%scope, count = commands.len(), "Replaced registered commands");
        Ok(())
    }

    async fn cached_guilds(&self) -> Result<Vec<GuildId>, HandlerError> {
        Ok(self.gateway.cache()?.guilds())
    }
}

/// Platform state from the cache, falling back to HTTP.
#[derive(Debug)]
pub struct SerenityLookup {
    gateway: Arc<Gateway>,
    owners: OnceCell<Vec<UserId>>,
}

impl SerenityLookup {
    /// A lookup using `gateway`.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            owners: OnceCell::const_new(),
        }
    }

    fn cached_permissions(
        cache: &Cache,
        guild_id: GuildId,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Option<Permissions> {
        let guild = cache.guild(guild_id)?;
        let channel = guild.channels.get(&channel_id)?;
        let member = guild.members.get(&user_id)?;
        Some(guild.user_permissions_in(channel, member))
    }
}

#[async_trait]
impl Lookup for SerenityLookup {
    async fn application_owners(&self) -> Result<Vec<UserId>, HandlerError> {
        let owners = self
            .owners
            .get_or_try_init(|| async {
                let info = self.gateway.http()?.get_current_application_info().await?;
                let mut owners: Vec<UserId> = info.owner.iter().map(|owner| owner.id).collect();
                if let Some(team) = &info.team {
                    owners.extend(team.members.iter().map(|member| member.user.id));
                }
                owners.sort_unstable();
                owners.dedup();
                Ok::<_, HandlerError>(owners)
            })
            .await?;
        Ok(owners.clone())
    }

    async fn guild_owner(&self, guild_id: GuildId) -> Result<Option<UserId>, HandlerError> {
        if let Some(owner) = self.gateway.cache()?.guild(guild_id).map(|guild| guild.owner_id) {
            return Ok(Some(owner));
        }
        let guild = self.gateway.http()?.get_guild(guild_id).await?;
        Ok(Some(guild.owner_id))
    }

    async fn channel(&self, channel_id: ChannelId) -> Result<Option<ChannelInfo>, HandlerError> {
        if let Some(channel) = self.gateway.cache()?.channel(channel_id) {
            return Ok(Some(ChannelInfo {
                id: channel.id,
                guild_id: Some(channel.guild_id),
                nsfw: channel.nsfw,
            }));
        }

        let info = match self.gateway.http()?.get_channel(channel_id).await? {
            Channel::Guild(channel) => Some(ChannelInfo {
                id: channel.id,
                guild_id: Some(channel.guild_id),
                nsfw: channel.nsfw,
            }),
            Channel::Private(channel) => Some(ChannelInfo {
                id: channel.id,
                guild_id: None,
                nsfw: false,
            }),
            _ => None,
        };
        Ok(info)
    }

    async fn member_permissions(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Option<Permissions>, HandlerError> {
        let cache = self.gateway.cache()?;
        if let Some(permissions) = Self::cached_permissions(&cache, guild_id, channel_id, user_id) {
            return Ok(Some(permissions));
        }

        let http = self.gateway.http()?;
        let guild = http.get_guild(guild_id).await?;
        let member = http.get_member(guild_id, user_id).await?;
        let Channel::Guild(channel) = http.get_channel(channel_id).await? else {
            return Ok(None);
        };
        Ok(Some(guild.user_permissions_in(&channel, &member)))
    }

    async fn bot_role(&self, guild_id: GuildId) -> Result<Option<RoleId>, HandlerError> {
        let cache = self.gateway.cache()?;
        let bot_id = cache.current_user().id;
        let is_bot_role = |tags: &serenity::all::RoleTags| tags.bot_id == Some(bot_id);

        if let Some(role) = cache.guild(guild_id).and_then(|guild| {
            guild
                .roles
                .values()
                .find(|role| is_bot_role(&role.tags))
                .map(|role| role.id)
        }) {
            return Ok(Some(role));
        }

        let roles = self.gateway.http()?.get_guild_roles(guild_id).await?;
        Ok(roles.into_iter().find(|role| is_bot_role(&role.tags)).map(|role| role.id))
    }
}

/// Replies through the interaction and channel endpoints.
#[derive(Debug)]
pub struct SerenityResponder {
    gateway: Arc<Gateway>,
    acknowledged: DashMap<InteractionId, Instant>,
}

impl SerenityResponder {
    /// A responder using `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            acknowledged: DashMap::new(),
        }
    }

    fn acknowledge(&self, id: InteractionId) {
        self.acknowledged
            .retain(|_, replied_at| replied_at.elapsed() < TOKEN_LIFETIME);
        self.acknowledged.insert(id, Instant::now());
    }
}

#[async_trait]
impl Responder for SerenityResponder {
    fn is_acknowledged(&self, meta: &InteractionMeta) -> bool {
        self.acknowledged.contains_key(&meta.id)
    }

    async fn reply(&self, meta: &InteractionMeta, content: &str, ephemeral: bool) -> Result<(), HandlerError> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(ephemeral),
        );
        self.gateway
            .http()?
            .create_interaction_response(meta.id, &meta.token, &response, Vec::new())
            .await?;
        self.acknowledge(meta.id);
        Ok(())
    }

    async fn edit_reply(&self, meta: &InteractionMeta, content: &str) -> Result<(), HandlerError> {
        let edit = EditInteractionResponse::new().content(content);
        self.gateway
            .http()?
            .edit_original_interaction_response(&meta.token, &edit, Vec::new())
            .await?;
        Ok(())
    }

    async fn reply_message(&self, message: &Message, content: &str) -> Result<(), HandlerError> {
        let http = self.gateway.http()?;
        let reply = CreateMessage::new()
            .content(content)
            .reference_message((message.channel_id, message.id));
        message.channel_id.send_message(&http, reply).await?;
        Ok(())
    }
}
