//! Shared framework context handed to every handler, guard and listener.

use crate::error::HandlerError;
use crate::events::{Event, EventEmitter};
use crate::input::{InteractionMeta, Message};
use crate::managers::{ActionManager, CommandManager, ListenerManager, PluginManager};
use crate::sync::CommandRegistry;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::RwLock;
use regex::Regex;
use serenity::model::id::{ChannelId, GuildId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use warden_common::WardenError;
use warden_config::{Config, FrameworkConfig};
use warden_i18n::FailMessages;

/// What the framework needs to know about a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel id.
    pub id: ChannelId,
    /// Guild the channel belongs to, `None` for direct messages.
    pub guild_id: Option<GuildId>,
    /// Whether the channel is age restricted.
    pub nsfw: bool,
}

/// Read access to platform state used by the built-in guards.
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Owners of the bot application.
    async fn application_owners(&self) -> Result<Vec<UserId>, HandlerError>;

    /// Owner of a guild.
    async fn guild_owner(&self, guild_id: GuildId) -> Result<Option<UserId>, HandlerError>;

    /// A channel by id.
    async fn channel(&self, channel_id: ChannelId) -> Result<Option<ChannelInfo>, HandlerError>;

    /// Effective permissions of `user_id` in a guild channel.
    async fn member_permissions(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Option<Permissions>, HandlerError>;

    /// The managed role of the bot in a guild.
    async fn bot_role(&self, guild_id: GuildId) -> Result<Option<RoleId>, HandlerError>;
}

/// Write access used to answer invocations.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Whether the interaction was already replied to or deferred.
    fn is_acknowledged(&self, meta: &InteractionMeta) -> bool;

    /// Sends the initial reply to an interaction.
    async fn reply(&self, meta: &InteractionMeta, content: &str, ephemeral: bool) -> Result<(), HandlerError>;

    /// Edits the original reply of an acknowledged interaction.
    async fn edit_reply(&self, meta: &InteractionMeta, content: &str) -> Result<(), HandlerError>;

    /// Replies to a text message.
    async fn reply_message(&self, message: &Message, content: &str) -> Result<(), HandlerError>;
}

/// The platform collaborators the framework talks through.
#[derive(Clone)]
pub struct Platform {
    /// Read access to platform state.
    pub lookup: Arc<dyn Lookup>,
    /// Reply channel.
    pub responder: Arc<dyn Responder>,
    /// Remote command registry.
    pub registry: Arc<dyn CommandRegistry>,
}

/// Hook returning per-message prefixes. `None` falls back to the configured defaults.
pub type FetchPrefix = Arc<dyn Fn(Context, Message) -> BoxFuture<'static, Option<Vec<String>>> + Send + Sync>;

/// Runtime options derived from configuration.
#[derive(Clone)]
pub struct FrameworkOptions {
    /// Dispatch settings.
    pub config: FrameworkConfig,
    /// Compiled regex prefix.
    pub regex_prefix: Option<Regex>,
    /// Per-message prefix hook.
    pub fetch_prefix: Option<FetchPrefix>,
    /// Guild scopes commands are registered in. Empty means global.
    pub guild_ids: Vec<GuildId>,
    /// Users passing the owner-only guard in addition to the application owners.
    pub owner_ids: Vec<UserId>,
    /// Failure messages for commands.
    pub command_fail_messages: FailMessages,
    /// Failure messages for actions.
    pub action_fail_messages: FailMessages,
}

impl fmt::Debug for FrameworkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkOptions")
            .field("config", &self.config)
            .field("regex_prefix", &self.regex_prefix)
            .field("fetch_prefix", &self.fetch_prefix.is_some())
            .field("guild_ids", &self.guild_ids)
            .field("owner_ids", &self.owner_ids)
            .finish_non_exhaustive()
    }
}

impl FrameworkOptions {
    /// Options from a framework section with built-in failure messages.
    pub fn new(config: FrameworkConfig) -> Result<Self, WardenError> {
        let regex_prefix = config
            .compiled_regex_prefix()
            .map_err(|e| WardenError::config_with_source("Invalid regex prefix", e))?;

        Ok(Self {
            config,
            regex_prefix,
            fetch_prefix: None,
            guild_ids: Vec::new(),
            owner_ids: Vec::new(),
            command_fail_messages: FailMessages::commands()?,
            action_fail_messages: FailMessages::actions()?,
        })
    }

    /// Options from a validated configuration file.
    pub fn from_config(config: &Config) -> Result<Self, WardenError> {
        let mut options = Self::new(config.framework.clone())?;
        options.guild_ids = config.discord.guild_ids().into_iter().map(GuildId::new).collect();
        options.owner_ids = config.discord.owner_ids().into_iter().map(UserId::new).collect();
        Ok(options)
    }

    /// Installs a per-message prefix hook.
    #[must_use]
    pub fn with_fetch_prefix<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Option<Vec<String>>> + Send + 'static,
    {
        self.fetch_prefix = Some(Arc::new(move |ctx: Context, message: Message| -> BoxFuture<'static, Option<Vec<String>>> {
            Box::pin(hook(ctx, message))
        }));
        self
    }
}

/// Options shared between the context and the managers.
pub type SharedOptions = Arc<ArcSwap<FrameworkOptions>>;

struct ContextInner {
    options: SharedOptions,
    platform: Platform,
    events: EventEmitter,
    commands: CommandManager,
    actions: ActionManager,
    listeners: ListenerManager,
    plugins: PluginManager,
    bot_user: AtomicU64,
    ready: AtomicBool,
    ready_at: RwLock<Option<DateTime<Utc>>>,
}

/// Cheaply cloneable handle to framework state.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("ready", &self.is_ready())
            .field("bot_user", &self.bot_user())
            .finish_non_exhaustive()
    }
}

impl Context {
    pub(crate) fn new(
        options: SharedOptions,
        platform: Platform,
        commands: CommandManager,
        actions: ActionManager,
        listeners: ListenerManager,
        plugins: PluginManager,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                options,
                platform,
                events: EventEmitter::new(),
                commands,
                actions,
                listeners,
                plugins,
                bot_user: AtomicU64::new(0),
                ready: AtomicBool::new(false),
                ready_at: RwLock::new(None),
            }),
        }
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> Arc<FrameworkOptions> {
        self.inner.options.load_full()
    }

    /// Swaps the options, for example after a configuration reload.
    pub fn update_options(&self, options: FrameworkOptions) {
        self.inner.options.store(Arc::new(options));
    }

    /// Platform read access.
    #[must_use]
    pub fn lookup(&self) -> &dyn Lookup {
        self.inner.platform.lookup.as_ref()
    }

    /// Platform reply channel.
    #[must_use]
    pub fn responder(&self) -> &dyn Responder {
        self.inner.platform.responder.as_ref()
    }

    /// Remote command registry.
    #[must_use]
    pub fn registry(&self) -> &dyn CommandRegistry {
        self.inner.platform.registry.as_ref()
    }

    /// Event listener registry.
    #[must_use]
    pub fn events(&self) -> &EventEmitter {
        &self.inner.events
    }

    /// Loaded commands.
    #[must_use]
    pub fn commands(&self) -> &CommandManager {
        &self.inner.commands
    }

    /// Loaded actions.
    #[must_use]
    pub fn actions(&self) -> &ActionManager {
        &self.inner.actions
    }

    /// Loaded listeners.
    #[must_use]
    pub fn listeners(&self) -> &ListenerManager {
        &self.inner.listeners
    }

    /// Registered plugins.
    #[must_use]
    pub fn plugins(&self) -> &PluginManager {
        &self.inner.plugins
    }

    /// Emits `event` to every matching listener and waits for them.
    pub fn emit(&self, event: Event) -> BoxFuture<'static, ()> {
        let ctx = self.clone();
        Box::pin(async move { ctx.inner.events.dispatch(&ctx, event).await })
    }

    /// Id of the logged in bot user.
    #[must_use]
    pub fn bot_user(&self) -> Option<UserId> {
        match self.inner.bot_user.load(Ordering::Acquire) {
            0 => None,
            id => Some(UserId::new(id)),
        }
    }

    /// Whether the client finished logging in.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// When the client last became ready.
    #[must_use]
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.ready_at.read()
    }

    pub(crate) fn mark_ready(&self, bot_user: UserId) {
        self.inner.bot_user.store(bot_user.get(), Ordering::Release);
        *self.inner.ready_at.write() = Some(Utc::now());
        self.inner.ready.store(true, Ordering::Release);
    }

    pub(crate) fn mark_destroyed(&self) {
        self.inner.ready.store(false, Ordering::Release);
    }

    /// Whether `user_id` is a configured owner.
    #[must_use]
    pub fn is_configured_owner(&self, user_id: UserId) -> bool {
        self.options().owner_ids.contains(&user_id)
    }
}
