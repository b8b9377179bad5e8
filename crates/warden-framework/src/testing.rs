//! In-memory platform doubles and input fixtures.
//!
//! Lets dispatch, guards and command sync run end to end without a gateway
//! connection. Used by the unit tests of this crate and by its integration
//! tests.

use crate::context::{ChannelInfo, Context, Lookup, Platform, Responder};
use crate::data::CommandData;
use crate::error::HandlerError;
use crate::events::{Event, EventKind, ReadyInfo};
use crate::framework::Framework;
use crate::input::{ChatInput, Component, ComponentKind, InputOption, InteractionMeta, Message, User};
use crate::listener::FnListener;
use crate::sync::{CommandRegistry, Scope};
use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId, InteractionId, MessageId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Channel used by direct message fixtures.
pub const DM_CHANNEL: u64 = 900;

/// Id of the bot user in [`ready_info`].
pub const BOT_USER: u64 = 100_000_000_000_000_999;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Command registry kept in memory, counting remote calls.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    scopes: Mutex<HashMap<Scope, Vec<CommandData>>>,
    guilds: Mutex<Vec<GuildId>>,
    fetches: AtomicUsize,
    replaced: Mutex<Vec<Scope>>,
}

impl MemoryRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the guilds reported as cached.
    #[must_use]
    pub fn with_guilds(self, guilds: impl IntoIterator<Item = GuildId>) -> Self {
        *self.guilds.lock() = guilds.into_iter().collect();
        self
    }

    /// Stores `commands` in `scope` without counting a replace.
    pub fn seed(&self, scope: Scope, commands: Vec<CommandData>) {
        self.scopes.lock().insert(scope, commands);
    }

    /// Commands currently stored in `scope`.
    #[must_use]
    pub fn commands(&self, scope: Scope) -> Vec<CommandData> {
        self.scopes.lock().get(&scope).cloned().unwrap_or_default()
    }

    /// Number of fetch calls.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of bulk replace calls.
    #[must_use]
    pub fn replace_count(&self) -> usize {
        self.replaced.lock().len()
    }

    /// Scopes written to, in call order.
    #[must_use]
    pub fn replaced_scopes(&self) -> Vec<Scope> {
        self.replaced.lock().clone()
    }
}

#[async_trait]
impl CommandRegistry for MemoryRegistry {
    async fn fetch(&self, scope: Scope) -> Result<Vec<CommandData>, HandlerError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.commands(scope))
    }

    async fn bulk_replace(&self, scope: Scope, commands: &[CommandData]) -> Result<(), HandlerError> {
        self.replaced.lock().push(scope);
        self.scopes.lock().insert(scope, commands.to_vec());
        Ok(())
    }

    async fn cached_guilds(&self) -> Result<Vec<GuildId>, HandlerError> {
        Ok(self.guilds.lock().clone())
    }
}

/// Where a recorded reply went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTarget {
    /// An interaction reply.
    Interaction(InteractionId),
    /// A reply to a text message.
    Message(MessageId),
}

/// One reply sent through [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply target.
    pub target: ReplyTarget,
    /// Text content.
    pub content: String,
    /// Whether only the invoker can see it.
    pub ephemeral: bool,
    /// Whether it edited an earlier reply.
    pub edited: bool,
}

/// Responder recording every reply.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    replies: Mutex<Vec<Reply>>,
    acknowledged: Mutex<HashSet<InteractionId>>,
}

impl RecordingResponder {
    /// A responder with no replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an interaction as deferred.
    pub fn acknowledge(&self, id: InteractionId) {
        self.acknowledged.lock().insert(id);
    }

    /// Replies sent so far.
    #[must_use]
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().clone()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    fn is_acknowledged(&self, meta: &InteractionMeta) -> bool {
        self.acknowledged.lock().contains(&meta.id)
    }

    async fn reply(&self, meta: &InteractionMeta, content: &str, ephemeral: bool) -> Result<(), HandlerError> {
        if !self.acknowledged.lock().insert(meta.id) {
            return Err(format!("interaction {} already acknowledged", meta.id).into());
        }
        self.replies.lock().push(Reply {
            target: ReplyTarget::Interaction(meta.id),
            content: content.to_string(),
            ephemeral,
            edited: false,
        });
        Ok(())
    }

    async fn edit_reply(&self, meta: &InteractionMeta, content: &str) -> Result<(), HandlerError> {
        self.replies.lock().push(Reply {
            target: ReplyTarget::Interaction(meta.id),
            content: content.to_string(),
            ephemeral: false,
            edited: true,
        });
        Ok(())
    }

    async fn reply_message(&self, message: &Message, content: &str) -> Result<(), HandlerError> {
        self.replies.lock().push(Reply {
            target: ReplyTarget::Message(message.id),
            content: content.to_string(),
            ephemeral: false,
            edited: false,
        });
        Ok(())
    }
}

/// Lookup answering from fixed tables.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    owners: Vec<UserId>,
    guild_owners: HashMap<GuildId, UserId>,
    channels: HashMap<ChannelId, ChannelInfo>,
    permissions: HashMap<(GuildId, UserId), Permissions>,
    bot_roles: HashMap<GuildId, RoleId>,
}

impl StaticLookup {
    /// A lookup knowing nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an application owner.
    #[must_use]
    pub fn with_owner(mut self, user: UserId) -> Self {
        self.owners.push(user);
        self
    }

    /// Sets the owner of a guild.
    #[must_use]
    pub fn with_guild_owner(mut self, guild: GuildId, user: UserId) -> Self {
        self.guild_owners.insert(guild, user);
        self
    }

    /// Registers a channel.
    #[must_use]
    pub fn with_channel(mut self, channel: ChannelInfo) -> Self {
        self.channels.insert(channel.id, channel);
        self
    }

    /// Sets the permissions of a member in every channel of a guild.
    #[must_use]
    pub fn with_permissions(mut self, guild: GuildId, user: UserId, permissions: Permissions) -> Self {
        self.permissions.insert((guild, user), permissions);
        self
    }

    /// Sets the managed role of the bot in a guild.
    #[must_use]
    pub fn with_bot_role(mut self, guild: GuildId, role: RoleId) -> Self {
        self.bot_roles.insert(guild, role);
        self
    }
}

#[async_trait]
impl Lookup for StaticLookup {
    async fn application_owners(&self) -> Result<Vec<UserId>, HandlerError> {
        Ok(self.owners.clone())
    }

    async fn guild_owner(&self, guild_id: GuildId) -> Result<Option<UserId>, HandlerError> {
        Ok(self.guild_owners.get(&guild_id).copied())
    }

    async fn channel(&self, channel_id: ChannelId) -> Result<Option<ChannelInfo>, HandlerError> {
        Ok(self.channels.get(&channel_id).cloned())
    }

    async fn member_permissions(
        &self,
        guild_id: GuildId,
        _channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Option<Permissions>, HandlerError> {
        Ok(self.permissions.get(&(guild_id, user_id)).copied())
    }

    async fn bot_role(&self, guild_id: GuildId) -> Result<Option<RoleId>, HandlerError> {
        Ok(self.bot_roles.get(&guild_id).copied())
    }
}

/// The three in-memory collaborators, kept around for assertions.
#[derive(Debug, Clone)]
pub struct TestPlatform {
    /// Command registry.
    pub registry: Arc<MemoryRegistry>,
    /// Reply recorder.
    pub responder: Arc<RecordingResponder>,
    /// Fixed lookup tables.
    pub lookup: Arc<StaticLookup>,
}

impl Default for TestPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPlatform {
    /// Empty registry, responder and lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(StaticLookup::new())
    }

    /// Uses `lookup` for platform state.
    #[must_use]
    pub fn with_lookup(lookup: StaticLookup) -> Self {
        Self {
            registry: Arc::new(MemoryRegistry::new()),
            responder: Arc::new(RecordingResponder::new()),
            lookup: Arc::new(lookup),
        }
    }

    /// Uses `registry` for command sync.
    #[must_use]
    pub fn with_registry(mut self, registry: MemoryRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// The collaborators as the framework sees them.
    #[must_use]
    pub fn platform(&self) -> Platform {
        Platform {
            lookup: Arc::clone(&self.lookup) as Arc<dyn Lookup>,
            responder: Arc::clone(&self.responder) as Arc<dyn Responder>,
            registry: Arc::clone(&self.registry) as Arc<dyn CommandRegistry>,
        }
    }

    /// A framework with default options and nothing to load.
    ///
    /// # Panics
    ///
    /// Panics if the built-in failure messages fail to load.
    #[must_use]
    pub fn framework(&self) -> Framework {
        Framework::builder(self.platform())
            .build()
            .expect("default framework builds")
    }
}

/// Records every event of the attached kinds.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    seen: Arc<Mutex<Vec<Event>>>,
}

impl EventRecorder {
    /// Attaches a recording listener for each of `kinds`.
    #[must_use]
    pub fn attach(ctx: &Context, kinds: &[EventKind]) -> Self {
        let recorder = Self::default();
        for &kind in kinds {
            let seen = Arc::clone(&recorder.seen);
            ctx.events().on(Arc::new(FnListener::new(
                format!("recorder {kind:?}"),
                kind,
                move |_, event| {
                    seen.lock().push(event);
                    async { Ok(()) }
                },
            )));
        }
        recorder
    }

    /// Recorded events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.seen.lock().clone()
    }

    /// Kinds of the recorded events, in emission order.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.seen.lock().iter().map(Event::kind).collect()
    }

    /// How many events of `kind` were recorded.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.seen.lock().iter().filter(|event| event.kind() == kind).count()
    }
}

/// A human user named after its id.
#[must_use]
pub fn user(id: u64) -> User {
    User::new(UserId::new(id), format!("user{id}"))
}

/// Interaction fields for `user_id` outside any guild.
#[must_use]
pub fn meta(user_id: u64) -> InteractionMeta {
    let id = next_id();
    InteractionMeta::new(InteractionId::new(id), format!("token-{id}"), user(user_id))
}

/// A direct message from `author`.
#[must_use]
pub fn message(author: u64, content: &str) -> Message {
    Message::new(MessageId::new(next_id()), ChannelId::new(DM_CHANNEL), user(author), content)
}

/// A slash command invocation from `user_id`.
#[must_use]
pub fn chat_input(user_id: u64, name: &str, options: Vec<InputOption>) -> ChatInput {
    ChatInput::new(meta(user_id), name, options)
}

/// A button press from `user_id`.
#[must_use]
pub fn button(user_id: u64, custom_id: &str) -> Component {
    Component::new(meta(user_id), ComponentKind::Button, custom_id)
}

/// Ready payload for the bot user in `guilds`.
#[must_use]
pub fn ready_info(guilds: &[u64]) -> ReadyInfo {
    let mut bot = user(BOT_USER);
    bot.bot = true;
    ReadyInfo {
        user: bot,
        guild_ids: guilds.iter().copied().map(GuildId::new).collect(),
    }
}
