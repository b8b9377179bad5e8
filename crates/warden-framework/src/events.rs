//! Framework events and the emitter that fans them out to listeners.

use crate::action::Action;
use crate::arguments::Arguments;
use crate::command::Command;
use crate::context::Context;
use crate::error::{DispatchError, SharedError};
use crate::input::{ChatInput, Component, ContextMenu, Interaction, InteractionMeta, Message, User};
use crate::listener::Listener;
use crate::precondition::PreconditionError;
use parking_lot::RwLock;
use serenity::model::id::GuildId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, trace, Instrument};
use uuid::Uuid;

/// Discriminant of [`Event`], used to subscribe listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EventKind {
    ClientReady,
    InteractionCreate,
    MessageCreate,
    UserMessage,
    ClientMention,
    PrefixedMessage,
    NonPrefixedMessage,
    UnknownPrefixCommand,
    CommandPreconditionPass,
    CommandPreconditionFail,
    ActionPreconditionPass,
    ActionPreconditionFail,
    CommandSuccess,
    CommandError,
    ActionSuccess,
    ActionError,
    ListenerSuccess,
    ListenerError,
}

impl EventKind {
    /// Whether listener outcomes for this kind are reported. Outcome events are not, to avoid loops.
    #[must_use]
    pub const fn reports_outcome(self) -> bool {
        !matches!(self, Self::ListenerSuccess | Self::ListenerError)
    }
}

/// Where a command invocation came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandSource {
    /// Slash command.
    Slash(ChatInput),
    /// Prefixed message.
    Prefix(Message),
    /// Message context menu.
    MessageMenu(ContextMenu),
    /// User context menu.
    UserMenu(ContextMenu),
}

impl CommandSource {
    /// Interaction fields, `None` for messages.
    #[must_use]
    pub const fn meta(&self) -> Option<&InteractionMeta> {
        match self {
            Self::Slash(input) => Some(&input.meta),
            Self::MessageMenu(menu) | Self::UserMenu(menu) => Some(&menu.meta),
            Self::Prefix(_) => None,
        }
    }

    /// The invoking user.
    #[must_use]
    pub const fn user(&self) -> &User {
        match self {
            Self::Prefix(message) => &message.author,
            Self::Slash(input) => &input.meta.user,
            Self::MessageMenu(menu) | Self::UserMenu(menu) => &menu.meta.user,
        }
    }

    /// Locale of the invoking user, if known.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.meta().and_then(|meta| meta.locale.as_deref())
    }
}

/// Payload of command events.
#[derive(Debug, Clone)]
pub struct CommandPayload {
    /// Raw input.
    pub from: CommandSource,
    /// The command that was invoked.
    pub command: Arc<Command>,
    /// Parsed arguments, for prefix invocations.
    pub args: Option<Arguments>,
}

impl CommandPayload {
    /// A payload without arguments.
    #[must_use]
    pub const fn new(from: CommandSource, command: Arc<Command>) -> Self {
        Self {
            from,
            command,
            args: None,
        }
    }

    /// Attaches prefix arguments.
    #[must_use]
    pub fn with_args(mut self, args: Arguments) -> Self {
        self.args = Some(args);
        self
    }
}

/// Payload of action events.
#[derive(Debug, Clone)]
pub struct ActionPayload {
    /// Raw component interaction.
    pub from: Component,
    /// The action that was invoked.
    pub action: Arc<Action>,
}

impl ActionPayload {
    /// A new payload.
    #[must_use]
    pub const fn new(from: Component, action: Arc<Action>) -> Self {
        Self { from, action }
    }
}

/// Payload of listener outcome events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerPayload {
    /// Listener name.
    pub listener: String,
    /// Event the listener ran for.
    pub event: EventKind,
}

/// How a text prefix was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixKind {
    /// The bot was mentioned.
    Mention,
    /// The configured regex matched.
    Regex,
    /// A configured or fetched string prefix matched.
    Text,
}

/// The prefix matched at the start of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPrefix {
    /// The matched text as it appears in the message.
    pub text: String,
    /// How it was matched.
    pub kind: PrefixKind,
}

/// Session information delivered when the client becomes ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyInfo {
    /// The bot user.
    pub user: User,
    /// Guilds the bot is in.
    pub guild_ids: Vec<GuildId>,
}

/// Everything the framework emits.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum Event {
    ClientReady(ReadyInfo),
    InteractionCreate(Interaction),
    MessageCreate(Message),
    UserMessage(Message),
    ClientMention(Message),
    PrefixedMessage { message: Message, prefix: MatchedPrefix },
    NonPrefixedMessage(Message),
    UnknownPrefixCommand { message: Message, name: String },
    CommandPreconditionPass(CommandPayload),
    CommandPreconditionFail(CommandPayload, PreconditionError),
    ActionPreconditionPass(ActionPayload),
    ActionPreconditionFail(ActionPayload, PreconditionError),
    CommandSuccess(CommandPayload),
    CommandError(CommandPayload, Arc<DispatchError>),
    ActionSuccess(ActionPayload),
    ActionError(ActionPayload, Arc<DispatchError>),
    ListenerSuccess(ListenerPayload),
    ListenerError(ListenerPayload, SharedError),
}

impl Event {
    /// Discriminant of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ClientReady(_) => EventKind::ClientReady,
            Self::InteractionCreate(_) => EventKind::InteractionCreate,
            Self::MessageCreate(_) => EventKind::MessageCreate,
            Self::UserMessage(_) => EventKind::UserMessage,
            Self::ClientMention(_) => EventKind::ClientMention,
            Self::PrefixedMessage { .. } => EventKind::PrefixedMessage,
            Self::NonPrefixedMessage(_) => EventKind::NonPrefixedMessage,
            Self::UnknownPrefixCommand { .. } => EventKind::UnknownPrefixCommand,
            Self::CommandPreconditionPass(_) => EventKind::CommandPreconditionPass,
            Self::CommandPreconditionFail(..) => EventKind::CommandPreconditionFail,
            Self::ActionPreconditionPass(_) => EventKind::ActionPreconditionPass,
            Self::ActionPreconditionFail(..) => EventKind::ActionPreconditionFail,
            Self::CommandSuccess(_) => EventKind::CommandSuccess,
            Self::CommandError(..) => EventKind::CommandError,
            Self::ActionSuccess(_) => EventKind::ActionSuccess,
            Self::ActionError(..) => EventKind::ActionError,
            Self::ListenerSuccess(_) => EventKind::ListenerSuccess,
            Self::ListenerError(..) => EventKind::ListenerError,
        }
    }
}

/// Handle returned when attaching a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    kind: EventKind,
    once: bool,
    listener: Arc<dyn Listener>,
}

/// Registry of attached listeners.
#[derive(Default)]
pub struct EventEmitter {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.registrations.read().len())
            .finish()
    }
}

impl EventEmitter {
    /// An emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `listener` to its event. `once` listeners detach after their first run.
    pub fn on(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let registration = Registration {
            id,
            kind: listener.event(),
            once: listener.once(),
            listener,
        };
        self.registrations.write().push(registration);
        id
    }

    /// Detaches a listener. Returns whether it was attached.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    /// Number of listeners attached to `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registrations
            .read()
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    fn take_matching(&self, kind: EventKind) -> Vec<(String, Arc<dyn Listener>)> {
        let mut registrations = self.registrations.write();
        let matching = registrations
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| (registration.listener.name().to_string(), Arc::clone(&registration.listener)))
            .collect();
        registrations.retain(|registration| !(registration.once && registration.kind == kind));
        matching
    }

    /// Runs every listener attached to the event's kind in registration order.
    pub(crate) async fn dispatch(&self, ctx: &Context, event: Event) {
        let kind = event.kind();
        let listeners = self.take_matching(kind);
        if listeners.is_empty() {
            trace!(event = ?kind, "No listeners");
            return;
        }

        let span = tracing::debug_span!("event", event = ?kind, dispatch = %Uuid::new_v4());
        async {
            for (name, listener) in listeners {
                let outcome = listener.run(ctx.clone(), event.clone()).await;
                let payload = ListenerPayload {
                    listener: name,
                    event: kind,
                };

                match outcome {
                    Ok(()) => {
                        if kind.reports_outcome() {
                            ctx.emit(Event::ListenerSuccess(payload)).await;
                        }
                    }
                    Err(err) => {
                        error!(listener = %payload.listener, error = %err, "Listener failed");
                        if kind.reports_outcome() {
                            ctx.emit(Event::ListenerError(payload, SharedError::from(err))).await;
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await;
    }
}
