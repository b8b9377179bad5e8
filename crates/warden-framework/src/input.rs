//! Platform-neutral snapshots of inbound interactions and messages.
//!
//! The bot adapter converts gateway payloads into these types before
//! handing them to the framework, which keeps dispatch testable without a
//! live connection.

use serenity::model::id::{ChannelId, GuildId, InteractionId, MessageId, RoleId, UserId};
use serenity::model::permissions::Permissions;

/// The invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Whether the account is a bot.
    pub bot: bool,
}

impl User {
    /// A human user.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bot: false,
        }
    }

    /// Mention string for this user.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Fields every interaction carries.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMeta {
    /// Interaction id.
    pub id: InteractionId,
    /// Continuation token used to reply.
    pub token: String,
    /// Invoking user.
    pub user: User,
    /// Guild the interaction happened in.
    pub guild_id: Option<GuildId>,
    /// Channel the interaction happened in.
    pub channel_id: Option<ChannelId>,
    /// Locale of the invoking user.
    pub locale: Option<String>,
    /// Resolved permissions of the invoking member.
    pub member_permissions: Option<Permissions>,
    /// Resolved permissions of the bot in the channel.
    pub app_permissions: Option<Permissions>,
}

impl InteractionMeta {
    /// An interaction from `user` with no guild or channel.
    pub fn new(id: InteractionId, token: impl Into<String>, user: User) -> Self {
        Self {
            id,
            token: token.into(),
            user,
            guild_id: None,
            channel_id: None,
            locale: None,
            member_permissions: None,
            app_permissions: None,
        }
    }

    /// Places the interaction in a guild channel.
    #[must_use]
    pub const fn in_guild(mut self, guild_id: GuildId, channel_id: ChannelId) -> Self {
        self.guild_id = Some(guild_id);
        self.channel_id = Some(channel_id);
        self
    }

    /// Places the interaction in a direct message channel.
    #[must_use]
    pub const fn in_dm(mut self, channel_id: ChannelId) -> Self {
        self.guild_id = None;
        self.channel_id = Some(channel_id);
        self
    }

    /// Sets the user locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Value of a slash command option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Text.
    String(String),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Number(f64),
    /// Boolean.
    Boolean(bool),
    /// User reference.
    User(UserId),
    /// Channel reference.
    Channel(ChannelId),
    /// Role reference.
    Role(RoleId),
    /// User or role reference.
    Mentionable(u64),
    /// Uploaded attachment id.
    Attachment(u64),
    /// A sub-command and its options.
    SubCommand(Vec<InputOption>),
    /// A sub-command group and its single sub-command.
    SubCommandGroup(Vec<InputOption>),
}

/// A named option of a slash command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InputOption {
    /// Option name.
    pub name: String,
    /// Option value.
    pub value: OptionValue,
    /// Whether the user is currently typing this option (autocomplete only).
    pub focused: bool,
}

impl InputOption {
    /// A leaf option.
    pub fn new(name: impl Into<String>, value: OptionValue) -> Self {
        Self {
            name: name.into(),
            value,
            focused: false,
        }
    }

    /// A sub-command option wrapping `options`.
    pub fn sub_command(name: impl Into<String>, options: Vec<Self>) -> Self {
        Self::new(name, OptionValue::SubCommand(options))
    }

    /// A sub-command group option wrapping a single sub-command.
    pub fn sub_command_group(name: impl Into<String>, sub_command: Self) -> Self {
        Self::new(name, OptionValue::SubCommandGroup(vec![sub_command]))
    }

    /// Marks the option as focused.
    #[must_use]
    pub const fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    fn children(&self) -> Option<&[Self]> {
        match &self.value {
            OptionValue::SubCommand(children) | OptionValue::SubCommandGroup(children) => {
                Some(children)
            }
            _ => None,
        }
    }
}

/// A slash command or autocomplete interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatInput {
    /// Shared interaction fields.
    pub meta: InteractionMeta,
    /// Root command name.
    pub command_name: String,
    /// Top-level options, including any sub-command nesting.
    pub options: Vec<InputOption>,
    route_depth: usize,
}

impl ChatInput {
    /// A chat input interaction for `command_name`.
    pub fn new(meta: InteractionMeta, command_name: impl Into<String>, options: Vec<InputOption>) -> Self {
        Self {
            meta,
            command_name: command_name.into(),
            options,
            route_depth: 0,
        }
    }

    /// The sub-command group name, if the invocation targets one.
    #[must_use]
    pub fn sub_command_group(&self) -> Option<&str> {
        self.options.first().and_then(|option| match option.value {
            OptionValue::SubCommandGroup(_) => Some(option.name.as_str()),
            _ => None,
        })
    }

    /// The sub-command name, looking through a group if present.
    #[must_use]
    pub fn sub_command(&self) -> Option<&str> {
        let first = self.options.first()?;
        match &first.value {
            OptionValue::SubCommand(_) => Some(first.name.as_str()),
            OptionValue::SubCommandGroup(children) => children.first().map(|c| c.name.as_str()),
            _ => None,
        }
    }

    /// The next unconsumed route segment. Groups resolve before sub-commands.
    pub fn next_route(&mut self) -> Option<String> {
        let route: Vec<&str> = self
            .sub_command_group()
            .into_iter()
            .chain(self.sub_command())
            .collect();
        let segment = route.get(self.route_depth).map(|s| (*s).to_string())?;
        self.route_depth += 1;
        Some(segment)
    }

    /// Options of the innermost sub-command.
    #[must_use]
    pub fn leaf_options(&self) -> &[InputOption] {
        let mut options: &[InputOption] = &self.options;
        while let Some(children) = options.first().and_then(InputOption::children) {
            options = children;
        }
        options
    }

    /// Looks up a leaf option value.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.leaf_options()
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
    }

    /// A string option.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.option(name)? {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// An integer option.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.option(name)? {
            OptionValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// A user option.
    #[must_use]
    pub fn user(&self, name: &str) -> Option<UserId> {
        match self.option(name)? {
            OptionValue::User(value) => Some(*value),
            _ => None,
        }
    }

    /// The option being typed in an autocomplete request.
    #[must_use]
    pub fn focused(&self) -> Option<&InputOption> {
        self.leaf_options().iter().find(|option| option.focused)
    }
}

/// Target of a context menu invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    /// A message was right-clicked.
    Message {
        /// Message id.
        id: MessageId,
        /// Message text.
        content: String,
        /// Message author.
        author: User,
    },
    /// A user was right-clicked.
    User(User),
}

/// A message or user context menu interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// Shared interaction fields.
    pub meta: InteractionMeta,
    /// Command name.
    pub command_name: String,
    /// What was right-clicked.
    pub target: MenuTarget,
}

impl ContextMenu {
    /// Whether this is a message context menu.
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self.target, MenuTarget::Message { .. })
    }
}

/// Which component produced an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// A button press.
    Button,
    /// A select menu choice.
    SelectMenu,
    /// A modal submission.
    ModalSubmit,
}

/// A button, select menu or modal interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Shared interaction fields.
    pub meta: InteractionMeta,
    /// Component kind.
    pub kind: ComponentKind,
    /// Developer supplied custom id.
    pub custom_id: String,
    /// Selected values (select menus).
    pub values: Vec<String>,
    /// Submitted text inputs (modals), as custom id and value pairs.
    pub fields: Vec<(String, String)>,
    /// Message the component is attached to.
    pub message_id: Option<MessageId>,
}

impl Component {
    /// A component interaction with no values.
    pub fn new(meta: InteractionMeta, kind: ComponentKind, custom_id: impl Into<String>) -> Self {
        Self {
            meta,
            kind,
            custom_id: custom_id.into(),
            values: Vec::new(),
            fields: Vec::new(),
            message_id: None,
        }
    }

    /// The action id: the custom id up to the first separator.
    #[must_use]
    pub fn action_id<'a>(&'a self, separator: &str) -> &'a str {
        self.custom_id
            .split(separator)
            .next()
            .unwrap_or_default()
    }

    /// Segments after the action id.
    #[must_use]
    pub fn arguments<'a>(&'a self, separator: &str) -> Vec<&'a str> {
        self.custom_id.split(separator).skip(1).collect()
    }

    /// A submitted modal field.
    #[must_use]
    pub fn field(&self, custom_id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(id, _)| id == custom_id)
            .map(|(_, value)| value.as_str())
    }
}

/// A text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message id.
    pub id: MessageId,
    /// Channel id.
    pub channel_id: ChannelId,
    /// Guild id, `None` in direct messages.
    pub guild_id: Option<GuildId>,
    /// Message author.
    pub author: User,
    /// Raw text.
    pub content: String,
    /// Whether the platform generated the message.
    pub system: bool,
    /// Webhook that sent the message.
    pub webhook_id: Option<u64>,
}

impl Message {
    /// A user message in a direct message channel.
    pub fn new(id: MessageId, channel_id: ChannelId, author: User, content: impl Into<String>) -> Self {
        Self {
            id,
            channel_id,
            guild_id: None,
            author,
            content: content.into(),
            system: false,
            webhook_id: None,
        }
    }

    /// Places the message in a guild.
    #[must_use]
    pub const fn in_guild(mut self, guild_id: GuildId) -> Self {
        self.guild_id = Some(guild_id);
        self
    }
}

/// Any inbound interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Slash command.
    ChatInput(ChatInput),
    /// Message or user context menu.
    ContextMenu(ContextMenu),
    /// Autocomplete request.
    Autocomplete(ChatInput),
    /// Button, select menu or modal.
    Component(Component),
}

impl Interaction {
    /// Shared interaction fields.
    #[must_use]
    pub const fn meta(&self) -> &InteractionMeta {
        match self {
            Self::ChatInput(input) | Self::Autocomplete(input) => &input.meta,
            Self::ContextMenu(menu) => &menu.meta,
            Self::Component(component) => &component.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> InteractionMeta {
        InteractionMeta::new(
            InteractionId::new(1),
            "token",
            User::new(UserId::new(100_000_000_000_000_010), "tester"),
        )
    }

    #[test]
    fn test_route_through_group() {
        let mut input = ChatInput::new(
            meta(),
            "settings",
            vec![InputOption::sub_command_group(
                "prefix",
                InputOption::sub_command(
                    "set",
                    vec![InputOption::new("value", OptionValue::String("?".into()))],
                ),
            )],
        );

        assert_eq!(input.sub_command_group(), Some("prefix"));
        assert_eq!(input.sub_command(), Some("set"));
        assert_eq!(input.string("value"), Some("?"));
        assert_eq!(input.next_route().as_deref(), Some("prefix"));
        assert_eq!(input.next_route().as_deref(), Some("set"));
        assert_eq!(input.next_route(), None);
    }

    #[test]
    fn test_route_without_nesting() {
        let mut input = ChatInput::new(
            meta(),
            "echo",
            vec![InputOption::new("text", OptionValue::String("hi".into()))],
        );
        assert_eq!(input.next_route(), None);
        assert_eq!(input.string("text"), Some("hi"));
        assert_eq!(input.integer("text"), None);
    }

    #[test]
    fn test_focused_option() {
        let input = ChatInput::new(
            meta(),
            "role",
            vec![InputOption::sub_command(
                "add",
                vec![
                    InputOption::new("user", OptionValue::String("12".into())),
                    InputOption::new("role", OptionValue::String("mo".into())).focused(),
                ],
            )],
        );
        assert_eq!(input.focused().map(|o| o.name.as_str()), Some("role"));
    }

    #[test]
    fn test_component_custom_id_split() {
        let component = Component::new(meta(), ComponentKind::Button, "pingUser,123,abc");
        assert_eq!(component.action_id(","), "pingUser");
        assert_eq!(component.arguments(","), vec!["123", "abc"]);
        assert_eq!(component.action_id(":"), "pingUser,123,abc");
    }
}
