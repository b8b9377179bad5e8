//! Commands: declared units invoked by slash, prefix, context menu and autocomplete.

use crate::arguments::Arguments;
use crate::context::Context;
use crate::data::{CommandData, CommandDataType, Localizations, OptionData, OptionType};
use crate::error::{DispatchError, HandlerResult, Surface, UnitKind, ValidationError};
use crate::events::{CommandPayload, CommandSource, Event};
use crate::input::{ChatInput, ContextMenu, Message};
use crate::precondition::{Precondition, PreconditionContainer, PreconditionResult};
use futures::future::BoxFuture;
use serenity::model::permissions::Permissions;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};
use validator::{Validate, ValidationError as FieldError, ValidationErrors};
use warden_common::{CHAT_INPUT_NAME_REGEX, CONTEXT_MENU_NAME_REGEX};

/// How a command is registered remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Slash command, also usable by prefix.
    ChatInput,
    /// Message or user context menu.
    ContextMenu,
}

/// A surface a command answers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Slash command.
    Slash,
    /// Prefixed text message.
    Prefix,
    /// Message context menu.
    Message,
    /// User context menu.
    User,
}

impl CommandKind {
    /// Whether this kind is valid for a command of type `command_type`.
    #[must_use]
    pub const fn allowed_for(self, command_type: CommandType) -> bool {
        match command_type {
            CommandType::ChatInput => matches!(self, Self::Slash | Self::Prefix),
            CommandType::ContextMenu => matches!(self, Self::Message | Self::User),
        }
    }
}

/// Whether a command was declared directly or synthesised from a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variety {
    /// A declared command.
    #[default]
    Command,
    /// A group built from a marked directory.
    Group,
}

/// An entry in a command's option list.
#[derive(Clone)]
pub enum CommandOption {
    /// A raw option, including hand-written sub-commands.
    Data(OptionData),
    /// A child command dispatched automatically.
    Command(Arc<Command>),
}

impl fmt::Debug for CommandOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => f.debug_tuple("Data").field(&data.name).finish(),
            Self::Command(command) => f.debug_tuple("Command").field(&command.name()).finish(),
        }
    }
}

/// Slash command handler.
pub type SlashHandler = Arc<dyn Fn(Context, ChatInput) -> BoxFuture<'static, HandlerResult> + Send + Sync>;
/// Prefix command handler.
pub type PrefixHandler =
    Arc<dyn Fn(Context, Message, Arguments) -> BoxFuture<'static, HandlerResult> + Send + Sync>;
/// Context menu handler.
pub type MenuHandler = Arc<dyn Fn(Context, ContextMenu) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

#[derive(Clone, Default)]
struct Handlers {
    slash: Option<SlashHandler>,
    prefix: Option<PrefixHandler>,
    message_menu: Option<MenuHandler>,
    user_menu: Option<MenuHandler>,
    autocomplete: Option<SlashHandler>,
}

/// Declarative options of a command, validated on construction.
#[derive(Debug, Clone, Validate)]
pub struct CommandOptions {
    /// Remote registration type.
    pub command_type: CommandType,
    /// Surfaces the command answers on.
    pub kinds: Vec<CommandKind>,
    /// Command name.
    #[validate(length(min = 1, max = 32, message = "Name must be 1 to 32 characters"))]
    pub name: String,
    /// Localized names.
    #[validate(custom(
        function = "validate_localized_names",
        message = "Localized names must be 1 to 32 characters"
    ))]
    pub name_localizations: Localizations,
    /// Description shown in the client.
    #[validate(length(max = 100, message = "Description must be at most 100 characters"))]
    pub description: String,
    /// Localized descriptions.
    #[validate(custom(
        function = "validate_localized_descriptions",
        message = "Localized descriptions must be at most 100 characters"
    ))]
    pub description_localizations: Localizations,
    /// Category used by help listings.
    pub category: Option<String>,
    /// Localized categories.
    pub category_localizations: Localizations,
    /// Whether the command is usable in direct messages.
    pub dm_permission: bool,
    /// Permissions required by default.
    pub default_member_permissions: Option<Permissions>,
    /// Options and child commands.
    pub options: Vec<CommandOption>,
    /// Guards run before any handler.
    pub preconditions: PreconditionContainer,
}

fn validate_localized_names(values: &Localizations) -> Result<(), FieldError> {
    if values.values().all(|v| (1..=32).contains(&v.chars().count())) {
        Ok(())
    } else {
        Err(FieldError::new("localized_name_length"))
    }
}

fn validate_localized_descriptions(values: &Localizations) -> Result<(), FieldError> {
    if values.values().all(|v| v.chars().count() <= 100) {
        Ok(())
    } else {
        Err(FieldError::new("localized_description_length"))
    }
}

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> FieldError {
    let mut error = FieldError::new(code);
    error.message = Some(message.into());
    error
}

/// A declared command.
#[derive(Clone)]
pub struct Command {
    options: CommandOptions,
    handlers: Handlers,
    variety: Variety,
    root: bool,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.options.name)
            .field("type", &self.options.command_type)
            .field("kinds", &self.options.kinds)
            .field("variety", &self.variety)
            .field("root", &self.root)
            .field("options", &self.options.options)
            .field("preconditions", &self.options.preconditions)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Starts a slash/prefix command.
    pub fn chat_input(name: impl Into<String>, description: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(CommandType::ChatInput, name.into(), description.into())
    }

    /// Starts a context menu command.
    pub fn context_menu(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(CommandType::ContextMenu, name.into(), String::new())
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.options.description
    }

    /// Remote registration type.
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        self.options.command_type
    }

    /// Declared surfaces.
    #[must_use]
    pub fn kinds(&self) -> &[CommandKind] {
        &self.options.kinds
    }

    /// Whether the command declares `kind`.
    #[must_use]
    pub fn has_kind(&self, kind: CommandKind) -> bool {
        self.options.kinds.contains(&kind)
    }

    /// Help category.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.options.category.as_deref()
    }

    /// Guards of this command.
    #[must_use]
    pub const fn preconditions(&self) -> &PreconditionContainer {
        &self.options.preconditions
    }

    /// Declared options and child commands.
    #[must_use]
    pub fn options(&self) -> &[CommandOption] {
        &self.options.options
    }

    /// Child commands dispatched automatically.
    pub fn children(&self) -> impl Iterator<Item = &Arc<Self>> {
        self.options.options.iter().filter_map(|option| match option {
            CommandOption::Command(child) => Some(child),
            CommandOption::Data(_) => None,
        })
    }

    /// Declared or synthesised.
    #[must_use]
    pub const fn variety(&self) -> Variety {
        self.variety
    }

    /// Whether the command is registered at the top level.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.root
    }

    /// A group whose sub-commands are child commands routed by the framework.
    #[must_use]
    pub fn is_automatic_group(&self) -> bool {
        self.variety == Variety::Group || self.children().next().is_some()
    }

    /// A command whose sub-commands are raw options handled by its own handlers.
    #[must_use]
    pub fn is_manual_group(&self) -> bool {
        !self.is_automatic_group()
            && self.options.options.iter().any(|option| {
                matches!(option, CommandOption::Data(data) if data.kind.is_sub_command())
            })
    }

    /// Either kind of group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.is_automatic_group() || self.is_manual_group()
    }

    pub(crate) fn set_variety(&mut self, variety: Variety) {
        self.variety = variety;
    }

    pub(crate) fn set_root(&mut self, root: bool) {
        self.root = root;
    }

    pub(crate) fn set_category(&mut self, category: Option<String>, localizations: Localizations) {
        self.options.category = category;
        self.options.category_localizations = localizations;
    }

    fn non_empty(localizations: &Localizations) -> Option<Localizations> {
        (!localizations.is_empty()).then(|| localizations.clone())
    }

    fn option_data(&self) -> Vec<OptionData> {
        self.options
            .options
            .iter()
            .map(|option| match option {
                CommandOption::Data(data) => data.clone(),
                CommandOption::Command(child) => child.to_option(),
            })
            .collect()
    }

    /// Serialized remote shape. Context menus yield one entry per kind.
    #[must_use]
    pub fn to_json(&self) -> Vec<CommandData> {
        let base = |kind: CommandDataType, description: String, options: Vec<OptionData>| CommandData {
            kind,
            name: self.options.name.clone(),
            name_localizations: Self::non_empty(&self.options.name_localizations),
            description,
            description_localizations: None,
            dm_permission: Some(self.options.dm_permission),
            default_member_permissions: self.options.default_member_permissions.map(|permissions| permissions.bits()),
            options,
        };

        match self.options.command_type {
            CommandType::ContextMenu => self
                .options
                .kinds
                .iter()
                .filter_map(|kind| match kind {
                    CommandKind::Message => Some(CommandDataType::Message),
                    CommandKind::User => Some(CommandDataType::User),
                    CommandKind::Slash | CommandKind::Prefix => None,
                })
                .map(|kind| base(kind, String::new(), Vec::new()))
                .collect(),
            CommandType::ChatInput => {
                let mut data = base(
                    CommandDataType::ChatInput,
                    self.options.description.clone(),
                    self.option_data(),
                );
                data.description_localizations =
                    Self::non_empty(&self.options.description_localizations);
                vec![data]
            }
        }
    }

    /// Serialized shape when nested under a group.
    #[must_use]
    pub fn to_option(&self) -> OptionData {
        let kind = if self.is_group() {
            OptionType::SubCommandGroup
        } else {
            OptionType::SubCommand
        };
        let mut data = OptionData::new(kind, self.options.name.clone(), self.options.description.clone());
        data.name_localizations = Self::non_empty(&self.options.name_localizations);
        data.description_localizations = Self::non_empty(&self.options.description_localizations);
        data.options = self.option_data();
        data
    }

    fn missing(&self, surface: Surface) -> DispatchError {
        DispatchError::MissingHandler {
            unit: UnitKind::Command,
            name: self.options.name.clone(),
            surface,
        }
    }

    fn resolve_child(&self, ctx: &Context, name: &str) -> Option<Arc<Self>> {
        let case_insensitive = ctx.options().config.case_insensitive_commands;
        crate::managers::command::resolve_in(name, self.children(), case_insensitive).cloned()
    }

    async fn guard(&self, ctx: &Context, payload: CommandPayload, result: PreconditionResult) -> bool {
        match result {
            Ok(()) => {
                ctx.emit(Event::CommandPreconditionPass(payload)).await;
                true
            }
            Err(failure) => {
                debug!(command = %self.options.name, identifier = %failure.identifier, "Precondition failed");
                ctx.emit(Event::CommandPreconditionFail(payload, failure)).await;
                false
            }
        }
    }

    /// Runs guards then the slash handler, routing through groups.
    pub fn handle_slash(self: Arc<Self>, ctx: Context, input: ChatInput) -> BoxFuture<'static, Result<(), DispatchError>> {
        Box::pin(async move {
            let result = self.options.preconditions.slash_run(&ctx, &input, &self).await;
            let payload = CommandPayload::new(CommandSource::Slash(input.clone()), Arc::clone(&self));
            if !self.guard(&ctx, payload, result).await {
                return Ok(());
            }

            if !self.is_automatic_group() {
                let handler = self.handlers.slash.clone().ok_or_else(|| self.missing(Surface::Slash))?;
                return handler(ctx, input).await.map_err(DispatchError::Handler);
            }

            let mut input = input;
            let Some(route) = input.next_route() else {
                trace!(command = %self.options.name, "Group invoked without a sub-command");
                return Ok(());
            };
            match self.resolve_child(&ctx, &route) {
                Some(child) => child.handle_slash(ctx, input).await,
                None => {
                    debug!(command = %self.options.name, sub_command = %route, "Unknown sub-command");
                    Ok(())
                }
            }
        })
    }

    /// Runs guards then the prefix handler, routing through groups with the next argument.
    pub fn handle_prefix(
        self: Arc<Self>,
        ctx: Context,
        message: Message,
        args: Arguments,
    ) -> BoxFuture<'static, Result<(), DispatchError>> {
        Box::pin(async move {
            let result = self.options.preconditions.prefix_run(&ctx, &message, &self).await;
            let payload = CommandPayload::new(CommandSource::Prefix(message.clone()), Arc::clone(&self))
                .with_args(args.clone());
            if !self.guard(&ctx, payload, result).await {
                return Ok(());
            }

            if !self.is_automatic_group() {
                let handler = self.handlers.prefix.clone().ok_or_else(|| self.missing(Surface::Prefix))?;
                return handler(ctx, message, args).await.map_err(DispatchError::Handler);
            }

            let mut args = args;
            let Some(route) = args.single() else {
                trace!(command = %self.options.name, "Group invoked without a sub-command");
                return Ok(());
            };
            match self.resolve_child(&ctx, &route) {
                Some(child) => child.handle_prefix(ctx, message, args).await,
                None => {
                    debug!(command = %self.options.name, sub_command = %route, "Unknown sub-command");
                    Ok(())
                }
            }
        })
    }

    /// Runs guards then the message or user context menu handler.
    pub fn handle_context_menu(
        self: Arc<Self>,
        ctx: Context,
        menu: ContextMenu,
    ) -> BoxFuture<'static, Result<(), DispatchError>> {
        Box::pin(async move {
            let result = self.options.preconditions.context_menu_run(&ctx, &menu, &self).await;
            let (source, surface, handler) = if menu.is_message() {
                (
                    CommandSource::MessageMenu(menu.clone()),
                    Surface::MessageMenu,
                    self.handlers.message_menu.clone(),
                )
            } else {
                (
                    CommandSource::UserMenu(menu.clone()),
                    Surface::UserMenu,
                    self.handlers.user_menu.clone(),
                )
            };

            let payload = CommandPayload::new(source, Arc::clone(&self));
            if !self.guard(&ctx, payload, result).await {
                return Ok(());
            }

            let handler = handler.ok_or_else(|| self.missing(surface))?;
            handler(ctx, menu).await.map_err(DispatchError::Handler)
        })
    }

    /// Runs the autocomplete handler, routing through groups. Guards are not run.
    pub fn handle_autocomplete(
        self: Arc<Self>,
        ctx: Context,
        input: ChatInput,
    ) -> BoxFuture<'static, Result<(), DispatchError>> {
        Box::pin(async move {
            if !self.is_automatic_group() {
                let handler = self
                    .handlers
                    .autocomplete
                    .clone()
                    .ok_or_else(|| self.missing(Surface::Autocomplete))?;
                return handler(ctx, input).await.map_err(DispatchError::Handler);
            }

            let mut input = input;
            let Some(route) = input.next_route() else {
                return Ok(());
            };
            match self.resolve_child(&ctx, &route) {
                Some(child) => child.handle_autocomplete(ctx, input).await,
                None => Ok(()),
            }
        })
    }
}

/// Builder for [`Command`].
#[must_use]
pub struct CommandBuilder {
    options: CommandOptions,
    handlers: Handlers,
    variety: Variety,
}

impl CommandBuilder {
    fn new(command_type: CommandType, name: String, description: String) -> Self {
        Self {
            options: CommandOptions {
                command_type,
                kinds: Vec::new(),
                name,
                name_localizations: Localizations::new(),
                description,
                description_localizations: Localizations::new(),
                category: None,
                category_localizations: Localizations::new(),
                dm_permission: true,
                default_member_permissions: None,
                options: Vec::new(),
                preconditions: PreconditionContainer::new(),
            },
            handlers: Handlers::default(),
            variety: Variety::Command,
        }
    }

    /// Replaces the declared surfaces.
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = CommandKind>) -> Self {
        self.options.kinds = kinds.into_iter().collect();
        self
    }

    /// Adds a localized name.
    pub fn name_localization(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.options.name_localizations.insert(locale.into(), name.into());
        self
    }

    /// Adds a localized description.
    pub fn description_localization(mut self, locale: impl Into<String>, description: impl Into<String>) -> Self {
        self.options
            .description_localizations
            .insert(locale.into(), description.into());
        self
    }

    /// Sets the help category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.options.category = Some(category.into());
        self
    }

    /// Whether the command is usable in direct messages.
    pub const fn dm_permission(mut self, allowed: bool) -> Self {
        self.options.dm_permission = allowed;
        self
    }

    /// Permissions required by default.
    pub const fn default_member_permissions(mut self, permissions: Permissions) -> Self {
        self.options.default_member_permissions = Some(permissions);
        self
    }

    /// Adds a raw option.
    pub fn option(mut self, option: OptionData) -> Self {
        self.options.options.push(CommandOption::Data(option));
        self
    }

    /// Adds a child command.
    pub fn sub_command(mut self, child: Command) -> Self {
        self.options.options.push(CommandOption::Command(Arc::new(child)));
        self
    }

    /// Adds a shared child command.
    pub fn sub_command_shared(mut self, child: Arc<Command>) -> Self {
        self.options.options.push(CommandOption::Command(child));
        self
    }

    /// Appends a guard.
    pub fn precondition<P: Precondition + 'static>(mut self, precondition: P) -> Self {
        self.options.preconditions.add(precondition);
        self
    }

    /// Marks the command as a synthesised group.
    pub const fn group(mut self) -> Self {
        self.variety = Variety::Group;
        self
    }

    /// Slash handler.
    pub fn on_slash<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, ChatInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.slash = Some(Arc::new(
            move |ctx: Context, input: ChatInput| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(ctx, input)) },
        ));
        self
    }

    /// Prefix handler.
    pub fn on_prefix<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, Message, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.prefix = Some(Arc::new(
            move |ctx: Context, message: Message, args: Arguments| -> BoxFuture<'static, HandlerResult> {
                Box::pin(handler(ctx, message, args))
            },
        ));
        self
    }

    /// Message context menu handler.
    pub fn on_message_menu<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, ContextMenu) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.message_menu = Some(Arc::new(
            move |ctx: Context, menu: ContextMenu| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(ctx, menu)) },
        ));
        self
    }

    /// User context menu handler.
    pub fn on_user_menu<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, ContextMenu) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.user_menu = Some(Arc::new(
            move |ctx: Context, menu: ContextMenu| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(ctx, menu)) },
        ));
        self
    }

    /// Autocomplete handler.
    pub fn on_autocomplete<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Context, ChatInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.autocomplete = Some(Arc::new(
            move |ctx: Context, input: ChatInput| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(ctx, input)) },
        ));
        self
    }

    fn check(&self) -> Result<(), ValidationError> {
        let options = &self.options;
        let mut errors = options.validate().err().unwrap_or_else(ValidationErrors::new);

        let name_valid = match options.command_type {
            CommandType::ChatInput => CHAT_INPUT_NAME_REGEX.is_match(&options.name),
            CommandType::ContextMenu => CONTEXT_MENU_NAME_REGEX.is_match(&options.name),
        };
        if !name_valid {
            errors.add("name", field_error("invalid_name", "Name contains invalid characters"));
        }

        if options.kinds.is_empty() {
            errors.add("kinds", field_error("empty_kinds", "At least one kind is required"));
        } else if let Some(kind) = options.kinds.iter().find(|k| !k.allowed_for(options.command_type)) {
            errors.add(
                "kinds",
                field_error(
                    "kind_type_mismatch",
                    format!("{kind:?} is not valid for a {:?} command", options.command_type),
                ),
            );
        }

        if options.command_type == CommandType::ContextMenu && !options.options.is_empty() {
            errors.add("options", field_error("context_menu_options", "Context menus take no options"));
        }
        if self
            .options
            .options
            .iter()
            .any(|o| matches!(o, CommandOption::Command(c) if c.command_type() != CommandType::ChatInput))
        {
            errors.add("options", field_error("nested_context_menu", "Child commands must be chat input"));
        }

        let automatic = self.variety == Variety::Group
            || options.options.iter().any(|o| matches!(o, CommandOption::Command(_)));
        for kind in &options.kinds {
            let present = match kind {
                CommandKind::Slash => automatic || self.handlers.slash.is_some(),
                CommandKind::Prefix => automatic || self.handlers.prefix.is_some(),
                CommandKind::Message => self.handlers.message_menu.is_some(),
                CommandKind::User => self.handlers.user_menu.is_some(),
            };
            if !present {
                errors.add(
                    "handlers",
                    field_error("missing_handler", format!("{kind:?} kind declared without a handler")),
                );
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(options.name.clone(), errors))
        }
    }

    /// Validates the options and builds the command.
    pub fn build(self) -> Result<Command, ValidationError> {
        self.check()?;
        Ok(Command {
            options: self.options,
            handlers: self.handlers,
            variety: self.variety,
            root: false,
        })
    }
}
