//! # Warden Framework
//!
//! Command, action and listener dispatch for Discord bots.
//!
//! Units are loaded from a module tree, guarded by preconditions and routed
//! from interactions and prefixed messages. Application commands are kept in
//! sync with the remote registry by diffing the local and remote shapes, so
//! unchanged commands are never rewritten.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod arguments;
pub mod command;
pub mod context;
pub mod data;
pub mod error;
pub mod events;
pub mod framework;
pub mod input;
pub mod listener;
pub mod listeners;
pub mod loader;
pub mod managers;
pub mod plugin;
pub mod precondition;
pub mod preconditions;
pub mod sync;
pub mod testing;

pub use action::{Action, ActionBuilder, ActionOptions};
pub use arguments::Arguments;
pub use command::{Command, CommandBuilder, CommandKind, CommandOption, CommandType, Variety};
pub use context::{ChannelInfo, Context, FrameworkOptions, Lookup, Platform, Responder};
pub use data::{ChoiceData, CommandData, CommandDataType, Localizations, OptionData, OptionType};
pub use error::{
    DispatchError, FrameworkError, HandlerError, HandlerResult, LoaderError, Surface, SyncError, UnitKind,
    ValidationError,
};
pub use events::{Event, EventKind, ReadyInfo};
pub use framework::{Framework, FrameworkBuilder};
pub use input::{
    ChatInput, Component, ComponentKind, ContextMenu, InputOption, Interaction, InteractionMeta, MenuTarget, Message,
    OptionValue, User,
};
pub use listener::{FnListener, Listener};
pub use loader::{DirectoryIndex, Export, ModuleLoader, ModuleNode, StaticLoader};
pub use plugin::Plugin;
pub use precondition::{Precondition, PreconditionError, PreconditionResult};
pub use sync::{CommandRegistry, Scope};
