//! Managers owning the loaded commands, actions, listeners and plugins.

pub mod action;
pub mod command;
pub mod listener;
pub mod plugin;

pub use action::ActionManager;
pub use command::{resolve_in, CommandManager};
pub use listener::ListenerManager;
pub use plugin::PluginManager;
