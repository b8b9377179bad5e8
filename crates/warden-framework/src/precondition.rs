//! Precondition guards and the ordered container that runs them.

use crate::action::Action;
use crate::command::Command;
use crate::context::Context;
use crate::input::{ChatInput, Component, ContextMenu, Message};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use warden_i18n::Parameters;

/// A failed guard: an identifier looked up in the fail-message tables plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionError {
    /// Failure identifier, such as `GuildOnly`.
    pub identifier: String,
    /// Interpolation arguments for the failure message.
    pub parameters: Parameters,
}

impl PreconditionError {
    /// A failure with no parameters.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            parameters: Parameters::new(),
        }
    }

    /// Attaches a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters = self.parameters.with(key, value);
        self
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precondition failed: {}", self.identifier)
    }
}

impl std::error::Error for PreconditionError {}

/// Outcome of a single guard.
pub type PreconditionResult = Result<(), PreconditionError>;

/// A reusable guard evaluated before a handler runs.
///
/// Every surface defaults to passing, so a guard only implements the
/// surfaces it cares about.
#[async_trait]
pub trait Precondition: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Guard for prefixed messages.
    async fn prefix_run(&self, _ctx: &Context, _message: &Message, _command: &Command) -> PreconditionResult {
        Ok(())
    }

    /// Guard for slash commands.
    async fn slash_run(&self, _ctx: &Context, _input: &ChatInput, _command: &Command) -> PreconditionResult {
        Ok(())
    }

    /// Guard for message and user context menus.
    async fn context_menu_run(
        &self,
        _ctx: &Context,
        _menu: &ContextMenu,
        _command: &Command,
    ) -> PreconditionResult {
        Ok(())
    }

    /// Guard for buttons, select menus and modals.
    async fn action_run(&self, _ctx: &Context, _component: &Component, _action: &Action) -> PreconditionResult {
        Ok(())
    }
}

/// Ordered list of guards. Evaluation stops at the first failure.
#[derive(Clone, Default)]
pub struct PreconditionContainer {
    entries: Vec<Arc<dyn Precondition>>,
}

impl fmt::Debug for PreconditionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.name()))
            .finish()
    }
}

impl PreconditionContainer {
    /// An empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a guard.
    pub fn add<P: Precondition + 'static>(&mut self, precondition: P) -> &mut Self {
        self.entries.push(Arc::new(precondition));
        self
    }

    /// Appends a shared guard.
    pub fn add_shared(&mut self, precondition: Arc<dyn Precondition>) -> &mut Self {
        self.entries.push(precondition);
        self
    }

    /// Number of guards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no guards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Guard names in evaluation order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name()).collect()
    }

    /// Runs every prefix guard in order.
    pub async fn prefix_run(&self, ctx: &Context, message: &Message, command: &Command) -> PreconditionResult {
        for entry in &self.entries {
            entry.prefix_run(ctx, message, command).await?;
        }
        Ok(())
    }

    /// Runs every slash guard in order.
    pub async fn slash_run(&self, ctx: &Context, input: &ChatInput, command: &Command) -> PreconditionResult {
        for entry in &self.entries {
            entry.slash_run(ctx, input, command).await?;
        }
        Ok(())
    }

    /// Runs every context menu guard in order.
    pub async fn context_menu_run(
        &self,
        ctx: &Context,
        menu: &ContextMenu,
        command: &Command,
    ) -> PreconditionResult {
        for entry in &self.entries {
            entry.context_menu_run(ctx, menu, command).await?;
        }
        Ok(())
    }

    /// Runs every action guard in order.
    pub async fn action_run(&self, ctx: &Context, component: &Component, action: &Action) -> PreconditionResult {
        for entry in &self.entries {
            entry.action_run(ctx, component, action).await?;
        }
        Ok(())
    }
}
