//! Lifecycle orchestration: building the context and driving load, patch and teardown.

use crate::context::{Context, FrameworkOptions, Platform, SharedOptions};
use crate::error::FrameworkError;
use crate::events::{Event, ReadyInfo};
use crate::loader::{ModuleLoader, StaticLoader};
use crate::managers::{ActionManager, CommandManager, ListenerManager, PluginManager};
use crate::plugin::Plugin;
use crate::preconditions::FAIL_IDENTIFIERS;
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use warden_common::WardenError;
use warden_config::FrameworkConfig;

/// Owns the shared context and exposes the lifecycle phases.
#[derive(Debug, Clone)]
pub struct Framework {
    ctx: Context,
}

impl Framework {
    /// Starts building a framework talking to `platform`.
    pub fn builder(platform: Platform) -> FrameworkBuilder {
        FrameworkBuilder {
            platform,
            options: None,
            loader: Arc::new(StaticLoader::new()),
            plugins: Vec::new(),
            builtin_listeners: true,
        }
    }

    /// The shared context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.ctx
    }

    /// Loads listeners, actions and commands, then notifies plugins.
    ///
    /// Runs before any event is dispatched.
    pub async fn preparing(&self) -> Result<(), FrameworkError> {
        let ctx = &self.ctx;
        ctx.listeners().load(ctx)?;
        ctx.listeners().patch(ctx);
        ctx.actions().load(ctx)?;
        ctx.commands().load(ctx)?;
        ctx.plugins().broadcast_preparing(ctx).await?;
        info!(
            listeners = ctx.listeners().len(),
            actions = ctx.actions().len(),
            commands = ctx.commands().len(),
            "Framework prepared"
        );
        Ok(())
    }

    /// Marks the client ready, registers commands and notifies plugins.
    pub async fn ready(&self, ready: ReadyInfo) -> Result<(), FrameworkError> {
        let ctx = &self.ctx;
        ctx.mark_ready(ready.user.id);
        ctx.commands().patch(ctx).await?;
        ctx.plugins().broadcast_ready(ctx).await?;
        ctx.emit(Event::ClientReady(ready)).await;
        Ok(())
    }

    /// Feeds an inbound event to the attached listeners.
    pub async fn dispatch(&self, event: Event) {
        self.ctx.emit(event).await;
    }

    /// Notifies plugins and detaches every listener.
    pub async fn destroy(&self) -> Result<(), FrameworkError> {
        let ctx = &self.ctx;
        ctx.plugins().broadcast_destroy(ctx).await?;
        ctx.listeners().unpatch(ctx);
        ctx.mark_destroyed();
        info!("Framework destroyed");
        Ok(())
    }
}

/// Builder for [`Framework`].
#[must_use]
pub struct FrameworkBuilder {
    platform: Platform,
    options: Option<FrameworkOptions>,
    loader: Arc<dyn ModuleLoader>,
    plugins: Vec<Arc<dyn Plugin>>,
    builtin_listeners: bool,
}

impl fmt::Debug for FrameworkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkBuilder")
            .field("options", &self.options)
            .field("plugins", &self.plugins.len())
            .field("builtin_listeners", &self.builtin_listeners)
            .finish_non_exhaustive()
    }
}

impl FrameworkBuilder {
    /// Runtime options. Defaults to the default framework section.
    pub fn options(mut self, options: FrameworkOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Source of the command, action and listener module trees.
    pub fn loader<L: ModuleLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Registers a plugin.
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Whether the built-in dispatch listeners are attached.
    pub const fn builtin_listeners(mut self, enabled: bool) -> Self {
        self.builtin_listeners = enabled;
        self
    }

    /// Checks the failure tables and assembles the context.
    pub fn build(self) -> Result<Framework, FrameworkError> {
        let options = match self.options {
            Some(options) => options,
            None => FrameworkOptions::new(FrameworkConfig::default())?,
        };
        options
            .command_fail_messages
            .ensure_identifiers(FAIL_IDENTIFIERS)
            .map_err(WardenError::from)?;
        options
            .action_fail_messages
            .ensure_identifiers(FAIL_IDENTIFIERS)
            .map_err(WardenError::from)?;

        let shared: SharedOptions = Arc::new(ArcSwap::from_pointee(options));
        let commands = CommandManager::new(Arc::clone(&shared), Arc::clone(&self.loader));
        let actions = ActionManager::new(Arc::clone(&self.loader));
        let listeners = ListenerManager::new(self.loader).with_builtin(self.builtin_listeners);
        let plugins = PluginManager::new();
        for plugin in self.plugins {
            plugins.use_shared(plugin);
        }

        Ok(Framework {
            ctx: Context::new(shared, self.platform, commands, actions, listeners, plugins),
        })
    }
}
