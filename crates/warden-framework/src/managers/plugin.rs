//! Plugin registration and lifecycle broadcasts.

use crate::context::Context;
use crate::error::{FrameworkError, HandlerResult};
use crate::plugin::Plugin;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Preparing,
    Ready,
    Destroy,
}

/// Plugins keyed by name, in registration order.
#[derive(Default)]
pub struct PluginManager {
    plugins: RwLock<Vec<Arc<dyn Plugin>>>,
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager").field("plugins", &self.names()).finish()
    }
}

impl PluginManager {
    /// An empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin.
    pub fn use_plugin<P: Plugin + 'static>(&self, plugin: P) {
        self.use_shared(Arc::new(plugin));
    }

    /// Registers a shared plugin, replacing one with the same name in place.
    pub fn use_shared(&self, plugin: Arc<dyn Plugin>) {
        let mut plugins = self.plugins.write();
        if let Some(existing) = plugins.iter_mut().find(|existing| existing.name() == plugin.name()) {
            debug!(plugin = %plugin.name(), "Replacing plugin");
            *existing = plugin;
        } else {
            debug!(plugin = %plugin.name(), version = %plugin.version(), "Registered plugin");
            plugins.push(plugin);
        }
    }

    /// A plugin by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.read().iter().find(|plugin| plugin.name() == name).cloned()
    }

    /// Registered names in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.plugins.read().iter().map(|plugin| plugin.name().to_string()).collect()
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// Whether no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    pub(crate) async fn broadcast_preparing(&self, ctx: &Context) -> Result<(), FrameworkError> {
        self.broadcast(ctx, Phase::Preparing).await
    }

    pub(crate) async fn broadcast_ready(&self, ctx: &Context) -> Result<(), FrameworkError> {
        self.broadcast(ctx, Phase::Ready).await
    }

    pub(crate) async fn broadcast_destroy(&self, ctx: &Context) -> Result<(), FrameworkError> {
        self.broadcast(ctx, Phase::Destroy).await
    }

    async fn broadcast(&self, ctx: &Context, phase: Phase) -> Result<(), FrameworkError> {
        let plugins: Vec<Arc<dyn Plugin>> = self.plugins.read().clone();
        for plugin in plugins {
            debug!(plugin = %plugin.name(), ?phase, "Notifying plugin");
            let hook: BoxFuture<'_, HandlerResult> = match phase {
                Phase::Preparing => plugin.on_preparing(ctx),
                Phase::Ready => plugin.on_ready(ctx),
                Phase::Destroy => plugin.on_destroy(ctx),
            };
            hook.await.map_err(|source| FrameworkError::Plugin {
                name: plugin.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn version(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn test_same_name_replaces_in_place() {
        let manager = PluginManager::new();
        manager.use_plugin(Named("stats", "1.0.0"));
        manager.use_plugin(Named("votes", "1.0.0"));
        manager.use_plugin(Named("stats", "2.0.0"));

        assert_eq!(manager.names(), vec!["stats".to_string(), "votes".to_string()]);
        assert_eq!(manager.get("stats").map(|p| p.version().to_string()), Some("2.0.0".to_string()));
        assert!(manager.get("missing").is_none());
        assert_eq!(manager.len(), 2);
    }
}
