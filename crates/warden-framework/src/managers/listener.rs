//! Listener loading and attachment to the event emitter.

use crate::context::Context;
use crate::error::LoaderError;
use crate::events::ListenerId;
use crate::listener::Listener;
use crate::loader::{Export, ModuleLoader};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns the loaded listeners and their registrations.
pub struct ListenerManager {
    loader: Arc<dyn ModuleLoader>,
    paths: Vec<String>,
    include_builtin: bool,
    cache: ArcSwap<Vec<Arc<dyn Listener>>>,
    attached: Mutex<Vec<ListenerId>>,
}

impl fmt::Debug for ListenerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerManager")
            .field("paths", &self.paths)
            .field("include_builtin", &self.include_builtin)
            .field("listeners", &self.len())
            .field("attached", &self.attached.lock().len())
            .finish_non_exhaustive()
    }
}

impl ListenerManager {
    /// A manager loading from the `listeners` root plus the built-in dispatch listeners.
    #[must_use]
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            paths: vec!["listeners".to_string()],
            include_builtin: true,
            cache: ArcSwap::from_pointee(Vec::new()),
            attached: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the roots listeners are loaded from.
    #[must_use]
    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    /// Whether the built-in dispatch listeners are loaded.
    #[must_use]
    pub const fn with_builtin(mut self, include: bool) -> Self {
        self.include_builtin = include;
        self
    }

    /// Snapshot of the loaded listeners.
    #[must_use]
    pub fn cache(&self) -> Arc<Vec<Arc<dyn Listener>>> {
        self.cache.load_full()
    }

    /// Number of loaded listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.load().len()
    }

    /// Whether no listeners are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.load().is_empty()
    }

    /// Clears the cache and loads the built-in and user listeners.
    pub fn load(&self, ctx: &Context) -> Result<usize, LoaderError> {
        self.cache.store(Arc::new(Vec::new()));
        info!("Loading listeners");

        let mut loaded = if self.include_builtin {
            crate::listeners::builtin()
        } else {
            Vec::new()
        };
        for path in &self.paths {
            for node in self.loader.load(path)? {
                for export in node.exports() {
                    if let Export::Listener(factory) = export {
                        let listener = factory(ctx);
                        debug!(listener = %listener.name(), event = ?listener.event(), "Loaded listener");
                        loaded.push(listener);
                    }
                }
            }
        }

        let count = loaded.len();
        self.cache.store(Arc::new(loaded));
        info!(count, "Loaded listeners");
        Ok(count)
    }

    /// Attaches every loaded listener. Previous registrations are removed first.
    pub fn patch(&self, ctx: &Context) {
        self.unpatch(ctx);
        let ids: Vec<ListenerId> = self
            .cache
            .load()
            .iter()
            .map(|listener| ctx.events().on(Arc::clone(listener)))
            .collect();
        debug!(count = ids.len(), "Attached listeners");
        *self.attached.lock() = ids;
    }

    /// Detaches every listener attached by [`Self::patch`].
    pub fn unpatch(&self, ctx: &Context) {
        let ids = std::mem::take(&mut *self.attached.lock());
        for id in ids {
            ctx.events().off(id);
        }
    }
}
