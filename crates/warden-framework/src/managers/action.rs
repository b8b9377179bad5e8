//! Action loading and lookup.

use crate::action::Action;
use crate::context::Context;
use crate::error::LoaderError;
use crate::loader::{Export, ModuleLoader};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the loaded actions.
pub struct ActionManager {
    loader: Arc<dyn ModuleLoader>,
    paths: Vec<String>,
    cache: ArcSwap<Vec<Arc<Action>>>,
}

impl fmt::Debug for ActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionManager")
            .field("paths", &self.paths)
            .field("actions", &self.len())
            .finish_non_exhaustive()
    }
}

impl ActionManager {
    /// A manager loading from the `actions` root.
    #[must_use]
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            paths: vec!["actions".to_string()],
            cache: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Replaces the roots actions are loaded from.
    #[must_use]
    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    /// Snapshot of the loaded actions.
    #[must_use]
    pub fn cache(&self) -> Arc<Vec<Arc<Action>>> {
        self.cache.load_full()
    }

    /// Number of loaded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.load().len()
    }

    /// Whether no actions are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.load().is_empty()
    }

    /// Finds an action by exact id.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<Arc<Action>> {
        self.cache.load().iter().find(|action| action.id() == id).cloned()
    }

    /// Clears the cache and loads every action under the configured roots.
    /// Directories carry no meaning for actions.
    pub fn load(&self, ctx: &Context) -> Result<usize, LoaderError> {
        self.cache.store(Arc::new(Vec::new()));
        info!("Loading actions");

        let mut loaded: Vec<Arc<Action>> = Vec::new();
        for path in &self.paths {
            for node in self.loader.load(path)? {
                for export in node.exports() {
                    let Export::Action(factory) = export else {
                        continue;
                    };
                    let action = factory(ctx)?;
                    if loaded.iter().any(|existing| existing.id() == action.id()) {
                        warn!(action = %action.id(), "Duplicate action id, keeping the first");
                        continue;
                    }
                    debug!(action = %action.id(), "Loaded action");
                    loaded.push(Arc::new(action));
                }
            }
        }

        let count = loaded.len();
        self.cache.store(Arc::new(loaded));
        info!(count, "Loaded actions");
        Ok(count)
    }
}
