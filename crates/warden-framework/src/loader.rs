//! Module trees: the directory layout commands, actions and listeners are loaded from.
//!
//! A tree mirrors a folder of source modules. Files export unit factories;
//! directories carry an optional index with group or category metadata. The
//! managers walk trees produced by a [`ModuleLoader`] on every load.

use crate::action::Action;
use crate::command::Command;
use crate::context::Context;
use crate::data::Localizations;
use crate::error::{LoaderError, ValidationError};
use crate::listener::Listener;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a command from the shared context.
pub type CommandFactory = Arc<dyn Fn(&Context) -> Result<Command, ValidationError> + Send + Sync>;
/// Builds an action from the shared context.
pub type ActionFactory = Arc<dyn Fn(&Context) -> Result<Action, ValidationError> + Send + Sync>;
/// Builds a listener from the shared context.
pub type ListenerFactory = Arc<dyn Fn(&Context) -> Arc<dyn Listener> + Send + Sync>;

/// One unit exported by a module file.
#[derive(Clone)]
pub enum Export {
    /// A command.
    Command(CommandFactory),
    /// An action.
    Action(ActionFactory),
    /// A listener.
    Listener(ListenerFactory),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(_) => f.write_str("Export::Command"),
            Self::Action(_) => f.write_str("Export::Action"),
            Self::Listener(_) => f.write_str("Export::Listener"),
        }
    }
}

impl Export {
    /// Exports a command factory.
    pub fn command<F>(factory: F) -> Self
    where
        F: Fn(&Context) -> Result<Command, ValidationError> + Send + Sync + 'static,
    {
        Self::Command(Arc::new(factory))
    }

    /// Exports an action factory.
    pub fn action<F>(factory: F) -> Self
    where
        F: Fn(&Context) -> Result<Action, ValidationError> + Send + Sync + 'static,
    {
        Self::Action(Arc::new(factory))
    }

    /// Exports a listener factory.
    pub fn listener<F>(factory: F) -> Self
    where
        F: Fn(&Context) -> Arc<dyn Listener> + Send + Sync + 'static,
    {
        Self::Listener(Arc::new(factory))
    }
}

/// Metadata from a directory index module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIndex {
    /// Group name, defaults to the directory name.
    pub name: Option<String>,
    /// Localized group names.
    pub name_localizations: Localizations,
    /// Group description.
    pub description: Option<String>,
    /// Localized group descriptions.
    pub description_localizations: Localizations,
    /// Category, defaults to the directory name.
    pub category: Option<String>,
    /// Localized categories.
    pub category_localizations: Localizations,
}

/// A file or directory in a module tree.
#[derive(Debug, Clone)]
pub enum ModuleNode {
    /// A module file.
    File {
        /// File name without extension.
        name: String,
        /// Exported units.
        exports: Vec<Export>,
    },
    /// A directory.
    Directory {
        /// Directory name, including any marker.
        name: String,
        /// Index metadata.
        index: Option<DirectoryIndex>,
        /// Entries in load order.
        children: Vec<ModuleNode>,
    },
}

impl ModuleNode {
    /// A file exporting `exports`.
    pub fn file(name: impl Into<String>, exports: Vec<Export>) -> Self {
        Self::File {
            name: name.into(),
            exports,
        }
    }

    /// A directory without an index.
    pub fn directory(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self::Directory {
            name: name.into(),
            index: None,
            children,
        }
    }

    /// Attaches index metadata to a directory. Files are returned unchanged.
    #[must_use]
    pub fn with_index(self, index: DirectoryIndex) -> Self {
        match self {
            Self::Directory { name, children, .. } => Self::Directory {
                name,
                index: Some(index),
                children,
            },
            file @ Self::File { .. } => file,
        }
    }

    /// Entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Directory { name, .. } => name,
        }
    }

    /// Every export in this subtree, depth first.
    #[must_use]
    pub fn exports(&self) -> Vec<&Export> {
        match self {
            Self::File { exports, .. } => exports.iter().collect(),
            Self::Directory { children, .. } => children.iter().flat_map(Self::exports).collect(),
        }
    }
}

/// Produces the module tree stored under a root path.
pub trait ModuleLoader: Send + Sync {
    /// Entries under `root`. An unknown root yields no entries.
    fn load(&self, root: &str) -> Result<Vec<ModuleNode>, LoaderError>;
}

/// Loader serving trees registered in code.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    roots: HashMap<String, Vec<ModuleNode>>,
}

impl StaticLoader {
    /// An empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` under `root`.
    #[must_use]
    pub fn with(mut self, root: impl Into<String>, node: ModuleNode) -> Self {
        self.roots.entry(root.into()).or_default().push(node);
        self
    }
}

impl ModuleLoader for StaticLoader {
    fn load(&self, root: &str) -> Result<Vec<ModuleNode>, LoaderError> {
        Ok(self.roots.get(root).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports_are_collected_depth_first() {
        let tree = ModuleNode::directory(
            "@fun",
            vec![
                ModuleNode::file("a", vec![Export::listener(|_| unreachable_listener())]),
                ModuleNode::directory(
                    "nested",
                    vec![ModuleNode::file("b", vec![Export::listener(|_| unreachable_listener())])],
                ),
            ],
        );
        assert_eq!(tree.exports().len(), 2);
        assert_eq!(tree.name(), "@fun");
    }

    #[test]
    fn test_static_loader_roots() {
        let loader = StaticLoader::new()
            .with("commands", ModuleNode::file("ping", Vec::new()))
            .with("commands", ModuleNode::file("echo", Vec::new()));
        let nodes = loader.load("commands").expect("loads");
        assert_eq!(nodes.iter().map(ModuleNode::name).collect::<Vec<_>>(), vec!["ping", "echo"]);
        assert!(loader.load("actions").expect("loads").is_empty());
    }

    #[test]
    fn test_index_only_applies_to_directories() {
        let index = DirectoryIndex {
            description: Some("Role tools".into()),
            ..DirectoryIndex::default()
        };
        let dir = ModuleNode::directory("!role", Vec::new()).with_index(index.clone());
        assert!(matches!(dir, ModuleNode::Directory { index: Some(ref i), .. } if *i == index));
        let file = ModuleNode::file("ping", Vec::new()).with_index(index);
        assert!(matches!(file, ModuleNode::File { .. }));
    }

    fn unreachable_listener() -> Arc<dyn Listener> {
        Arc::new(crate::listener::FnListener::new(
            "noop",
            crate::events::EventKind::ClientReady,
            |_, _| async { Ok(()) },
        ))
    }
}
