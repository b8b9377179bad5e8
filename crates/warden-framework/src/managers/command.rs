//! Command loading, lookup and remote registration.

use crate::command::{Command, CommandKind, CommandType, Variety};
use crate::context::{Context, SharedOptions};
use crate::data::{CommandData, Localizations};
use crate::error::{LoaderError, SyncError};
use crate::loader::{DirectoryIndex, Export, ModuleLoader, ModuleNode};
use crate::sync::{requires_update, CommandRegistry, Scope};
use arc_swap::ArcSwap;
use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Kinds that are registered remotely.
const INTERACTION_KINDS: [CommandKind; 3] = [CommandKind::Slash, CommandKind::Message, CommandKind::User];

/// Finds the candidate named `name`, optionally ignoring case.
///
/// Names are compared literally; case-insensitive mode compares the
/// lowercased forms.
pub fn resolve_in<'a, I>(name: &str, candidates: I, case_insensitive: bool) -> Option<&'a Arc<Command>>
where
    I: IntoIterator<Item = &'a Arc<Command>>,
{
    let mut candidates = candidates.into_iter();
    if case_insensitive {
        let folded = name.to_lowercase();
        candidates.find(|candidate| candidate.name().to_lowercase() == folded)
    } else {
        candidates.find(|candidate| candidate.name() == name)
    }
}

/// Keeps commands answering on any of `kinds`. Synthesised groups are kept
/// when any descendant is.
#[must_use]
pub fn filter_by_kind(commands: &[Arc<Command>], kinds: &[CommandKind]) -> Vec<Arc<Command>> {
    commands
        .iter()
        .filter(|command| has_any_kind(command, kinds))
        .cloned()
        .collect()
}

fn has_any_kind(command: &Command, kinds: &[CommandKind]) -> bool {
    if command.variety() == Variety::Group {
        command.children().any(|child| has_any_kind(child, kinds))
    } else {
        command.kinds().iter().any(|kind| kinds.contains(kind))
    }
}

#[derive(Debug, Clone, Default)]
struct Placement {
    category: Option<String>,
    category_localizations: Localizations,
}

impl Placement {
    fn apply(&self, command: &mut Command) {
        if self.category.is_some() {
            command.set_category(self.category.clone(), self.category_localizations.clone());
        }
    }

    fn with_index(&self, index: Option<&DirectoryIndex>, fallback: Option<&str>) -> Self {
        match (index.and_then(|index| index.category.clone()), fallback) {
            (Some(category), _) => Self {
                category: Some(category),
                category_localizations: index.map(|index| index.category_localizations.clone()).unwrap_or_default(),
            },
            (None, Some(name)) => Self {
                category: Some(name.to_string()),
                category_localizations: index.map(|index| index.category_localizations.clone()).unwrap_or_default(),
            },
            (None, None) => self.clone(),
        }
    }
}

struct Markers {
    category: String,
    group: String,
}

impl Markers {
    fn strip<'a>(marker: &str, name: &'a str) -> Option<&'a str> {
        if marker.is_empty() {
            return None;
        }
        name.strip_prefix(marker).map(str::trim)
    }
}

/// Owns the loaded top-level commands.
pub struct CommandManager {
    options: SharedOptions,
    loader: Arc<dyn ModuleLoader>,
    paths: Vec<String>,
    cache: ArcSwap<Vec<Arc<Command>>>,
}

impl fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("paths", &self.paths)
            .field("commands", &self.len())
            .finish_non_exhaustive()
    }
}

impl CommandManager {
    /// A manager loading from the `commands` root.
    #[must_use]
    pub fn new(options: SharedOptions, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            options,
            loader,
            paths: vec!["commands".to_string()],
            cache: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Replaces the roots commands are loaded from.
    #[must_use]
    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    /// Snapshot of the loaded commands.
    #[must_use]
    pub fn cache(&self) -> Arc<Vec<Arc<Command>>> {
        self.cache.load_full()
    }

    /// Number of loaded top-level commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.load().len()
    }

    /// Whether no commands are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.load().is_empty()
    }

    /// Finds a top-level command by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<Command>> {
        let cache = self.cache.load();
        let case_insensitive = self.options.load().config.case_insensitive_commands;
        resolve_in(name, cache.iter(), case_insensitive).cloned()
    }

    /// Finds a top-level command by name and type. A context menu may share
    /// its name with a chat input command.
    #[must_use]
    pub fn resolve_typed(&self, name: &str, command_type: CommandType) -> Option<Arc<Command>> {
        let cache = self.cache.load();
        let case_insensitive = self.options.load().config.case_insensitive_commands;
        resolve_in(
            name,
            cache.iter().filter(|command| command.command_type() == command_type),
            case_insensitive,
        )
        .cloned()
    }

    /// Clears the cache and loads every command under the configured roots.
    pub fn load(&self, ctx: &Context) -> Result<usize, LoaderError> {
        self.cache.store(Arc::new(Vec::new()));
        info!("Loading commands");

        let options = self.options.load();
        let markers = Markers {
            category: options.config.command_category_directory_prefix.clone(),
            group: options.config.command_group_directory_prefix.clone(),
        };

        let mut loaded = Vec::new();
        for path in &self.paths {
            for node in self.loader.load(path)? {
                Self::load_node(ctx, &node, &Placement::default(), &markers, &mut loaded)?;
            }
        }

        let count = loaded.len();
        self.cache.store(Arc::new(loaded));
        info!(count, "Loaded commands");
        Ok(count)
    }

    fn load_node(
        ctx: &Context,
        node: &ModuleNode,
        placement: &Placement,
        markers: &Markers,
        out: &mut Vec<Arc<Command>>,
    ) -> Result<(), LoaderError> {
        match node {
            ModuleNode::File { exports, .. } => {
                for export in exports {
                    if let Export::Command(factory) = export {
                        let mut command = factory(ctx)?;
                        command.set_root(true);
                        placement.apply(&mut command);
                        debug!(command = %command.name(), "Loaded command");
                        out.push(Arc::new(command));
                    }
                }
            }
            ModuleNode::Directory { name, index, children } => {
                if let Some(category) = Markers::strip(&markers.category, name) {
                    let placement = placement.with_index(index.as_ref(), Some(category));
                    for child in children {
                        Self::load_node(ctx, child, &placement, markers, out)?;
                    }
                } else if let Some(group_name) = Markers::strip(&markers.group, name) {
                    let mut group = Self::load_group(ctx, group_name, index.as_ref(), children, placement, markers, out)?;
                    group.set_root(true);
                    debug!(group = %group.name(), "Loaded command group");
                    out.push(Arc::new(group));
                } else {
                    let placement = placement.with_index(index.as_ref(), None);
                    for child in children {
                        Self::load_node(ctx, child, &placement, markers, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Synthesises a group from a directory. Context menus found inside are
    /// registered at the top level.
    fn load_group(
        ctx: &Context,
        dir_name: &str,
        index: Option<&DirectoryIndex>,
        children: &[ModuleNode],
        placement: &Placement,
        markers: &Markers,
        out: &mut Vec<Arc<Command>>,
    ) -> Result<Command, LoaderError> {
        let index = index.cloned().unwrap_or_default();
        let name = index.name.clone().unwrap_or_else(|| dir_name.to_string());
        let description = index
            .description
            .clone()
            .unwrap_or_else(|| format!("{name} commands"));

        let mut builder = Command::chat_input(name, description)
            .kinds([CommandKind::Prefix, CommandKind::Slash])
            .group();
        for (locale, value) in &index.name_localizations {
            builder = builder.name_localization(locale.clone(), value.clone());
        }
        for (locale, value) in &index.description_localizations {
            builder = builder.description_localization(locale.clone(), value.clone());
        }

        for child in children {
            match child {
                ModuleNode::File { exports, .. } => {
                    for export in exports {
                        let Export::Command(factory) = export else {
                            continue;
                        };
                        let mut command = factory(ctx)?;
                        placement.apply(&mut command);
                        match command.command_type() {
                            CommandType::ChatInput => {
                                command.set_variety(Variety::Command);
                                builder = builder.sub_command(command);
                            }
                            CommandType::ContextMenu => {
                                command.set_root(true);
                                out.push(Arc::new(command));
                            }
                        }
                    }
                }
                ModuleNode::Directory {
                    name,
                    index: nested_index,
                    children: nested,
                } => {
                    let nested_name = Markers::strip(&markers.group, name).unwrap_or(name.as_str());
                    let group = Self::load_group(ctx, nested_name, nested_index.as_ref(), nested, placement, markers, out)?;
                    builder = builder.sub_command(group);
                }
            }
        }

        let mut group = builder.build()?;
        placement.apply(&mut group);
        Ok(group)
    }

    /// Registers interaction commands in every target scope whose remote set differs.
    ///
    /// Returns whether any scope was written.
    pub async fn patch(&self, ctx: &Context) -> Result<bool, SyncError> {
        info!("Patching commands");
        let commands = filter_by_kind(&self.cache(), &INTERACTION_KINDS);
        let local: Vec<CommandData> = commands.iter().flat_map(|command| command.to_json()).collect();

        let guild_ids = self.options.load().guild_ids.clone();
        let scopes: Vec<Scope> = if guild_ids.is_empty() {
            vec![Scope::Global]
        } else {
            guild_ids.into_iter().map(Scope::Guild).collect()
        };

        let registry = ctx.registry();
        let patched = try_join_all(scopes.into_iter().map(|scope| patch_scope(registry, scope, &local))).await?;

        let any = patched.into_iter().any(|patched| patched);
        if any {
            info!("Patched commands");
        } else {
            info!("Commands are already up to date");
        }
        Ok(any)
    }

    /// Removes every registered command from the global scope and all known guilds.
    pub async fn unpatch(&self, ctx: &Context) -> Result<(), SyncError> {
        let registry = ctx.registry();
        let mut scopes = vec![Scope::Global];
        scopes.extend(
            registry
                .cached_guilds()
                .await
                .map_err(SyncError::Scopes)?
                .into_iter()
                .map(Scope::Guild),
        );

        try_join_all(scopes.into_iter().map(|scope| async move {
            registry
                .bulk_replace(scope, &[])
                .await
                .map_err(|source| SyncError::Replace { scope, source })
        }))
        .await?;

        info!("Unpatched all commands");
        Ok(())
    }
}

async fn patch_scope(registry: &dyn CommandRegistry, scope: Scope, local: &[CommandData]) -> Result<bool, SyncError> {
    let remote = registry
        .fetch(scope)
        .await
        .map_err(|source| SyncError::Fetch { scope, source })?;

    if !requires_update(&remote, local) {
        debug!(%scope, "Remote commands match");
        return Ok(false);
    }

    registry
        .bulk_replace(scope, local)
        .await
        .map_err(|source| SyncError::Replace { scope, source })?;
    info!(%scope, count = local.len(), "Replaced remote commands");
    Ok(true)
}
