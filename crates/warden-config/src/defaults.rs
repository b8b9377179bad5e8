//! Default values for every configuration section.

use crate::schema::{Config, DiscordConfig, FrameworkConfig};
use warden_common::LoggingConfig;

/// Separator between an action id and its arguments.
pub const DEFAULT_ACTION_ID_SEPARATOR: &str = ",";

/// Marker for category directories in a module tree.
pub const DEFAULT_CATEGORY_MARKER: &str = "@";

/// Marker for group directories in a module tree.
pub const DEFAULT_GROUP_MARKER: &str = "!";

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig::default(),
            framework: FrameworkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            guild_ids: Vec::new(),
            owner_ids: Vec::new(),
        }
    }
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            case_insensitive_commands: false,
            case_insensitive_prefixes: false,
            default_prefix: Vec::new(),
            regex_prefix: None,
            disable_mention_prefix: false,
            action_id_separator: DEFAULT_ACTION_ID_SEPARATOR.to_string(),
            command_category_directory_prefix: DEFAULT_CATEGORY_MARKER.to_string(),
            command_group_directory_prefix: DEFAULT_GROUP_MARKER.to_string(),
        }
    }
}
