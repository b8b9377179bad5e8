//! Configuration schema definitions.

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};
use warden_common::{parse_snowflake, LoggingConfig};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Discord connection and registration scope.
    #[validate]
    pub discord: DiscordConfig,

    /// Dispatch behaviour of the framework.
    #[validate]
    pub framework: FrameworkConfig,

    /// Logging output.
    pub logging: LoggingConfig,
}

/// Discord connection and registration scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token.
    #[validate(custom(
        function = "crate::validation::validate_discord_token",
        message = "Invalid Discord token format"
    ))]
    pub token: String,

    /// Guilds to register commands in. Empty registers globally.
    #[validate(custom(
        function = "crate::validation::validate_snowflakes",
        message = "Guild ids must be 17 to 19 digit snowflakes"
    ))]
    pub guild_ids: Vec<String>,

    /// Users treated as bot owners by the owner-only guard.
    #[validate(custom(
        function = "crate::validation::validate_snowflakes",
        message = "Owner ids must be 17 to 19 digit snowflakes"
    ))]
    pub owner_ids: Vec<String>,
}

/// Dispatch behaviour of the framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Resolve command names regardless of case.
    pub case_insensitive_commands: bool,

    /// Match message prefixes regardless of case.
    pub case_insensitive_prefixes: bool,

    /// Prefixes recognised for text commands.
    #[validate(custom(
        function = "crate::validation::validate_prefixes",
        message = "Prefixes must be 1 to 10 non-whitespace characters"
    ))]
    pub default_prefix: Vec<String>,

    /// Pattern matched against the start of a message, tried after the mention prefix.
    #[validate(custom(
        function = "crate::validation::validate_regex_pattern",
        message = "Regex prefix must be a valid regular expression"
    ))]
    pub regex_prefix: Option<String>,

    /// Ignore `@bot` mentions as a prefix.
    pub disable_mention_prefix: bool,

    /// Separates an action id from its arguments in a component custom id.
    #[validate(length(min = 1, max = 5, message = "Separator must be 1 to 5 characters"))]
    pub action_id_separator: String,

    /// Module directories starting with this marker declare a category.
    #[validate(length(min = 1, message = "Category marker cannot be empty"))]
    pub command_category_directory_prefix: String,

    /// Module directories starting with this marker are synthesised into a command group.
    #[validate(length(min = 1, message = "Group marker cannot be empty"))]
    pub command_group_directory_prefix: String,
}

impl Config {
    /// Runs field validation plus the cross-field checks derive cannot express.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        self.framework.validate_directory_markers()?;
        Ok(())
    }
}

impl DiscordConfig {
    /// Parsed guild ids. Invalid entries are dropped; run validation first.
    #[must_use]
    pub fn guild_ids(&self) -> Vec<u64> {
        self.guild_ids.iter().filter_map(|id| parse_snowflake(id)).collect()
    }

    /// Parsed owner ids.
    #[must_use]
    pub fn owner_ids(&self) -> Vec<u64> {
        self.owner_ids.iter().filter_map(|id| parse_snowflake(id)).collect()
    }
}

impl FrameworkConfig {
    /// Compiles the configured regex prefix, anchored to the start of the message.
    pub fn compiled_regex_prefix(&self) -> Result<Option<Regex>, regex::Error> {
        self.regex_prefix
            .as_deref()
            .map(|pattern| {
                if pattern.starts_with('^') {
                    Regex::new(pattern)
                } else {
                    Regex::new(&format!("^(?:{pattern})"))
                }
            })
            .transpose()
    }

    fn validate_directory_markers(&self) -> Result<(), ValidationErrors> {
        if self.command_category_directory_prefix == self.command_group_directory_prefix {
            let mut errors = ValidationErrors::new();
            let mut error = ValidationError::new("conflicting_directory_markers");
            error.message =
                Some("Category and group directory markers must differ".into());
            errors.add("command_group_directory_prefix", error);
            return Err(errors);
        }

        Ok(())
    }
}
