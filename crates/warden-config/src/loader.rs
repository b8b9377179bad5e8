//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use warden_common::{Result as WardenResult, WardenError};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "WARDEN_CONFIG_PATH";

/// Files probed, in order, when no explicit path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["warden.yaml", "warden.yml", "warden.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unsupported file extension
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for WardenError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_source("failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::parse_file(path)?;
        debug!(path = %path.display(), "Parsed configuration file");

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from the environment and the first file found
    pub fn load() -> WardenResult<Config> {
        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            info!(path = %config_path, "Loading configuration");
            return Ok(Self::load_config(&config_path)?);
        }

        if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
        {
            info!(path = %path.display(), "Loading configuration");
            return Ok(Self::load_config(path)?);
        }

        info!("No configuration file found, using defaults and environment");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Parse a configuration document, picking the format from the extension
    pub fn parse_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
            "toml" => Ok(toml::from_str(&content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }

        if let Some(guilds) = lookup("WARDEN_GUILD_IDS") {
            config.discord.guild_ids = split_list(&guilds);
        }

        if let Some(owners) = lookup("WARDEN_OWNER_IDS") {
            config.discord.owner_ids = split_list(&owners);
        }

        if let Some(prefixes) = lookup("WARDEN_DEFAULT_PREFIX") {
            config.framework.default_prefix = split_list(&prefixes);
        }

        if let Some(pattern) = lookup("WARDEN_REGEX_PREFIX") {
            config.framework.regex_prefix = Some(pattern);
        }

        if let Some(value) = lookup("WARDEN_CASE_INSENSITIVE_COMMANDS") {
            config.framework.case_insensitive_commands =
                parse_bool("WARDEN_CASE_INSENSITIVE_COMMANDS", &value)?;
        }

        if let Some(value) = lookup("WARDEN_CASE_INSENSITIVE_PREFIXES") {
            config.framework.case_insensitive_prefixes =
                parse_bool("WARDEN_CASE_INSENSITIVE_PREFIXES", &value)?;
        }

        if let Some(value) = lookup("WARDEN_DISABLE_MENTION_PREFIX") {
            config.framework.disable_mention_prefix =
                parse_bool("WARDEN_DISABLE_MENTION_PREFIX", &value)?;
        }

        if let Some(level) = lookup("WARDEN_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::str::ParseBoolError| ConfigError::EnvParseError {
            var: var.to_string(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| vars.get(key).map(|v| (*v).to_string())
    }

    #[test]
    fn test_overrides_replace_lists() {
        let vars = HashMap::from([
            ("DISCORD_TOKEN", "MTA.env.token"),
            ("WARDEN_GUILD_IDS", "100000000000000001, 100000000000000002,"),
            ("WARDEN_DEFAULT_PREFIX", "!,?"),
        ]);
        let mut config = Config::default();
        ConfigLoader::apply_overrides(&mut config, lookup(&vars)).expect("overrides apply");

        assert_eq!(config.discord.token, "MTA.env.token");
        assert_eq!(
            config.discord.guild_ids(),
            vec![100_000_000_000_000_001, 100_000_000_000_000_002]
        );
        assert_eq!(config.framework.default_prefix, vec!["!", "?"]);
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_bad_boolean_override_is_reported() {
        let vars = HashMap::from([("WARDEN_CASE_INSENSITIVE_COMMANDS", "sometimes")]);
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides(&mut config, lookup(&vars))
            .expect_err("not a boolean");
        match err {
            ConfigError::EnvParseError { var, .. } => {
                assert_eq!(var, "WARDEN_CASE_INSENSITIVE_COMMANDS");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new()
            .suffix(".ini")
            .tempfile()
            .expect("temp file");
        let err = ConfigLoader::parse_file(file.path()).expect_err("ini is unsupported");
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "ini"));
    }
}
