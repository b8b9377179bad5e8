//! Integration tests for warden-config crate.

use warden_common::test_utils::{config_fixtures, write_temp_file};
use warden_config::{Config, ConfigError, ConfigLoader};

#[test]
fn test_minimal_yaml_fills_defaults() {
    let file = write_temp_file(config_fixtures::MINIMAL_YAML, "yaml");
    let config = ConfigLoader::parse_file(file.path()).expect("minimal config parses");

    assert_eq!(config.discord.token, "MTA.fake.token");
    assert!(config.discord.guild_ids.is_empty());
    assert_eq!(config.framework.action_id_separator, ",");
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_full_yaml_round_trips_every_option() {
    let file = write_temp_file(config_fixtures::FULL_YAML, "yaml");
    let config = ConfigLoader::parse_file(file.path()).expect("full config parses");

    assert!(config.validate_all().is_ok());
    assert!(config.framework.case_insensitive_commands);
    assert!(config.framework.case_insensitive_prefixes);
    assert_eq!(config.framework.default_prefix, vec!["!", "w!"]);
    assert_eq!(config.framework.action_id_separator, ":");
    assert_eq!(config.discord.guild_ids().len(), 2);
    assert_eq!(config.discord.owner_ids(), vec![100_000_000_000_000_010]);
    assert_eq!(config.logging.level, "debug");

    let regex = config
        .framework
        .compiled_regex_prefix()
        .expect("pattern compiles")
        .expect("pattern configured");
    assert!(regex.is_match("hey warden, ping"));
    assert!(!regex.is_match("well hey warden"));
}

#[test]
fn test_toml_configuration() {
    let toml = r#"
[discord]
token = "MTA.fake.token"

[framework]
default_prefix = ["?"]
regex_prefix = "warden "
"#;
    let file = write_temp_file(toml, "toml");
    let config = ConfigLoader::parse_file(file.path()).expect("toml parses");
    assert_eq!(config.framework.default_prefix, vec!["?"]);

    let regex = config
        .framework
        .compiled_regex_prefix()
        .expect("compiles")
        .expect("configured");
    assert!(regex.is_match("warden ping"));
    assert!(!regex.is_match("ping warden "));
}

#[test]
fn test_invalid_prefix_and_guild_are_rejected() {
    let yaml = r#"
discord:
  token: "MTA.fake.token"
  guild_ids: ["42"]
framework:
  default_prefix: ["has space"]
"#;
    let file = write_temp_file(yaml, "yaml");
    let config = ConfigLoader::parse_file(file.path()).expect("parses");
    let errors = config.validate_all().expect_err("invalid values");
    let rendered = errors.to_string();
    assert!(rendered.contains("guild_ids"));
    assert!(rendered.contains("default_prefix"));
}

#[test]
fn test_conflicting_directory_markers() {
    let mut config = Config::default();
    config.discord.token = "MTA.fake.token".to_string();
    config.framework.command_group_directory_prefix = "@".to_string();

    let errors = config.validate_all().expect_err("markers collide");
    assert!(errors.field_errors().contains_key("command_group_directory_prefix"));
}

#[test]
fn test_load_config_validates() {
    let file = write_temp_file("framework:\n  action_id_separator: \"\"\n", "yaml");
    let err = ConfigLoader::load_config(file.path()).expect_err("empty separator and token");
    assert!(matches!(err, ConfigError::ValidationError(_)));
}
