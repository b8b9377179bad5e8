//! Test utilities and shared fixtures for the Warden workspace.
//!
//! Enabled through the `testing` feature so that other crates can pull them
//! into their own test suites.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test; only the first
/// call installs the subscriber.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Build a deterministic, valid 18 digit snowflake from a small seed.
#[must_use]
pub const fn snowflake(seed: u64) -> u64 {
    100_000_000_000_000_000 + seed
}

/// Create a temporary directory that is removed on drop.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Write `contents` to a temporary file with the given extension.
#[cfg(feature = "tempfile")]
pub fn write_temp_file(contents: &str, extension: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("Failed to create temporary file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary file");
    file
}

/// Sample configuration documents used across crates.
pub mod config_fixtures {
    /// A minimal, valid YAML configuration.
    pub const MINIMAL_YAML: &str = r#"
discord:
  token: "MTA.fake.token"
"#;

    /// A YAML configuration exercising every framework option.
    pub const FULL_YAML: &str = r#"
discord:
  token: "MTA.fake.token"
  guild_ids: ["100000000000000001", "100000000000000002"]
  owner_ids: ["100000000000000010"]
framework:
  case_insensitive_commands: true
  case_insensitive_prefixes: true
  default_prefix: ["!", "w!"]
  regex_prefix: "^(hey|yo) warden,?\\s*"
  disable_mention_prefix: false
  action_id_separator: ":"
  command_category_directory_prefix: "@"
  command_group_directory_prefix: "!"
logging:
  level: debug
"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_fixture_is_valid() {
        let id = snowflake(42);
        assert_eq!(id.to_string().len(), 18);
        assert_eq!(crate::parse_snowflake(&id.to_string()), Some(id));
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }
}
