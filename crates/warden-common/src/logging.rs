//! Tracing subscriber bootstrap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::fmt::{self, format::FmtSpan, writer::BoxMakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human oriented.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// JSON lines.
    Json,
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `info` or `warden_framework=trace`.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Append to this file instead of stdout.
    pub file: Option<PathBuf>,
    /// Log span open and close.
    pub spans: bool,
    /// Include the event target.
    pub targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
            spans: false,
            targets: true,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// An unparsable `level` falls back to `info`. Fails if a subscriber is already
/// installed or the log file cannot be opened.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    let span_events = if config.spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_span_events(span_events)
        .with_target(config.targets);
    let layer = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Json => base.json().boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).try_init()?;
    info!(level = %config.level, format = ?config.format, file = ?config.file, "Logging initialized");
    Ok(())
}

/// Debug level, pretty output with spans.
pub fn init_dev_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(LoggingConfig {
        level: "debug".to_string(),
        spans: true,
        ..LoggingConfig::default()
    })
}

/// Info level JSON lines appended to `log_file`.
pub fn init_prod_logging(log_file: impl Into<PathBuf>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(LoggingConfig {
        format: LogFormat::Json,
        file: Some(log_file.into()),
        ..LoggingConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert!(!config.spans);
        assert!(config.targets);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: LoggingConfig =
            serde_yaml::from_str("level: debug\nformat: json\n").expect("valid logging yaml");
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.targets);
    }

    #[test]
    fn test_second_install_is_rejected() {
        let _ = init_logging(LoggingConfig::default());
        assert!(init_logging(LoggingConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(serde_yaml::from_str::<LoggingConfig>("format: fancy\n").is_err());
    }
}
