//! Error types and utilities for Warden

use thiserror::Error;

/// Result type alias for Warden operations
pub type Result<T> = std::result::Result<T, WardenError>;

/// Boxed error used as a source for wrapped failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type shared across the workspace
#[derive(Error, Debug)]
pub enum WardenError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internationalization and localization errors
    #[error("Localization error: {message}")]
    Localization {
        /// Human readable description
        message: String,
        /// Locale being resolved, if known
        locale: Option<String>,
    },

    /// Validation errors for declared units or user input
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable description
        message: String,
        /// Offending field, if known
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },
}

impl WardenError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new localization error
    pub fn localization(msg: impl Into<String>, locale: Option<String>) -> Self {
        Self::Localization {
            message: msg.into(),
            locale,
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error for a specific field
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error came from configuration or validation and should
    /// abort startup
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Validation { .. })
    }
}
