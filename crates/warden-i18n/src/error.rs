//! Error types for internationalization operations

use thiserror::Error;
use warden_common::WardenError;

/// Errors that can occur during internationalization operations
#[derive(Error, Debug)]
pub enum I18nError {
    /// Failed to parse a language identifier
    #[error("Invalid language identifier: {0}")]
    InvalidLanguageId(String),

    /// Failed to parse a Fluent resource
    #[error("Failed to parse Fluent resource for {locale}: {errors:?}")]
    FluentParseError {
        /// Locale the resource belongs to
        locale: String,
        /// Parser diagnostics
        errors: Vec<String>,
    },

    /// Message not found in the bundle
    #[error("Message not found: {key}")]
    MessageNotFound {
        /// Message id
        key: String,
    },

    /// Failed to format a message
    #[error("Failed to format message '{key}': {errors:?}")]
    MessageFormatError {
        /// Message id
        key: String,
        /// Formatting diagnostics
        errors: Vec<String>,
    },

    /// A failure identifier has no template in the given table
    #[error("No {table} failure message registered for identifier '{identifier}'")]
    UnknownIdentifier {
        /// Table name, `command` or `action`
        table: &'static str,
        /// Failure identifier
        identifier: String,
    },
}

/// Result type for i18n operations
pub type I18nResult<T> = Result<T, I18nError>;

impl From<I18nError> for WardenError {
    fn from(err: I18nError) -> Self {
        let locale = match &err {
            I18nError::FluentParseError { locale, .. } => Some(locale.clone()),
            _ => None,
        };
        Self::localization(err.to_string(), locale)
    }
}
