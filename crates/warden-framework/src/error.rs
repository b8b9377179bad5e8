//! Error types for construction, dispatch, loading and remote sync.

use crate::sync::Scope;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use validator::{ValidationError as FieldError, ValidationErrors};
use warden_common::WardenError;

/// Error returned by user handlers, listeners and platform collaborators.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a user handler.
pub type HandlerResult = Result<(), HandlerError>;

/// An error shared between every listener of an event.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// The surface an invocation arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Slash command interaction.
    Slash,
    /// Prefixed text message.
    Prefix,
    /// Message context menu.
    MessageMenu,
    /// User context menu.
    UserMenu,
    /// Autocomplete request for a slash command option.
    Autocomplete,
    /// Button press.
    Button,
    /// Select menu choice.
    SelectMenu,
    /// Modal submission.
    ModalSubmit,
}

impl Surface {
    /// Name of the handler serving this surface.
    #[must_use]
    pub const fn handler_name(self) -> &'static str {
        match self {
            Self::Slash => "on_slash",
            Self::Prefix => "on_prefix",
            Self::MessageMenu => "on_message_menu",
            Self::UserMenu => "on_user_menu",
            Self::Autocomplete => "on_autocomplete",
            Self::Button => "on_button",
            Self::SelectMenu => "on_select_menu",
            Self::ModalSubmit => "on_modal_submit",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.handler_name())
    }
}

/// Kind of declared unit an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// A command.
    Command,
    /// An action.
    Action,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("Command"),
            Self::Action => f.write_str("Action"),
        }
    }
}

/// Options for a command, action or plugin failed schema validation.
#[derive(Debug, Error)]
#[error("Invalid options for \"{unit}\": {errors}")]
pub struct ValidationError {
    unit: String,
    errors: ValidationErrors,
}

impl ValidationError {
    /// Wraps field errors collected for `unit`.
    pub fn new(unit: impl Into<String>, errors: ValidationErrors) -> Self {
        Self {
            unit: unit.into(),
            errors,
        }
    }

    /// Builds an error for a single field.
    pub fn field(unit: impl Into<String>, field: &'static str, code: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, FieldError::new(code));
        Self::new(unit, errors)
    }

    /// Name or id of the unit that failed validation.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Names of the violated fields, sorted.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = self.errors.errors().keys().copied().collect();
        fields.sort_unstable();
        fields
    }

    /// Codes reported for `field`.
    #[must_use]
    pub fn codes(&self, field: &str) -> Vec<String> {
        self.errors
            .field_errors()
            .get(field)
            .map(|errors| errors.iter().map(|e| e.code.to_string()).collect())
            .unwrap_or_default()
    }

    /// The underlying field errors.
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }
}

impl From<ValidationError> for WardenError {
    fn from(err: ValidationError) -> Self {
        let field = err.fields().first().map(ToString::to_string);
        Self::Validation {
            message: err.to_string(),
            field,
        }
    }
}

/// Failures raised while routing a single inbound event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The unit passed its guards but has no implementation for the surface.
    #[error("{unit} \"{name}\" is missing its \"{surface}\" handler")]
    MissingHandler {
        /// Unit kind
        unit: UnitKind,
        /// Command name or action id
        name: String,
        /// Invoked surface
        surface: Surface,
    },

    /// No command or action is registered under the requested name.
    #[error("{unit} \"{name}\" not found")]
    NotFound {
        /// Unit kind
        unit: UnitKind,
        /// Requested name or id
        name: String,
    },

    /// The user handler returned an error.
    #[error("Handler failed: {0}")]
    Handler(#[source] HandlerError),
}

impl DispatchError {
    /// Whether this is a missing handler error.
    #[must_use]
    pub const fn is_missing_handler(&self) -> bool {
        matches!(self, Self::MissingHandler { .. })
    }
}

/// Failures while reconciling local commands with the remote registry.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching the registered commands failed.
    #[error("Failed to fetch commands for {scope}: {source}")]
    Fetch {
        /// Target scope
        scope: Scope,
        /// Platform error
        #[source]
        source: HandlerError,
    },

    /// The bulk replace call failed.
    #[error("Failed to replace commands for {scope}: {source}")]
    Replace {
        /// Target scope
        scope: Scope,
        /// Platform error
        #[source]
        source: HandlerError,
    },

    /// Listing guild scopes failed.
    #[error("Failed to list guild scopes: {0}")]
    Scopes(#[source] HandlerError),
}

/// Failures while instantiating units from a module tree.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A unit's options were invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The module loader could not produce a tree for `path`.
    #[error("Failed to load modules from \"{path}\": {message}")]
    Module {
        /// Requested root
        path: String,
        /// Loader message
        message: String,
    },
}

/// Failures of the framework lifecycle.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// Loading units failed.
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Remote command sync failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A plugin hook failed.
    #[error("Plugin \"{name}\" failed: {source}")]
    Plugin {
        /// Plugin name
        name: String,
        /// Hook error
        #[source]
        source: HandlerError,
    },

    /// The framework options were invalid.
    #[error(transparent)]
    Config(#[from] WardenError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handler_message() {
        let err = DispatchError::MissingHandler {
            unit: UnitKind::Command,
            name: "ping".to_string(),
            surface: Surface::Slash,
        };
        assert_eq!(err.to_string(), "Command \"ping\" is missing its \"on_slash\" handler");
        assert!(err.is_missing_handler());
    }

    #[test]
    fn test_not_found_message() {
        let err = DispatchError::NotFound {
            unit: UnitKind::Action,
            name: "pingUser".to_string(),
        };
        assert_eq!(err.to_string(), "Action \"pingUser\" not found");
        assert!(!err.is_missing_handler());
    }

    #[test]
    fn test_validation_fields_are_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("name", FieldError::new("invalid_name"));
        errors.add("description", FieldError::new("length"));
        let err = ValidationError::new("bad", errors);
        assert_eq!(err.fields(), vec!["description", "name"]);
        assert_eq!(err.codes("name"), vec!["invalid_name".to_string()]);
        assert!(err.codes("kinds").is_empty());
    }

    #[test]
    fn test_validation_converts_to_common_error() {
        let err: WardenError = ValidationError::field("ping", "kinds", "empty_kinds").into();
        assert!(err.is_fatal());
    }
}
