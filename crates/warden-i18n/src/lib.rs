//! # Warden I18n
//!
//! Localizable failure messages for precondition guards.
//!
//! Commands and actions each get their own table mapping a failure
//! identifier (such as `GuildOnly`) to a message template. Templates are
//! Fluent messages by default and can be overridden per identifier with a
//! closure, or disabled entirely.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bundle;
pub mod error;
pub mod fail_messages;

pub use bundle::MessageBundle;
pub use error::{I18nError, I18nResult};
pub use fail_messages::{FailMessages, Parameters, TableKind, TemplateContext, TemplateFn};

/// Locale used when a request carries no locale or an unknown one.
pub const DEFAULT_LOCALE: &str = "en-US";
