//! Thread-safe Fluent bundle for a single locale.

use crate::error::{I18nError, I18nResult};
use fluent::{FluentArgs, FluentResource};
use fluent_bundle::concurrent::FluentBundle;
use fluent_syntax::parser::ParserError;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// A concurrent Fluent bundle holding every resource for one locale.
pub struct MessageBundle {
    locale: LanguageIdentifier,
    bundle: FluentBundle<FluentResource>,
}

impl std::fmt::Debug for MessageBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBundle")
            .field("locale", &self.locale.to_string())
            .finish_non_exhaustive()
    }
}

impl MessageBundle {
    /// Parse `sources` into a bundle for `locale`.
    pub fn new(locale: &str, sources: &[&str]) -> I18nResult<Self> {
        let langid: LanguageIdentifier = locale
            .parse()
            .map_err(|_| I18nError::InvalidLanguageId(locale.to_string()))?;

        let mut bundle = FluentBundle::new_concurrent(vec![langid.clone()]);
        bundle.set_use_isolating(false);

        for source in sources {
            let resource = FluentResource::try_new((*source).to_string()).map_err(
                |(_, errors)| I18nError::FluentParseError {
                    locale: locale.to_string(),
                    errors: describe_parser_errors(&errors),
                },
            )?;

            bundle
                .add_resource(resource)
                .map_err(|errors| I18nError::FluentParseError {
                    locale: locale.to_string(),
                    errors: errors.iter().map(ToString::to_string).collect(),
                })?;
        }

        debug!(%locale, resources = sources.len(), "Built message bundle");
        Ok(Self {
            locale: langid,
            bundle,
        })
    }

    /// Locale of this bundle.
    #[must_use]
    pub const fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// Whether the bundle has a message with this id.
    #[must_use]
    pub fn has_message(&self, id: &str) -> bool {
        self.bundle.has_message(id)
    }

    /// Format the message `id` with optional arguments.
    pub fn format(&self, id: &str, args: Option<&FluentArgs<'_>>) -> I18nResult<String> {
        let message = self
            .bundle
            .get_message(id)
            .ok_or_else(|| I18nError::MessageNotFound { key: id.to_string() })?;

        let pattern = message
            .value()
            .ok_or_else(|| I18nError::MessageNotFound { key: id.to_string() })?;

        let mut errors = Vec::new();
        let formatted = self.bundle.format_pattern(pattern, args, &mut errors);

        if !errors.is_empty() {
            let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
            warn!(message = %id, ?errors, "Formatting errors");
            return Err(I18nError::MessageFormatError {
                key: id.to_string(),
                errors,
            });
        }

        Ok(formatted.into_owned())
    }
}

fn describe_parser_errors(errors: &[ParserError]) -> Vec<String> {
    errors
        .iter()
        .map(|error| format!("{:?} at {:?}", error.kind, error.pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_args() {
        let bundle = MessageBundle::new("en-US", &["greet = Hello { $name }!"]).expect("bundle");
        let mut args = FluentArgs::new();
        args.set("name", "Warden");
        assert_eq!(bundle.format("greet", Some(&args)).expect("formats"), "Hello Warden!");
    }

    #[test]
    fn test_missing_argument_is_an_error() {
        let bundle = MessageBundle::new("en-US", &["greet = Hello { $name }!"]).expect("bundle");
        assert!(matches!(
            bundle.format("greet", None),
            Err(I18nError::MessageFormatError { .. })
        ));
    }

    #[test]
    fn test_invalid_resource() {
        let err = MessageBundle::new("en-US", &["= no id"]).expect_err("broken syntax");
        assert!(matches!(err, I18nError::FluentParseError { .. }));
    }

    #[test]
    fn test_invalid_locale() {
        let err = MessageBundle::new("not a locale!", &[]).expect_err("bad locale");
        assert!(matches!(err, I18nError::InvalidLanguageId(_)));
    }

    #[test]
    fn test_bundle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MessageBundle>();
    }
}
