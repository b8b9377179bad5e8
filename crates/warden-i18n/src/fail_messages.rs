//! Failure-message tables for command and action preconditions.

use crate::bundle::MessageBundle;
use crate::error::{I18nError, I18nResult};
use crate::DEFAULT_LOCALE;
use fluent::FluentArgs;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const COMMAND_EN_US: &str = include_str!("../locales/en-US/command.ftl");
const ACTION_EN_US: &str = include_str!("../locales/en-US/action.ftl");
const COMMAND_DE: &str = include_str!("../locales/de/command.ftl");
const ACTION_DE: &str = include_str!("../locales/de/action.ftl");

/// Named interpolation arguments attached to a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    /// No parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds or replaces a named parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_fluent_args(&self) -> FluentArgs<'_> {
        let mut args = FluentArgs::new();
        for (key, value) in self.iter() {
            args.set(key, value);
        }
        args
    }
}

/// Which surface a table renders for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Slash, prefix and context-menu commands.
    Command,
    /// Button, select-menu and modal actions.
    Action,
}

impl TableKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Action => "action",
        }
    }

    fn builtin_sources(self) -> [(&'static str, &'static str); 2] {
        match self {
            Self::Command => [(DEFAULT_LOCALE, COMMAND_EN_US), ("de", COMMAND_DE)],
            Self::Action => [(DEFAULT_LOCALE, ACTION_EN_US), ("de", ACTION_DE)],
        }
    }
}

/// Everything a template can see when rendering a failure.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// Name of the command or id of the action that was guarded.
    pub unit: &'a str,
    /// Failure identifier.
    pub identifier: &'a str,
    /// Interpolation arguments.
    pub parameters: &'a Parameters,
    /// Locale requested by the invoking user, if known.
    pub locale: Option<&'a str>,
}

/// Custom template closure.
pub type TemplateFn = Arc<dyn Fn(&TemplateContext<'_>) -> String + Send + Sync>;

#[derive(Clone)]
enum Override {
    Custom(TemplateFn),
    Disabled,
}

/// Identifier to template mapping for one surface.
#[derive(Clone)]
pub struct FailMessages {
    kind: TableKind,
    bundles: Vec<Arc<MessageBundle>>,
    overrides: HashMap<String, Override>,
}

impl fmt::Debug for FailMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailMessages")
            .field("kind", &self.kind)
            .field("bundles", &self.bundles)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FailMessages {
    /// The built-in command table.
    pub fn commands() -> I18nResult<Self> {
        Self::builtin(TableKind::Command)
    }

    /// The built-in action table.
    pub fn actions() -> I18nResult<Self> {
        Self::builtin(TableKind::Action)
    }

    fn builtin(kind: TableKind) -> I18nResult<Self> {
        let bundles = kind
            .builtin_sources()
            .iter()
            .map(|(locale, source)| MessageBundle::new(locale, &[*source]).map(Arc::new))
            .collect::<I18nResult<Vec<_>>>()?;

        Ok(Self {
            kind,
            bundles,
            overrides: HashMap::new(),
        })
    }

    /// Which surface this table serves.
    #[must_use]
    pub const fn kind(&self) -> TableKind {
        self.kind
    }

    /// Adds or replaces the Fluent resource for a locale.
    pub fn add_locale(&mut self, locale: &str, source: &str) -> I18nResult<&mut Self> {
        let bundle = Arc::new(MessageBundle::new(locale, &[source])?);
        self.bundles
            .retain(|existing| existing.locale() != bundle.locale());
        self.bundles.insert(0, bundle);
        Ok(self)
    }

    /// Overrides the template for `identifier` with a closure.
    pub fn set<F>(&mut self, identifier: impl Into<String>, template: F) -> &mut Self
    where
        F: Fn(&TemplateContext<'_>) -> String + Send + Sync + 'static,
    {
        self.overrides
            .insert(identifier.into(), Override::Custom(Arc::new(template)));
        self
    }

    /// Silences `identifier`; rendering it yields no message.
    pub fn disable(&mut self, identifier: impl Into<String>) -> &mut Self {
        self.overrides.insert(identifier.into(), Override::Disabled);
        self
    }

    /// Whether the table knows `identifier` in any form.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.overrides.contains_key(identifier)
            || self.bundles.iter().any(|bundle| bundle.has_message(identifier))
    }

    /// Fails on the first identifier the table cannot render.
    pub fn ensure_identifiers<'a, I>(&self, identifiers: I) -> I18nResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for identifier in identifiers {
            if !self.contains(identifier) {
                return Err(self.unknown(identifier));
            }
        }
        Ok(())
    }

    /// Renders the failure. `Ok(None)` means the identifier was disabled.
    pub fn render(&self, context: &TemplateContext<'_>) -> I18nResult<Option<String>> {
        match self.overrides.get(context.identifier) {
            Some(Override::Disabled) => return Ok(None),
            Some(Override::Custom(template)) => return Ok(Some(template(context))),
            None => {}
        }

        let bundle = self
            .bundle_for(context.locale, context.identifier)
            .ok_or_else(|| self.unknown(context.identifier))?;

        debug!(
            table = self.kind.name(),
            identifier = context.identifier,
            locale = %bundle.locale(),
            "Rendering failure message"
        );

        let args = context.parameters.to_fluent_args();
        let args = (!context.parameters.is_empty()).then_some(&args);
        bundle.format(context.identifier, args).map(Some)
    }

    fn bundle_for<'a>(&'a self, locale: Option<&str>, identifier: &'a str) -> Option<&'a MessageBundle> {
        let exact = locale.and_then(|requested| {
            self.bundles_with(identifier)
                .find(|bundle| bundle.locale().to_string() == requested)
        });
        let language = || {
            let language = locale?.split(['-', '_']).next()?;
            self.bundles_with(identifier)
                .find(|bundle| bundle.locale().language.as_str() == language)
        };
        let fallback = || {
            self.bundles_with(identifier)
                .find(|bundle| bundle.locale().to_string() == DEFAULT_LOCALE)
                .or_else(|| self.bundles_with(identifier).next())
        };

        exact.or_else(language).or_else(fallback).map(|bundle| &**bundle)
    }

    fn bundles_with<'s>(
        &'s self,
        identifier: &'s str,
    ) -> impl Iterator<Item = &'s Arc<MessageBundle>> + 's {
        self.bundles
            .iter()
            .filter(move |bundle| bundle.has_message(identifier))
    }

    fn unknown(&self, identifier: &str) -> I18nError {
        I18nError::UnknownIdentifier {
            table: self.kind.name(),
            identifier: identifier.to_string(),
        }
    }
}
